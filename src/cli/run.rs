use std::path::Path;
use chrono::Utc;
use tokio::sync::mpsc;
use crate::audit::RunLog;
use crate::config::{self, ChainConfig};
use crate::errors::ChainError;
use crate::listener::NoListener;
use crate::models::{ChainSelector, Target};
use crate::pipeline::{ChainEvent, ChainOrchestrator, ChainResult};
use crate::reporting::RunReport;
use super::commands::{usage, Cli};
use super::progress::ChainProgress;
use tracing::info;

/// Accepts exactly one or exactly four positionals.
pub fn build_target(cli: &Cli) -> Result<Target, ChainError> {
    match (&cli.target, &cli.callback_host, &cli.username, &cli.chain) {
        (Some(target), None, None, None) => Target::with_defaults(target),
        (Some(target), Some(callback), Some(username), Some(chain)) => {
            let number = chain.parse::<u8>().map_err(|_| {
                ChainError::InvalidTarget(format!("Chain must be between 1 and 6, got '{}'", chain))
            })?;
            Target::new(target, callback, username, ChainSelector::new(number)?)
        }
        _ => Err(ChainError::Usage(usage())),
    }
}

/// File config (or defaults) with command-line overrides applied on top.
pub async fn build_config(cli: &Cli) -> Result<ChainConfig, ChainError> {
    let mut config = match &cli.config {
        Some(path) => config::parse_config(Path::new(path)).await?,
        None => ChainConfig::default(),
    };

    if let Some(ref password) = cli.password {
        config.new_password = password.clone();
    }
    if cli.continue_on_bypass_failure {
        config.continue_on_bypass_failure = true;
    }

    config.validate()?;
    Ok(config)
}

pub async fn handle_run(cli: &Cli) -> Result<ChainResult, ChainError> {
    let target = build_target(cli)?;
    let config = build_config(cli).await?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ChainEvent>();
    let renderer = tokio::spawn(async move {
        let mut progress = ChainProgress::new();
        while let Some(event) = rx.recv().await {
            progress.handle_event(&event);
        }
    });

    let mut orchestrator = ChainOrchestrator::new(target.clone(), config)
        .with_event_channel(tx)
        .with_run_log(RunLog::new(Path::new(&cli.log_file)));
    if cli.no_listener {
        orchestrator = orchestrator.with_opener(Box::new(NoListener));
    }
    if let Some(ref id) = cli.session_id {
        orchestrator = orchestrator.with_session_override(id.clone());
    }

    let started_at = Utc::now();
    let outcome = orchestrator.run().await;
    let run_id = orchestrator.run_id().to_string();

    // Closing the last sender lets the renderer drain and exit
    drop(orchestrator);
    let _ = renderer.await;

    let result = outcome?;
    info!(
        run_id = %run_id,
        completed = result.completed(),
        succeeded = result.succeeded(),
        "Run finished"
    );

    if let Some(ref path) = cli.report {
        RunReport::new(&run_id, &target, result.clone(), started_at, Utc::now())
            .write(Path::new(path))
            .await?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_single_argument_defaults() {
        let target = build_target(&parse(&["tudochain", "10.0.0.5"])).unwrap();
        assert_eq!(target.callback_host, "localhost");
        assert_eq!(target.username, "user1");
        assert_eq!(target.selector.value(), 1);
    }

    #[test]
    fn test_four_arguments() {
        let target = build_target(&parse(&["tudochain", "10.0.0.5", "10.0.0.99", "admin", "6"])).unwrap();
        assert_eq!(target.selector.value(), 6);
        assert_eq!(target.username, "admin");
    }

    #[test]
    fn test_wrong_positional_count_is_usage_error() {
        for args in [&["tudochain"][..], &["tudochain", "a", "b"][..], &["tudochain", "a", "b", "c"][..]] {
            let err = build_target(&parse(args)).unwrap_err();
            assert!(matches!(err, ChainError::Usage(_)));
            assert_eq!(err.classify().exit_code, 1);
        }
    }

    #[test]
    fn test_chain_out_of_range() {
        for chain in ["0", "7", "x"] {
            let err = build_target(&parse(&["tudochain", "t", "h", "u", chain])).unwrap_err();
            assert!(matches!(err, ChainError::InvalidTarget(_)));
            assert_eq!(err.classify().exit_code, 1);
        }
    }

    #[tokio::test]
    async fn test_cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.yaml");
        std::fs::write(&path, "new_password: FromFile\nxss_port: 9100\n").unwrap();

        let cli = parse(&[
            "tudochain", "t", "--config", path.to_str().unwrap(),
            "--password", "FromFlag", "--continue-on-bypass-failure",
        ]);
        let config = build_config(&cli).await.unwrap();
        assert_eq!(config.new_password, "FromFlag");
        assert_eq!(config.xss_port, 9100);
        assert!(config.continue_on_bypass_failure);
    }
}
