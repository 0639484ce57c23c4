use clap::Parser;
use tracing_subscriber::EnvFilter;
use tudochain::cli;
use tudochain::errors::ChainError;

#[tokio::main]
async fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version land here too
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    match cli::handle_run(&cli).await {
        Ok(result) => {
            std::process::exit(if result.completed() { 0 } else { 1 });
        }
        Err(ChainError::Usage(text)) => {
            eprintln!("{}", text);
            std::process::exit(1);
        }
        Err(e) => {
            let class = e.classify();
            eprintln!("Error [{}]: {}", class.error_type, e);
            std::process::exit(class.exit_code);
        }
    }
}
