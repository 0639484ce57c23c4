use crate::config::ChainConfig;
use crate::http::{endpoints, Session};
use crate::models::Credential;
use tracing::{info, warn};

/// Logs in and keeps the session cookie for the privileged stages.
pub struct SessionEstablisher<'a> {
    config: &'a ChainConfig,
}

impl<'a> SessionEstablisher<'a> {
    pub fn new(config: &'a ChainConfig) -> Self {
        Self { config }
    }

    /// A missing session cookie is logged but does not fail the login; later
    /// stages then run without a credential and fail at the server.
    pub async fn login(&self, session: &mut Session, credential: &Credential) -> bool {
        info!(username = %credential.username, "Attempting login");
        let form = [
            ("username", credential.username.as_str()),
            ("password", credential.password.as_str()),
        ];

        let reply = match session.post_form(endpoints::LOGIN, &form).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Login request failed");
                return false;
            }
        };

        if !reply.contains_any(&self.config.markers.login) {
            warn!(status = reply.status, body = %reply.preview(200), "Login failed");
            return false;
        }

        info!(status = reply.status, "Login successful");
        match session.capture_session_id() {
            Some(id) => info!(cookie = %self.config.session_cookie, value = %id, "Session cookie obtained"),
            None => warn!(cookie = %self.config.session_cookie, "Logged in but no session cookie was set"),
        }
        true
    }
}
