use std::sync::LazyLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::errors::ChainError;
use super::selector::ChainSelector;

pub const DEFAULT_CALLBACK_HOST: &str = "localhost";
pub const DEFAULT_USERNAME: &str = "user1";

// Callback hosts end up inside shell and HTML payloads, so keep them to
// hostname/IP characters.
static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.\-\[\]:]+$").expect("host pattern is valid")
});

/// The application under attack and the knobs for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub address: String,
    pub callback_host: String,
    pub username: String,
    pub selector: ChainSelector,
}

impl Target {
    pub fn new(
        address: &str,
        callback_host: &str,
        username: &str,
        selector: ChainSelector,
    ) -> Result<Self, ChainError> {
        let address = address.trim().trim_end_matches('/');
        if address.is_empty() {
            return Err(ChainError::InvalidTarget("target address is empty".into()));
        }
        if !HOST_PATTERN.is_match(callback_host) {
            return Err(ChainError::InvalidTarget(format!(
                "callback host '{}' is not a hostname or IP address",
                callback_host
            )));
        }
        if username.is_empty() {
            return Err(ChainError::InvalidTarget("username is empty".into()));
        }
        Ok(Self {
            address: address.to_string(),
            callback_host: callback_host.to_string(),
            username: username.to_string(),
            selector,
        })
    }

    /// Target with the single-argument defaults: localhost callback, `user1`, chain 1.
    pub fn with_defaults(address: &str) -> Result<Self, ChainError> {
        Self::new(address, DEFAULT_CALLBACK_HOST, DEFAULT_USERNAME, ChainSelector::default())
    }

    /// Base URL for requests. Bare hosts and `host:port` get an `http://` scheme.
    pub fn base_url(&self) -> String {
        if self.address.contains("://") {
            self.address.clone()
        } else {
            format!("http://{}", self.address)
        }
    }
}
