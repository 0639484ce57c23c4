use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

/// Result of asking for an out-of-band channel. `Requested` only means a
/// listener was started; nobody confirms that anything connects to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Requested,
    Unavailable(String),
}

/// Opens a local listener for callbacks from the target.
pub trait ChannelOpener: Send + Sync {
    fn open(&self, port: u16) -> ChannelStatus;

    fn name(&self) -> &str;
}

/// Spawns a detached netcat listener (`ncat` on Windows).
#[derive(Debug, Default)]
pub struct NetcatListener;

impl NetcatListener {
    fn command(port: u16) -> Command {
        let port = port.to_string();
        if cfg!(windows) {
            let mut cmd = Command::new("ncat");
            cmd.args(["-lvp", port.as_str()]);
            cmd
        } else {
            let mut cmd = Command::new("nc");
            cmd.args(["-nvlp", port.as_str()]);
            cmd
        }
    }
}

impl ChannelOpener for NetcatListener {
    fn open(&self, port: u16) -> ChannelStatus {
        let spawned = Self::command(port)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false)
            .spawn();

        match spawned {
            Ok(child) => {
                info!(port, pid = ?child.id(), "Listener started");
                ChannelStatus::Requested
            }
            Err(e) => {
                warn!(port, error = %e, "Could not start listener, continuing without it");
                ChannelStatus::Unavailable(e.to_string())
            }
        }
    }

    fn name(&self) -> &str {
        "netcat"
    }
}

/// For runs where the operator manages listeners themselves.
#[derive(Debug, Default)]
pub struct NoListener;

impl ChannelOpener for NoListener {
    fn open(&self, port: u16) -> ChannelStatus {
        info!(port, "Listener disabled, expecting an external one");
        ChannelStatus::Unavailable("listener disabled".to_string())
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_listener_reports_unavailable() {
        assert_eq!(
            NoListener.open(9001),
            ChannelStatus::Unavailable("listener disabled".to_string())
        );
    }

    #[test]
    fn test_netcat_command_shape() {
        let cmd = NetcatListener::command(4444);
        let std_cmd = cmd.as_std();
        let args: Vec<_> = std_cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert!(args.contains(&"4444".to_string()));
    }
}
