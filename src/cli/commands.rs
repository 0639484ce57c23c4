use clap::Parser;
use crate::models::ChainSelector;

#[derive(Parser, Debug)]
#[command(
    name = "tudochain",
    version,
    about = "Multi-stage exploit chain against the TUDO lab application",
    override_usage = "tudochain [OPTIONS] <TARGET> [<CALLBACK_HOST> <USERNAME> <CHAIN>]",
    after_help = chain_help()
)]
pub struct Cli {
    /// Target address (host, host:port or URL)
    pub target: Option<String>,

    /// Host the target connects back to for XSS and reverse shells
    pub callback_host: Option<String>,

    /// Account to take over
    pub username: Option<String>,

    /// Chain number, 1 to 6
    pub chain: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Password to set on the taken-over account
    #[arg(long)]
    pub password: Option<String>,

    /// Session id to use for the RCE stage instead of the one from login
    #[arg(long)]
    pub session_id: Option<String>,

    /// Keep going after a failed authentication bypass
    #[arg(long)]
    pub continue_on_bypass_failure: bool,

    /// Do not spawn a local netcat listener
    #[arg(long)]
    pub no_listener: bool,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Timestamped run log
    #[arg(long, default_value = "tudochain.log")]
    pub log_file: String,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// The six chains, one per line.
pub fn chain_help() -> String {
    let mut help = String::from("Chains:\n");
    for selector in ChainSelector::all() {
        help.push_str(&format!("  {}: {}\n", selector.value(), selector.describe()));
    }
    help
}

pub fn usage() -> String {
    format!(
        "Usage: tudochain <target>\n       tudochain <target> <callback-host> <username> <chain>\n\n{}",
        chain_help()
    )
}
