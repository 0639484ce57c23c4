use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::errors::ChainError;
use crate::models::Target;
use crate::pipeline::ChainResult;
use tracing::info;

/// Machine-readable summary of one run, written with `--report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub target: String,
    pub callback_host: String,
    pub username: String,
    pub chain: u8,
    pub chain_description: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub completed: bool,
    pub succeeded: bool,
    pub result: ChainResult,
    pub tool_version: String,
    pub build: BuildInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub built_at: String,
    pub git_hash: Option<String>,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            built_at: env!("TUDOCHAIN_BUILD_TIME").to_string(),
            git_hash: option_env!("TUDOCHAIN_GIT_HASH").map(str::to_string),
        }
    }
}

impl RunReport {
    pub fn new(
        run_id: &str,
        target: &Target,
        result: ChainResult,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            target: target.base_url(),
            callback_host: target.callback_host.clone(),
            username: target.username.clone(),
            chain: target.selector.value(),
            chain_description: target.selector.describe(),
            started_at,
            finished_at,
            completed: result.completed(),
            succeeded: result.succeeded(),
            result,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            build: BuildInfo::current(),
        }
    }

    /// Pretty JSON, written to a sibling temp file and renamed into place.
    pub async fn write(&self, path: &Path) -> Result<(), ChainError> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        info!(path = %path.display(), "Report written");
        Ok(())
    }
}
