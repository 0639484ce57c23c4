use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StageName {
    Bypass,
    PrivEsc,
    Rce,
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bypass => write!(f, "bypass"),
            Self::PrivEsc => write!(f, "privesc"),
            Self::Rce => write!(f, "rce"),
        }
    }
}

/// Where the orchestrator is. Aborting jumps straight to `Done`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChainState {
    Start,
    Bypass,
    PrivEsc,
    Rce,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum StageOutcome {
    #[default]
    Skipped,
    Succeeded,
    Failed(String),
}

impl StageOutcome {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, StageOutcome::Succeeded)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped)
    }

    pub fn from_result<T, E: std::fmt::Display>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => StageOutcome::Succeeded,
            Err(e) => StageOutcome::Failed(e.to_string()),
        }
    }
}

impl std::fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Per-stage outcome of one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChainResult {
    pub bypass: StageOutcome,
    pub privesc: StageOutcome,
    pub rce: StageOutcome,
}

impl ChainResult {
    /// The chain reached its last stage, whatever the stage outcomes.
    pub fn completed(&self) -> bool {
        !self.rce.is_skipped()
    }

    /// Every stage succeeded.
    pub fn succeeded(&self) -> bool {
        self.bypass.is_succeeded() && self.privesc.is_succeeded() && self.rce.is_succeeded()
    }
}
