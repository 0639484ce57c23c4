use std::path::{Path, PathBuf};
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use crate::errors::ChainError;
use crate::models::Target;

/// Human-readable, timestamped trail of one run's stage transitions.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn initialize(&self, run_id: &str, target: &Target) -> Result<(), ChainError> {
        let header = format!(
            "# tudochain run log\n# Run: {}\n# Target: {} (chain {}: {})\n# Started: {}\n\n",
            run_id,
            target.base_url(),
            target.selector.value(),
            target.selector.describe(),
            Utc::now().to_rfc3339()
        );
        tokio::fs::write(&self.path, &header).await?;
        Ok(())
    }

    pub async fn log_event(&self, message: &str) -> Result<(), ChainError> {
        let line = format!("[{}] {}\n", Utc::now().format("%H:%M:%S"), message);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
