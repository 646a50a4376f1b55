use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use crate::error::Result;
use crate::interfaces::CheckpointStore;

/// Checkpoint File Store - keeps the time of the last accepted price update
///
/// ## Format
/// - A single decimal integer: epoch milliseconds
/// - Trailing whitespace is ignored
///
/// ## Atomicity
/// - **Write**: written to `<path>.tmp`, then renamed over `<path>`
/// - **Concurrent Access**: single writer (the cycle pipeline never overlaps)
///
/// ## Recovery Behavior
/// - **Missing file**: no prior submission, first cycle runs immediately
/// - **Empty or unparseable file**: treated the same as missing, with a warning
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileCheckpointStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self) -> Option<i64> {
        let contents = match async_fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = ?self.path, "No checkpoint found");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Could not read checkpoint");
                return None;
            }
        };

        match contents.trim().parse::<i64>() {
            Ok(ms) => Some(ms),
            Err(e) => {
                tracing::warn!(
                    path = ?self.path,
                    contents = %contents.trim(),
                    error = %e,
                    "Could not parse checkpoint"
                );
                None
            }
        }
    }

    async fn store(&self, submitted_at_ms: i64) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        async_fs::write(&temp, submitted_at_ms.to_string()).await?;
        async_fs::rename(&temp, &self.path).await?;

        tracing::debug!(path = ?self.path, submitted_at_ms, "Checkpoint saved");
        Ok(())
    }
}
