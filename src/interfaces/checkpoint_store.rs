use async_trait::async_trait;
use crate::error::Result;

/// Durable "last successful price submission" time, epoch milliseconds.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// `None` when nothing usable is stored.
    async fn load(&self) -> Option<i64>;
    async fn store(&self, submitted_at_ms: i64) -> Result<()>;
}
