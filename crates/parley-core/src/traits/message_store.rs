//! Message persistence.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{NewMessage, PersistedMessage};

/// Persists messages and returns their author-populated representation.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a validated message.
    async fn persist(&self, message: NewMessage) -> AppResult<PersistedMessage>;
}
