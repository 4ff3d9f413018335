//! Error types surfaced by the store runtime.
//!
//! Failures *inside* effects are not store errors: effects convert them into
//! actions themselves (see [`Effect::try_task`](crate::Effect::try_task) and
//! [`TaskResult`](crate::TaskResult)). Cancellation is not an error either.
//! What remains is an effect task that did not finish normally.

use tokio::task::JoinError;

/// Why awaiting a [`StoreTask`](crate::StoreTask) failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Code inside an effect panicked.
    #[error("effect panicked: {0}")]
    EffectPanicked(String),

    /// The effect's task was aborted, usually because the runtime shut down.
    #[error("effect task was aborted before completing")]
    EffectAborted,
}

impl From<JoinError> for StoreError {
    fn from(error: JoinError) -> Self {
        if !error.is_panic() {
            return StoreError::EffectAborted;
        }
        let payload = error.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());
        StoreError::EffectPanicked(message)
    }
}
