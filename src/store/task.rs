//! Handles to the effects started by one `send`.

use std::fmt;

use tokio::task::JoinHandle;

use crate::cancellation::CancellationToken;
use crate::error::StoreError;

/// The effects started by one [`Store::send`](crate::Store::send).
///
/// Dropping a `StoreTask` does not cancel anything; the effects keep running
/// in the background. Effects started later by actions those effects send
/// are not part of this task.
pub struct StoreTask {
    handle: Option<JoinHandle<Result<(), StoreError>>>,
    token: CancellationToken,
}

impl StoreTask {
    pub(crate) fn new(
        handle: Option<JoinHandle<Result<(), StoreError>>>,
        token: CancellationToken,
    ) -> Self {
        Self { handle, token }
    }

    /// Wait until every effect started by the send has finished or been
    /// cancelled.
    ///
    /// Fails only if an effect panicked or its task was aborted.
    pub async fn finish(self) -> Result<(), StoreError> {
        match self.handle {
            Some(handle) => handle.await?,
            None => Ok(()),
        }
    }

    /// Cancel every effect started by the send.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether all effects started by the send have finished.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Whether the send started no asynchronous work at all.
    pub fn is_empty(&self) -> bool {
        self.handle.is_none()
    }
}

impl fmt::Debug for StoreTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreTask")
            .field("finished", &self.is_finished())
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
