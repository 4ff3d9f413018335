//! The handle effects use to send actions back to their store.

use std::fmt;
use std::sync::Arc;

use crate::cancellation::CancellationToken;

pub(crate) type Deliver<A> = Arc<dyn Fn(A, &CancellationToken) + Send + Sync>;

/// Sends actions from a running effect back into its store.
///
/// Each `send` is reduced synchronously: when it returns, the store has
/// already processed the action. Sends made after the owning effect was
/// cancelled are dropped, and the store re-checks cancellation under its
/// dispatch lock so a cancel applied concurrently still wins.
pub struct Sender<A> {
    deliver: Deliver<A>,
    token: CancellationToken,
}

impl<A> Sender<A> {
    pub(crate) fn new(deliver: Deliver<A>, token: CancellationToken) -> Self {
        Self { deliver, token }
    }

    /// Send an action to the store.
    pub fn send(&self, action: A) {
        if self.token.is_cancelled() {
            tracing::trace!("dropping action sent after cancellation");
            return;
        }
        (self.deliver)(action, &self.token);
    }

    /// Whether the effect owning this sender has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once the owning effect is cancelled.
    ///
    /// Useful for tearing down external resources (subscriptions, sockets)
    /// in a `select!`.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

impl<A: 'static> Sender<A> {
    pub(crate) fn contramap<B: 'static>(self, f: Arc<dyn Fn(B) -> A + Send + Sync>) -> Sender<B> {
        let deliver = self.deliver;
        Sender {
            deliver: Arc::new(move |action, token| deliver(f(action), token)),
            token: self.token,
        }
    }
}

impl<A> Clone for Sender<A> {
    fn clone(&self) -> Self {
        Self {
            deliver: Arc::clone(&self.deliver),
            token: self.token.clone(),
        }
    }
}

impl<A> fmt::Debug for Sender<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("deliver", &"<function>")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
