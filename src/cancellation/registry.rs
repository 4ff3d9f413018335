//! The registry mapping cancellation ids to running effects.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::{CancelId, CancellationToken};

/// Identifies one registration within a [`CancellationRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

/// Maps [`CancelId`]s to the tokens of the effects running under them.
///
/// Several effects may share an id; [`cancel`](Self::cancel) cancels and
/// removes all of them at once. The registry is shared between a store's
/// dispatch loop and every effect it spawned, so all access goes through an
/// internal mutex. Tokens are cancelled *after* the lock is released.
#[derive(Default)]
pub struct CancellationRegistry {
    entries: Mutex<HashMap<CancelId, Vec<(RegistrationId, CancellationToken)>>>,
    next_id: AtomicU64,
}

impl CancellationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `token` under `id`.
    ///
    /// The returned [`Registration`] unregisters the token when dropped,
    /// which is how an effect that completes naturally leaves the registry.
    pub fn register(self: &Arc<Self>, id: CancelId, token: CancellationToken) -> Registration {
        let handle = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .lock()
            .entry(id.clone())
            .or_default()
            .push((handle, token));
        tracing::trace!(?id, ?handle, "registered cancellable effect");
        Registration {
            registry: Arc::downgrade(self),
            id,
            handle,
        }
    }

    /// Cancel and remove every effect registered under `id`.
    ///
    /// Returns how many registrations were cancelled.
    pub fn cancel(&self, id: &CancelId) -> usize {
        let removed = self.entries.lock().remove(id).unwrap_or_default();
        if !removed.is_empty() {
            tracing::debug!(?id, count = removed.len(), "cancelling in-flight effects");
        }
        for (_, token) in &removed {
            token.cancel();
        }
        removed.len()
    }

    /// Cancel and remove everything.
    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.entries.lock().drain().collect();
        for (_, tokens) in drained {
            for (_, token) in tokens {
                token.cancel();
            }
        }
    }

    /// Remove one registration without cancelling it.
    pub fn unregister(&self, id: &CancelId, handle: RegistrationId) {
        let mut entries = self.entries.lock();
        if let Some(tokens) = entries.get_mut(id) {
            tokens.retain(|(registered, _)| *registered != handle);
            if tokens.is_empty() {
                entries.remove(id);
            }
        }
    }

    /// Whether any effect is currently registered under `id`.
    pub fn contains(&self, id: &CancelId) -> bool {
        self.entries.lock().contains_key(id)
    }

    /// Number of distinct ids with at least one live registration.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the registry holds no registrations.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl fmt::Debug for CancellationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_map()
            .entries(entries.iter().map(|(id, tokens)| (id, tokens.len())))
            .finish()
    }
}

/// Guard for one registration; unregisters on drop.
pub struct Registration {
    registry: Weak<CancellationRegistry>,
    id: CancelId,
    handle: RegistrationId,
}

impl Registration {
    /// The id this registration lives under.
    pub fn id(&self) -> &CancelId {
        &self.id
    }

    /// The handle distinguishing this registration from others under the same id.
    pub fn handle(&self) -> RegistrationId {
        self.handle
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(&self.id, self.handle);
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .finish()
    }
}
