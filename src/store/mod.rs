//! The runtime that owns state, runs reducers and executes effects.
//!
//! A [`Store`] serializes every state change through one dispatch lock:
//!
//! 1. the action is reduced against the current state,
//! 2. the returned effect is started (cancellations and registrations are
//!    applied, leaf work is spawned onto tokio),
//! 3. observers are notified with the new state,
//!
//! and only then is the lock released. Effects deliver their actions back
//! through the same path, one at a time, so reducers never run concurrently
//! and observers never see a half-applied action.
//!
//! Derived stores from [`Store::scope`] share the root's state and lock.
//!
//! # Example
//!
//! ```rust
//! use reflux::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! #[derive(Debug, Clone, PartialEq)]
//! enum Action {
//!     Load,
//!     Loaded(u32),
//! }
//!
//! let store = Store::new(
//!     0u32,
//!     Reduce::new(|total: &mut u32, action: Action| match action {
//!         Action::Load => Effect::task(async { Action::Loaded(42) }),
//!         Action::Loaded(n) => {
//!             *total = n;
//!             Effect::none()
//!         }
//!     }),
//! );
//!
//! store.send(Action::Load).finish().await.unwrap();
//! assert_eq!(store.state(), 42);
//! # }
//! ```

mod runtime;
mod shared;
mod task;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::reducer::Reducer;

use runtime::Spawner;
use shared::{Root, Scoped, StoreCore, Unsubscribe};

pub(crate) use shared::{Origin, Tap};
pub use task::StoreTask;

/// A handle to a running feature: its state, its reducer and its effects.
///
/// Handles are cheap to clone and all clones share one store. The root store
/// lives as long as any handle to it (including scoped ones); when the last
/// one is dropped every in-flight effect is cancelled.
///
/// Sending an action whose reducer returns a non-`none` effect spawns tokio
/// tasks, so it must happen inside a tokio runtime unless one was supplied
/// with [`StoreBuilder::runtime`].
pub struct Store<S, A> {
    core: Arc<dyn StoreCore<S, A>>,
}

impl<S, A> Store<S, A>
where
    S: Send + 'static,
    A: Clone + Send + 'static,
{
    /// Create a root store.
    pub fn new<R>(state: S, reducer: R) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        Self::builder(state, reducer).build()
    }

    /// Configure a root store before creating it.
    pub fn builder<R>(state: S, reducer: R) -> StoreBuilder<R>
    where
        R: Reducer<State = S, Action = A>,
    {
        StoreBuilder {
            state,
            reducer,
            name: None,
            runtime: None,
            tap: None,
        }
    }

    /// Reduce `action` and start the effect it returns.
    ///
    /// The state change is visible to [`state`](Self::state) and to
    /// observers by the time this returns. The returned [`StoreTask`] tracks
    /// the started effects.
    pub fn send(&self, action: A) -> StoreTask {
        self.core.send(action)
    }

    /// Borrow the current state for the duration of `f`.
    ///
    /// `f` runs under the dispatch lock; it must not send to this store.
    pub fn with_state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        let mut f = Some(f);
        let mut result = None;
        self.core.read(&mut |state: &S| {
            if let Some(f) = f.take() {
                result = Some(f(state));
            }
        });
        match result {
            Some(result) => result,
            None => unreachable!("store read did not visit its state"),
        }
    }

    /// A copy of the current state.
    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.with_state(S::clone)
    }

    /// Call `observer` with the current state now and after every action
    /// that changes it.
    ///
    /// The observer runs under the dispatch lock: it must not send to the
    /// store, and the returned [`Observation`] must not be dropped from
    /// inside it. Dropping the `Observation` unsubscribes.
    pub fn observe<F>(&self, mut observer: F) -> Observation
    where
        S: Clone + PartialEq,
        F: FnMut(&S) + Send + 'static,
    {
        let mut last: Option<S> = None;
        let (id, unsubscribe) = self.core.subscribe(Box::new(move |state: &S| {
            if last.as_ref() != Some(state) {
                last = Some(state.clone());
                observer(state);
            }
        }));
        Observation {
            id,
            unsubscribe: Some(unsubscribe),
        }
    }

    /// Derive a store for a child feature.
    ///
    /// Reads go through `to_child` on the parent's state; sends are wrapped
    /// by `embed` and dispatched on the parent. The child store keeps the
    /// parent alive.
    pub fn scope<C, CA>(
        &self,
        to_child: impl Fn(&S) -> C + Send + Sync + 'static,
        embed: impl Fn(CA) -> A + Send + Sync + 'static,
    ) -> Store<C, CA>
    where
        C: Send + 'static,
        CA: Clone + Send + 'static,
    {
        Store {
            core: Arc::new(Scoped {
                parent: Arc::clone(&self.core),
                to_child: Arc::new(to_child),
                embed: Arc::new(embed),
            }),
        }
    }

    /// Derive a store for optional child state.
    ///
    /// Returns `None` when the child is currently absent. If the child later
    /// disappears while the derived store is still held, the derived store
    /// keeps reporting the last present value; its sends are still
    /// dispatched and are ignored by an `if_let` reducer.
    pub fn scope_if_let<C, CA>(
        &self,
        to_child: impl Fn(&S) -> Option<C> + Send + Sync + 'static,
        embed: impl Fn(CA) -> A + Send + Sync + 'static,
    ) -> Option<Store<C, CA>>
    where
        C: Clone + Send + 'static,
        CA: Clone + Send + 'static,
    {
        let initial = self.with_state(&to_child)?;
        let last = Mutex::new(initial);
        Some(self.scope(
            move |state| match to_child(state) {
                Some(child) => {
                    *last.lock() = child.clone();
                    child
                }
                None => last.lock().clone(),
            },
            embed,
        ))
    }

    /// Number of dispatched actions in the root store whose effects are
    /// still running.
    pub fn effects_in_flight(&self) -> usize {
        self.core.in_flight().count()
    }

    /// Resolve once no effect is running in the root store.
    ///
    /// Effects that send actions can start more effects; this waits for
    /// those too.
    pub async fn settled(&self) {
        self.core.in_flight().settled().await
    }

    pub(crate) fn cancel_effects(&self) {
        self.core.cancel_effects();
    }

    /// The name used on this store's tracing spans.
    pub fn name(&self) -> Arc<str> {
        self.core.name()
    }
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<S, A> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.core.name())
            .field("effects_in_flight", &self.core.in_flight().count())
            .finish()
    }
}

/// Builder for a root [`Store`].
pub struct StoreBuilder<R: Reducer> {
    state: R::State,
    reducer: R,
    name: Option<Arc<str>>,
    runtime: Option<Handle>,
    tap: Option<Arc<dyn Tap<R::State, R::Action>>>,
}

impl<R: Reducer> StoreBuilder<R> {
    /// Name the store on tracing spans. Defaults to the state's type name.
    pub fn name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Spawn effects on `handle` instead of the ambient runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub(crate) fn tap(mut self, tap: Arc<dyn Tap<R::State, R::Action>>) -> Self {
        self.tap = Some(tap);
        self
    }

    /// Create the store.
    pub fn build(self) -> Store<R::State, R::Action> {
        let name = self
            .name
            .unwrap_or_else(|| Arc::from(std::any::type_name::<R::State>()));
        tracing::debug!(store = %name, "store created");
        Store {
            core: Root::new(
                self.state,
                self.reducer,
                name,
                Spawner::new(self.runtime),
                self.tap,
            ),
        }
    }
}

impl<R: Reducer> fmt::Debug for StoreBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreBuilder")
            .field("name", &self.name)
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}

/// An active [`Store::observe`] subscription. Drop it to unsubscribe.
#[must_use = "the observer is removed as soon as the Observation is dropped"]
pub struct Observation {
    id: u64,
    unsubscribe: Option<Unsubscribe>,
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation").field("id", &self.id).finish()
    }
}
