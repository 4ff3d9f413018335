//! Shared store machinery behind [`Store`](super::Store) handles.
//!
//! A [`Root`] owns the state, the reducer and the dispatch lock. A
//! [`Scoped`] core projects a parent core onto child state and embeds child
//! actions into the parent. Both are used through `Arc<dyn StoreCore>`, so a
//! store handle does not expose which one it is.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::cancellation::{CancellationRegistry, CancellationToken};
use crate::reducer::Reducer;

use super::runtime::{self, EffectRuntime, InFlight, Spawner};
use super::task::StoreTask;

pub(crate) type Observer<S> = Box<dyn FnMut(&S) + Send>;

/// Removes one observer from the core that holds it.
pub(crate) type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Whether a dispatched action came from the outside or from an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    Send,
    Effect,
}

/// Hooks called under the dispatch lock around every reduced action.
pub(crate) trait Tap<S, A>: Send + Sync {
    fn will_reduce(&self, state: &S);

    fn did_reduce(&self, origin: Origin, action: &A, state: &S);
}

pub(crate) trait StoreCore<S, A>: Send + Sync {
    fn send(&self, action: A) -> StoreTask;

    /// Call `visit` exactly once with the current state.
    fn read(&self, visit: &mut dyn FnMut(&S));

    /// Register an observer and call it with the current state.
    ///
    /// The returned closure unsubscribes from the root that owns the
    /// observer, whichever handle it was registered through.
    fn subscribe(&self, observer: Observer<S>) -> (u64, Unsubscribe);

    fn in_flight(&self) -> Arc<InFlight>;

    fn name(&self) -> Arc<str>;

    /// Cancel every running effect without affecting later ones.
    fn cancel_effects(&self);
}

struct Inner<S> {
    state: S,
    observers: Vec<(u64, Observer<S>)>,
    next_observer: u64,
}

pub(crate) struct Root<R: Reducer> {
    this: Weak<Self>,
    reducer: R,
    inner: Mutex<Inner<R::State>>,
    effects: EffectRuntime<R::Action>,
    token: Mutex<CancellationToken>,
    tap: Option<Arc<dyn Tap<R::State, R::Action>>>,
}

impl<R: Reducer> Root<R> {
    pub(crate) fn new(
        state: R::State,
        reducer: R,
        name: Arc<str>,
        spawner: Spawner,
        tap: Option<Arc<dyn Tap<R::State, R::Action>>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let this = weak.clone();
            Root {
                this: weak.clone(),
                reducer,
                inner: Mutex::new(Inner {
                    state,
                    observers: Vec::new(),
                    next_observer: 0,
                }),
                effects: EffectRuntime {
                    deliver: Arc::new(move |action, token: &CancellationToken| {
                        if let Some(root) = this.upgrade() {
                            root.receive(action, token);
                        }
                    }),
                    registry: Arc::new(CancellationRegistry::new()),
                    spawner,
                    in_flight: Arc::new(InFlight::default()),
                    store: name,
                },
                token: Mutex::new(CancellationToken::new()),
                tap,
            }
        })
    }

    /// Reduce one action and start its effect, all under the dispatch lock.
    ///
    /// `source` is the token of the effect that sent the action; the action
    /// is dropped when that effect has been cancelled by the time the lock
    /// is held.
    fn dispatch(
        &self,
        action: R::Action,
        source: Option<&CancellationToken>,
        token: &CancellationToken,
    ) -> Option<runtime::Completion> {
        let mut inner = self.inner.lock();
        if source.is_some_and(CancellationToken::is_cancelled) {
            tracing::trace!(store = %self.effects.store, "dropping action from cancelled effect");
            return None;
        }

        let Inner {
            state, observers, ..
        } = &mut *inner;
        let tapped = self.tap.as_ref().map(|tap| {
            tap.will_reduce(state);
            (tap, action.clone())
        });

        let effect = self.reducer.reduce(state, action);
        tracing::trace!(
            store = %self.effects.store,
            effect = ?effect,
            "reduced action"
        );
        let completion = runtime::start(effect, &self.effects, token);

        if let Some((tap, action)) = tapped {
            let origin = if source.is_some() {
                Origin::Effect
            } else {
                Origin::Send
            };
            tap.did_reduce(origin, &action, state);
        }
        for (_, observer) in observers.iter_mut() {
            observer(state);
        }
        completion
    }

    fn remove_observer(&self, id: u64) {
        self.inner.lock().observers.retain(|(observer, _)| *observer != id);
    }

    fn receive(&self, action: R::Action, source: &CancellationToken) {
        let token = self.token.lock().child();
        if let Some(completion) = self.dispatch(action, Some(source), &token) {
            drop(self.effects.detach(completion));
        }
    }
}

impl<R: Reducer> StoreCore<R::State, R::Action> for Root<R> {
    fn send(&self, action: R::Action) -> StoreTask {
        let token = self.token.lock().child();
        let handle = self
            .dispatch(action, None, &token)
            .map(|completion| self.effects.detach(completion));
        StoreTask::new(handle, token)
    }

    fn read(&self, visit: &mut dyn FnMut(&R::State)) {
        visit(&self.inner.lock().state);
    }

    fn subscribe(&self, mut observer: Observer<R::State>) -> (u64, Unsubscribe) {
        let mut inner = self.inner.lock();
        let id = inner.next_observer;
        inner.next_observer += 1;
        observer(&inner.state);
        inner.observers.push((id, observer));

        let root = self.this.clone();
        let unsubscribe: Unsubscribe = Box::new(move || {
            if let Some(root) = root.upgrade() {
                root.remove_observer(id);
            }
        });
        (id, unsubscribe)
    }

    fn in_flight(&self) -> Arc<InFlight> {
        Arc::clone(&self.effects.in_flight)
    }

    fn name(&self) -> Arc<str> {
        Arc::clone(&self.effects.store)
    }

    fn cancel_effects(&self) {
        let previous = std::mem::take(&mut *self.token.lock());
        previous.cancel();
        self.effects.registry.cancel_all();
    }
}

impl<R: Reducer> Drop for Root<R> {
    fn drop(&mut self) {
        tracing::debug!(store = %self.effects.store, "store dropped; cancelling effects");
        self.token.get_mut().cancel();
        self.effects.registry.cancel_all();
    }
}

/// A core that views a parent core through a projection.
pub(crate) struct Scoped<PS, PA, S, A> {
    pub(crate) parent: Arc<dyn StoreCore<PS, PA>>,
    pub(crate) to_child: Arc<dyn Fn(&PS) -> S + Send + Sync>,
    pub(crate) embed: Arc<dyn Fn(A) -> PA + Send + Sync>,
}

impl<PS, PA, S, A> StoreCore<S, A> for Scoped<PS, PA, S, A>
where
    PS: 'static,
    PA: 'static,
    S: 'static,
    A: 'static,
{
    fn send(&self, action: A) -> StoreTask {
        self.parent.send((self.embed)(action))
    }

    fn read(&self, visit: &mut dyn FnMut(&S)) {
        self.parent
            .read(&mut |parent: &PS| visit(&(self.to_child)(parent)));
    }

    fn subscribe(&self, mut observer: Observer<S>) -> (u64, Unsubscribe) {
        let to_child = Arc::clone(&self.to_child);
        self.parent
            .subscribe(Box::new(move |parent: &PS| observer(&to_child(parent))))
    }

    fn in_flight(&self) -> Arc<InFlight> {
        self.parent.in_flight()
    }

    fn name(&self) -> Arc<str> {
        self.parent.name()
    }

    fn cancel_effects(&self) {
        self.parent.cancel_effects();
    }
}

impl<R: Reducer> fmt::Debug for Root<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("store", &self.effects.store)
            .field("in_flight", &self.effects.in_flight.count())
            .finish()
    }
}
