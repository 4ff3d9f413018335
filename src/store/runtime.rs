//! Starting effects: the interpreter from [`Effect`] trees to tokio tasks.
//!
//! [`start`] is called with the dispatch lock held. Everything that must be
//! visible before the lock is released happens synchronously: cancellations,
//! cancel-in-flight, registrations and spawning of leaf tasks. It returns a
//! future that resolves when the whole tree has finished, or `None` when the
//! tree had no asynchronous work left.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{join_all, select_all};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::cancellation::{CancellationRegistry, CancellationToken};
use crate::effect::sender::Deliver;
use crate::effect::{BoxFuture, Effect, Kind, Operation, Sender};
use crate::error::StoreError;

pub(crate) type Completion = BoxFuture<'static, Result<(), StoreError>>;

/// Counts dispatched actions whose effects have not finished yet.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    pub(crate) fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            in_flight: Arc::clone(self),
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Resolve once every tracked effect has finished.
    pub(crate) async fn settled(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

pub(crate) struct InFlightGuard {
    in_flight: Arc<InFlight>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.in_flight.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.in_flight.idle.notify_waiters();
        }
    }
}

/// Where effect tasks go.
#[derive(Debug, Clone, Default)]
pub(crate) struct Spawner {
    handle: Option<Handle>,
}

impl Spawner {
    pub(crate) fn new(handle: Option<Handle>) -> Self {
        Self { handle }
    }

    /// Spawn on the configured runtime, or the current one.
    ///
    /// Panics outside a tokio runtime when none was configured.
    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        match &self.handle {
            Some(handle) => handle.spawn(future),
            None => tokio::spawn(future),
        }
    }
}

/// Everything needed to start an effect for one store.
pub(crate) struct EffectRuntime<A> {
    pub(crate) deliver: Deliver<A>,
    pub(crate) registry: Arc<CancellationRegistry>,
    pub(crate) spawner: Spawner,
    pub(crate) in_flight: Arc<InFlight>,
    pub(crate) store: Arc<str>,
}

impl<A> Clone for EffectRuntime<A> {
    fn clone(&self) -> Self {
        Self {
            deliver: Arc::clone(&self.deliver),
            registry: Arc::clone(&self.registry),
            spawner: self.spawner.clone(),
            in_flight: Arc::clone(&self.in_flight),
            store: Arc::clone(&self.store),
        }
    }
}

impl<A: Send + 'static> EffectRuntime<A> {
    /// Spawn a completion future as its own tracked task.
    pub(crate) fn detach(&self, completion: Completion) -> JoinHandle<Result<(), StoreError>> {
        let guard = self.in_flight.enter();
        self.spawner.spawn(async move {
            let _guard = guard;
            completion.await
        })
    }
}

/// Start `effect` under `token`.
pub(crate) fn start<A: Send + 'static>(
    effect: Effect<A>,
    rt: &EffectRuntime<A>,
    token: &CancellationToken,
) -> Option<Completion> {
    match effect.kind {
        Kind::None => None,
        Kind::Run(operation) => Some(spawn_leaf(operation, rt, token)),
        Kind::Merge(effects) => {
            let running: Vec<_> = effects
                .into_iter()
                .filter_map(|effect| start(effect, rt, token))
                .collect();
            if running.is_empty() {
                return None;
            }
            Some(Box::pin(async move {
                join_all(running).await.into_iter().collect()
            }))
        }
        Kind::Concatenate(effects) => {
            let mut rest = effects.into_iter();
            let first = rest.next().and_then(|effect| start(effect, rt, token));
            let rt = rt.clone();
            let token = token.clone();
            Some(Box::pin(async move {
                if let Some(first) = first {
                    first.await?;
                }
                for effect in rest {
                    if token.is_cancelled() {
                        break;
                    }
                    if let Some(next) = start(effect, &rt, &token) {
                        next.await?;
                    }
                }
                Ok(())
            }))
        }
        Kind::Race(effects) => {
            if effects.iter().any(Effect::is_none) {
                return None;
            }
            let race = token.child();
            let mut running = Vec::with_capacity(effects.len());
            let mut settled_early = false;
            for effect in effects {
                match start(effect, rt, &race) {
                    Some(completion) => running.push(completion),
                    None => settled_early = true,
                }
            }
            if settled_early {
                // a child that only cancelled finishes first
                race.cancel();
                if running.is_empty() {
                    return None;
                }
                return Some(Box::pin(async move {
                    join_all(running).await.into_iter().collect()
                }));
            }
            Some(Box::pin(async move {
                let (winner, _, losers) = select_all(running).await;
                race.cancel();
                let wound_down: Result<(), StoreError> =
                    join_all(losers).await.into_iter().collect();
                winner.and(wound_down)
            }))
        }
        Kind::Cancel(ids) => {
            for id in &ids {
                rt.registry.cancel(id);
            }
            None
        }
        Kind::Cancellable {
            effect,
            id,
            cancel_in_flight,
        } => {
            if cancel_in_flight {
                rt.registry.cancel(&id);
            }
            let scoped = token.child();
            let registration = rt.registry.register(id, scoped.clone());
            let completion = start(*effect, rt, &scoped)?;
            Some(Box::pin(async move {
                let _registration = registration;
                completion.await
            }))
        }
    }
}

fn spawn_leaf<A: Send + 'static>(
    operation: Operation<A>,
    rt: &EffectRuntime<A>,
    token: &CancellationToken,
) -> Completion {
    let Operation {
        run,
        priority,
        span,
    } = operation;
    let span = span.unwrap_or_else(|| {
        tracing::trace_span!("effect", store = %rt.store, priority = ?priority)
    });
    let send = Sender::new(Arc::clone(&rt.deliver), token.clone());
    let token = token.clone();
    let handle = rt.spawner.spawn(
        async move {
            // built inside the task so nothing runs under the dispatch lock
            let work = run(send);
            tokio::select! {
                biased;
                _ = token.cancelled() => tracing::trace!("effect cancelled"),
                _ = work => tracing::trace!("effect finished"),
            }
        }
        .instrument(span),
    );
    Box::pin(async move {
        handle.await.map_err(|error| {
            let error = StoreError::from(error);
            tracing::error!(%error, "effect task failed");
            error
        })
    })
}
