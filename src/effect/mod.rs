//! Lazy, cancellable descriptions of asynchronous work.
//!
//! A reducer never performs I/O. It returns an [`Effect`] describing work
//! for the [`Store`](crate::Store) to run, and that work talks back only by
//! sending actions. Nothing inside an `Effect` executes until a store starts
//! it.
//!
//! # Building effects
//!
//! | Constructor | Produces |
//! |-------------|----------|
//! | [`Effect::none`] | nothing |
//! | [`Effect::send`] | one action, right away |
//! | [`Effect::task`], [`Effect::task_optional`], [`Effect::try_task`] | at most one action from a future |
//! | [`Effect::run`], [`Effect::try_run`] | any number of actions over time |
//! | [`Effect::fire_and_forget`] | no actions, only work |
//! | [`Effect::merge`] | children concurrently |
//! | [`Effect::concatenate`] | children one after another |
//! | [`Effect::race`] | children concurrently, first to finish wins |
//! | [`Effect::cancel`] | cancellation of everything under an id |
//!
//! and are adapted with [`cancellable`](Effect::cancellable),
//! [`map`](Effect::map), [`debounce`](Effect::debounce),
//! [`timeout`](Effect::timeout) and [`instrument`](Effect::instrument).
//!
//! # Example
//!
//! ```rust
//! use reflux::Effect;
//! use std::time::Duration;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Action {
//!     Tick,
//!     Loaded(String),
//! }
//!
//! let effect: Effect<Action> = Effect::merge([
//!     Effect::task(async { Action::Loaded("profile".into()) }),
//!     Effect::run(|send| async move {
//!         for _ in 0..3 {
//!             tokio::time::sleep(Duration::from_secs(1)).await;
//!             send.send(Action::Tick);
//!         }
//!     })
//!     .cancellable("timer", true),
//! ]);
//!
//! assert!(!effect.is_none());
//! ```

pub(crate) mod sender;
pub mod task_result;
mod tracing;

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::cancellation::CancelId;
use crate::dependencies::Clock;

pub use sender::Sender;
pub use task_result::{TaskFailure, TaskResult};

/// A boxed future that is Send + 'a.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Scheduling hint attached to task effects.
///
/// tokio schedules tasks without priorities, so the value is advisory: it is
/// recorded on the effect's tracing span and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    /// Work the user is actively waiting on.
    High,
    /// Work started directly by the user.
    UserInitiated,
    /// The default.
    Medium,
    /// Work that may be deferred.
    Low,
    /// Long-running work whose progress the user may not watch.
    Utility,
    /// Maintenance or prefetching.
    Background,
}

/// A deferred unit or stream of asynchronous work that yields actions.
///
/// See the [module docs](self) for the full list of constructors.
pub struct Effect<A> {
    pub(crate) kind: Kind<A>,
}

pub(crate) enum Kind<A> {
    None,
    Run(Operation<A>),
    Merge(Vec<Effect<A>>),
    Concatenate(Vec<Effect<A>>),
    Race(Vec<Effect<A>>),
    Cancel(Vec<CancelId>),
    Cancellable {
        effect: Box<Effect<A>>,
        id: CancelId,
        cancel_in_flight: bool,
    },
}

type RunFn<A> = Box<dyn FnOnce(Sender<A>) -> BoxFuture<'static, ()> + Send>;

pub(crate) struct Operation<A> {
    pub(crate) run: RunFn<A>,
    pub(crate) priority: Option<TaskPriority>,
    pub(crate) span: Option<::tracing::Span>,
}

impl<A> Effect<A> {
    fn from_kind(kind: Kind<A>) -> Self {
        Effect { kind }
    }

    /// An effect that does nothing and completes immediately.
    pub fn none() -> Self {
        Self::from_kind(Kind::None)
    }

    /// Whether this effect is [`none`](Self::none).
    pub fn is_none(&self) -> bool {
        matches!(self.kind, Kind::None)
    }
}

impl<A: Send + 'static> Effect<A> {
    /// Run an operation that may send any number of actions.
    ///
    /// The operation receives a [`Sender`]. Every `send` is reduced by the
    /// store before it returns, so actions from one operation are processed
    /// in the order they were sent. Once the effect is cancelled, further
    /// sends are dropped and the operation is abandoned at its next
    /// suspension point.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reflux::Effect;
    ///
    /// let effect = Effect::run(|send| async move {
    ///     for n in 1..=3 {
    ///         send.send(n);
    ///     }
    /// });
    /// # let _: Effect<i32> = effect;
    /// ```
    pub fn run<F, Fut>(operation: F) -> Self
    where
        F: FnOnce(Sender<A>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::from_kind(Kind::Run(Operation {
            run: Box::new(move |send| Box::pin(operation(send))),
            priority: None,
            span: None,
        }))
    }

    /// Run a fallible operation; an error is handed to `catch` together with
    /// the sender so it can be turned into actions.
    ///
    /// Errors are not retried and never reach the store on their own.
    pub fn try_run<F, Fut, E, C>(operation: F, catch: C) -> Self
    where
        F: FnOnce(Sender<A>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Send + 'static,
        C: FnOnce(E, &Sender<A>) + Send + 'static,
    {
        Self::run(move |send: Sender<A>| {
            let fallback = send.clone();
            async move {
                if let Err(error) = operation(send).await {
                    catch(error, &fallback);
                }
            }
        })
    }

    /// Await a future and send the action it produces.
    pub fn task<F>(future: F) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        Self::run(move |send| async move { send.send(future.await) })
    }

    /// Like [`task`](Self::task), tagged with a [`TaskPriority`].
    pub fn task_with_priority<F>(priority: TaskPriority, future: F) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        let mut effect = Self::task(future);
        if let Kind::Run(operation) = &mut effect.kind {
            operation.priority = Some(priority);
        }
        effect
    }

    /// Await a future and send its action, if it produced one.
    pub fn task_optional<F>(future: F) -> Self
    where
        F: Future<Output = Option<A>> + Send + 'static,
    {
        Self::run(move |send| async move {
            if let Some(action) = future.await {
                send.send(action);
            }
        })
    }

    /// Await a fallible future. `Ok` actions are sent; errors go through
    /// `catch`, which decides which action (if any) to send instead.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reflux::Effect;
    ///
    /// #[derive(Debug, Clone, PartialEq)]
    /// enum Action {
    ///     Loaded(u32),
    ///     Failed(String),
    /// }
    ///
    /// let effect = Effect::try_task(
    ///     async { "42".parse::<u32>().map(Action::Loaded) },
    ///     |error| Some(Action::Failed(error.to_string())),
    /// );
    /// # let _: Effect<Action> = effect;
    /// ```
    pub fn try_task<F, E, C>(future: F, catch: C) -> Self
    where
        F: Future<Output = Result<A, E>> + Send + 'static,
        E: Send + 'static,
        C: FnOnce(E) -> Option<A> + Send + 'static,
    {
        Self::run(move |send| async move {
            let action = match future.await {
                Ok(action) => Some(action),
                Err(error) => catch(error),
            };
            if let Some(action) = action {
                send.send(action);
            }
        })
    }

    /// Send one action.
    pub fn send(action: A) -> Self {
        Self::run(move |send| async move { send.send(action) })
    }

    /// Run work that produces no actions.
    pub fn fire_and_forget<F>(work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::run(move |_send| work)
    }

    /// Run effects concurrently.
    ///
    /// Actions interleave in completion order. Cancelling the merged effect
    /// cancels every child. `none` children are dropped.
    pub fn merge<I>(effects: I) -> Self
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Self::none(),
            1 => effects.remove(0),
            _ => Self::from_kind(Kind::Merge(effects)),
        }
    }

    /// Run effects one after another.
    ///
    /// A child starts only after the previous child finished and every
    /// action it sent has been reduced.
    pub fn concatenate<I>(effects: I) -> Self
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Self::none(),
            1 => effects.remove(0),
            _ => Self::from_kind(Kind::Concatenate(effects)),
        }
    }

    /// Run effects concurrently until the first one finishes, then cancel
    /// the rest.
    ///
    /// A `none` child finishes immediately and therefore wins outright.
    pub fn race<I>(effects: I) -> Self
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut effects: Vec<_> = effects.into_iter().collect();
        match effects.len() {
            0 => Self::none(),
            1 => effects.remove(0),
            _ => Self::from_kind(Kind::Race(effects)),
        }
    }

    /// Cancel every in-flight effect registered under `id`.
    pub fn cancel<K>(id: K) -> Self
    where
        K: Hash + Eq + fmt::Debug + Send + Sync + 'static,
    {
        Self::from_kind(Kind::Cancel(vec![CancelId::new(id)]))
    }

    /// Cancel every in-flight effect registered under any of `ids`.
    pub fn cancel_all<I, K>(ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Hash + Eq + fmt::Debug + Send + Sync + 'static,
    {
        let ids: Vec<_> = ids.into_iter().map(CancelId::new).collect();
        if ids.is_empty() {
            return Self::none();
        }
        Self::from_kind(Kind::Cancel(ids))
    }

    /// Merge with another effect.
    pub fn merge_with(self, other: Effect<A>) -> Self {
        Self::merge([self, other])
    }

    /// Run `other` after this effect completes.
    pub fn concatenate_with(self, other: Effect<A>) -> Self {
        Self::concatenate([self, other])
    }

    /// Register this effect under `id` so it can be cancelled.
    ///
    /// The registration happens synchronously when the store starts the
    /// effect, before any of its work runs. With `cancel_in_flight`, effects
    /// already running under `id` are cancelled first, so at most one effect
    /// per id is active at a time.
    ///
    /// Cancelling `id` stops this effect's own work only. Effects started by
    /// actions it already sent belong to the store and keep running unless
    /// they are cancellable themselves.
    pub fn cancellable<K>(self, id: K, cancel_in_flight: bool) -> Self
    where
        K: Hash + Eq + fmt::Debug + Send + Sync + 'static,
    {
        if self.is_none() {
            return self;
        }
        Self::from_kind(Kind::Cancellable {
            effect: Box::new(self),
            id: CancelId::new(id),
            cancel_in_flight,
        })
    }

    /// Transform every action this effect produces.
    ///
    /// This is how child effects are lifted into a parent's action space.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared<B>(self, f: Arc<dyn Fn(A) -> B + Send + Sync>) -> Effect<B>
    where
        B: Send + 'static,
    {
        let map_all = |effects: Vec<Effect<A>>| {
            effects
                .into_iter()
                .map(|effect| effect.map_shared(Arc::clone(&f)))
                .collect()
        };
        let kind = match self.kind {
            Kind::None => Kind::None,
            Kind::Run(Operation {
                run,
                priority,
                span,
            }) => {
                let f = Arc::clone(&f);
                Kind::Run(Operation {
                    run: Box::new(move |send: Sender<B>| run(send.contramap(f))),
                    priority,
                    span,
                })
            }
            Kind::Merge(effects) => Kind::Merge(map_all(effects)),
            Kind::Concatenate(effects) => Kind::Concatenate(map_all(effects)),
            Kind::Race(effects) => Kind::Race(map_all(effects)),
            Kind::Cancel(ids) => Kind::Cancel(ids),
            Kind::Cancellable {
                effect,
                id,
                cancel_in_flight,
            } => Kind::Cancellable {
                effect: Box::new(effect.map_shared(Arc::clone(&f))),
                id,
                cancel_in_flight,
            },
        };
        Effect::from_kind(kind)
    }

    /// Delay this effect by `duration`, restarting the delay whenever
    /// another effect is debounced under the same `id`.
    ///
    /// Only the last effect in a burst runs.
    pub fn debounce<K>(self, id: K, duration: Duration, clock: Arc<dyn Clock>) -> Self
    where
        K: Hash + Eq + fmt::Debug + Send + Sync + 'static,
    {
        if self.is_none() {
            return self;
        }
        Self::concatenate([Self::fire_and_forget(clock.sleep(duration)), self])
            .cancellable(id, true)
    }

    /// Race this effect against a timer that sends `on_timeout`.
    ///
    /// Whichever finishes first cancels the other.
    pub fn timeout(self, duration: Duration, clock: Arc<dyn Clock>, on_timeout: A) -> Self {
        let expired = clock.sleep(duration);
        Self::race([
            self,
            Self::run(move |send| async move {
                expired.await;
                send.send(on_timeout);
            }),
        ])
    }
}

impl<A> Default for Effect<A> {
    fn default() -> Self {
        Self::none()
    }
}

impl<A> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::None => f.write_str("Effect::none"),
            Kind::Run(operation) => f
                .debug_struct("Effect::run")
                .field("operation", &"<function>")
                .field("priority", &operation.priority)
                .finish(),
            Kind::Merge(effects) => f.debug_tuple("Effect::merge").field(effects).finish(),
            Kind::Concatenate(effects) => {
                f.debug_tuple("Effect::concatenate").field(effects).finish()
            }
            Kind::Race(effects) => f.debug_tuple("Effect::race").field(effects).finish(),
            Kind::Cancel(ids) => f.debug_tuple("Effect::cancel").field(ids).finish(),
            Kind::Cancellable {
                effect,
                id,
                cancel_in_flight,
            } => f
                .debug_struct("Effect::cancellable")
                .field("effect", effect)
                .field("id", id)
                .field("cancel_in_flight", cancel_in_flight)
                .finish(),
        }
    }
}
