//! Exhaustive testing of features built on [`Store`].
//!
//! [`TestStore`] runs a real store and records every action it reduces. A
//! test then walks through the feature step by step:
//!
//! - [`send`](TestStore::send) an action and describe how the state should
//!   change,
//! - [`receive`](TestStore::receive) each action the effects send back, in
//!   order, again describing the state change,
//! - [`finish`](TestStore::finish) to check nothing was left unasserted.
//!
//! Any mismatch panics with a line diff of expected and actual state, so a
//! failing test reads like a failing `assert_eq!`.
//!
//! # Example
//!
//! ```rust
//! use reflux::prelude::*;
//! use reflux::testing::TestStore;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Action {
//!     Fetch,
//!     Fetched(u32),
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut store = TestStore::new(
//!     None,
//!     Reduce::new(|value: &mut Option<u32>, action: Action| match action {
//!         Action::Fetch => Effect::task(async { Action::Fetched(7) }),
//!         Action::Fetched(n) => {
//!             *value = Some(n);
//!             Effect::none()
//!         }
//!     }),
//! );
//!
//! store.send(Action::Fetch, |_| {});
//! store.receive(Action::Fetched(7), |value| *value = Some(7)).await;
//! store.finish().await;
//! # }
//! ```
//!
//! ## Assertion macros
//!
//! ```rust
//! use reflux::{assert_task_failure, assert_task_success, TaskResult};
//!
//! let ok: TaskResult<u8> = "4".parse::<u8>().into();
//! assert_task_success!(ok, 4);
//!
//! let err: TaskResult<u8> = "four".parse::<u8>().into();
//! assert_task_failure!(err);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::reducer::Reducer;
use crate::snapshot;
use crate::store::{Origin, Store, StoreTask, Tap};

/// How strictly a [`TestStore`] checks the feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Exhaustivity {
    /// Every received action must be asserted, every state change must be
    /// described in full, and every effect must be finished by
    /// [`TestStore::finish`].
    #[default]
    On,
    /// Only the changes a step describes are checked. Unasserted received
    /// actions are skipped and effects may still be running at the end.
    Off,
}

struct Record<S, A> {
    action: A,
    before: S,
    after: S,
}

struct Log<S, A> {
    staged: Option<S>,
    sent: Option<Record<S, A>>,
    received: VecDeque<Record<S, A>>,
}

struct Recorder<S, A> {
    log: Mutex<Log<S, A>>,
    arrived: Notify,
}

impl<S, A> Tap<S, A> for Recorder<S, A>
where
    S: Clone + Send,
    A: Clone + Send,
{
    fn will_reduce(&self, state: &S) {
        self.log.lock().staged = Some(state.clone());
    }

    fn did_reduce(&self, origin: Origin, action: &A, state: &S) {
        let mut log = self.log.lock();
        let Some(before) = log.staged.take() else {
            return;
        };
        let record = Record {
            action: action.clone(),
            before,
            after: state.clone(),
        };
        match origin {
            Origin::Send => log.sent = Some(record),
            Origin::Effect => {
                log.received.push_back(record);
                self.arrived.notify_waiters();
            }
        }
    }
}

/// A store wrapper that asserts on every step a feature takes.
pub struct TestStore<S, A> {
    store: Store<S, A>,
    recorder: Arc<Recorder<S, A>>,
    exhaustivity: Exhaustivity,
    timeout: Duration,
}

impl<S, A> TestStore<S, A>
where
    S: Clone + PartialEq + fmt::Debug + Send + 'static,
    A: Clone + PartialEq + fmt::Debug + Send + 'static,
{
    /// Wrap a fresh store around `state` and `reducer`.
    pub fn new<R>(state: S, reducer: R) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        let recorder = Arc::new(Recorder {
            log: Mutex::new(Log {
                staged: None,
                sent: None,
                received: VecDeque::new(),
            }),
            arrived: Notify::new(),
        });
        let store = Store::builder(state, reducer)
            .name("test")
            .tap(Arc::clone(&recorder) as Arc<dyn Tap<S, A>>)
            .build();
        Self {
            store,
            recorder,
            exhaustivity: Exhaustivity::On,
            timeout: Duration::from_secs(1),
        }
    }

    /// Set how strictly steps are checked.
    pub fn with_exhaustivity(mut self, exhaustivity: Exhaustivity) -> Self {
        self.exhaustivity = exhaustivity;
        self
    }

    /// How long [`receive`](Self::receive) and [`finish`](Self::finish) wait.
    ///
    /// Defaults to one second. Under paused tokio time the wait is virtual.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `action` and assert the state change `update` describes.
    ///
    /// `update` receives the state as it was before the action (or, with
    /// [`Exhaustivity::Off`], the actual new state) and must turn it into
    /// the expected new state.
    ///
    /// # Panics
    ///
    /// When received actions are still unasserted (exhaustive mode only), or
    /// when the resulting state differs from the expected one.
    #[track_caller]
    pub fn send(&mut self, action: A, update: impl FnOnce(&mut S)) -> StoreTask {
        if self.exhaustivity == Exhaustivity::On {
            let log = self.recorder.log.lock();
            if !log.received.is_empty() {
                let pending: Vec<&A> = log.received.iter().map(|r| &r.action).collect();
                panic!(
                    "must handle {} received action(s) before sending {:?}: {:#?}",
                    pending.len(),
                    action,
                    pending
                );
            }
        }

        let task = self.store.send(action.clone());
        let record = self.recorder.log.lock().sent.take();
        match record {
            Some(record) => self.check(&format!("sending {:?}", action), record, update),
            None => panic!("store did not record sending {:?}", action),
        }
        task
    }

    /// Wait for the next action an effect sends, assert it equals `action`
    /// and assert the state change `update` describes.
    ///
    /// With [`Exhaustivity::Off`], received actions that do not match are
    /// skipped.
    ///
    /// # Panics
    ///
    /// When no matching action arrives within the timeout, when the next
    /// action differs (exhaustive mode), or when the state differs.
    pub async fn receive(&mut self, action: A, update: impl FnOnce(&mut S)) {
        let record = self.next_received(&action).await;
        self.check(&format!("receiving {:?}", action), record, update);
    }

    /// Drop every action received so far without asserting on it.
    pub fn skip_received_actions(&mut self) {
        let skipped = std::mem::take(&mut self.recorder.log.lock().received);
        if !skipped.is_empty() {
            tracing::debug!(count = skipped.len(), "skipping received actions");
        }
    }

    /// Cancel every running effect so [`finish`](Self::finish) does not wait
    /// on them.
    pub fn skip_in_flight_effects(&mut self) {
        self.store.cancel_effects();
    }

    /// The underlying store, for scoping or observing.
    pub fn store(&self) -> &Store<S, A> {
        &self.store
    }

    /// The store's current state.
    pub fn state(&self) -> S {
        self.store.state()
    }

    /// Wait for every effect to finish, then assert nothing is left over.
    ///
    /// # Panics
    ///
    /// In exhaustive mode, when effects are still running after the timeout
    /// or when received actions were never asserted.
    pub async fn finish(self) {
        let settled = tokio::time::timeout(self.timeout, self.store.settled()).await;
        if self.exhaustivity == Exhaustivity::Off {
            return;
        }
        if settled.is_err() {
            panic!(
                "{} effect(s) still running after {:?}; await them, cancel them, \
                 or call skip_in_flight_effects",
                self.store.effects_in_flight(),
                self.timeout
            );
        }
        let log = self.recorder.log.lock();
        if !log.received.is_empty() {
            let pending: Vec<&A> = log.received.iter().map(|r| &r.action).collect();
            panic!(
                "{} received action(s) were never asserted: {:#?}",
                pending.len(),
                pending
            );
        }
    }

    async fn next_received(&self, expected: &A) -> Record<S, A> {
        let wait = async {
            loop {
                let arrived = self.recorder.arrived.notified();
                tokio::pin!(arrived);
                arrived.as_mut().enable();
                if let Some(record) = self.take_received(expected) {
                    return record;
                }
                arrived.await;
            }
        };
        match tokio::time::timeout(self.timeout, wait).await {
            Ok(record) => record,
            Err(_) => panic!(
                "expected to receive {:?} within {:?}, but it never arrived",
                expected, self.timeout
            ),
        }
    }

    fn take_received(&self, expected: &A) -> Option<Record<S, A>> {
        let mut log = self.recorder.log.lock();
        match self.exhaustivity {
            Exhaustivity::On => {
                let record = log.received.pop_front()?;
                if record.action != *expected {
                    panic!(
                        "received an unexpected action\n  expected: {:?}\n    actual: {:?}",
                        expected, record.action
                    );
                }
                Some(record)
            }
            Exhaustivity::Off => {
                let index = log.received.iter().position(|r| r.action == *expected)?;
                let skipped = log.received.drain(..index).count();
                if skipped > 0 {
                    tracing::debug!(skipped, "skipped received actions before match");
                }
                log.received.pop_front()
            }
        }
    }

    #[track_caller]
    fn check(&self, step: &str, record: Record<S, A>, update: impl FnOnce(&mut S)) {
        let mut expected = match self.exhaustivity {
            Exhaustivity::On => record.before,
            Exhaustivity::Off => record.after.clone(),
        };
        update(&mut expected);
        if expected != record.after {
            panic!(
                "state mismatch after {}: (- expected, + actual)\n{}",
                step,
                snapshot::line_diff(
                    &format!("{:#?}", expected),
                    &format!("{:#?}", record.after)
                )
            );
        }
    }
}

impl<S, A> fmt::Debug for TestStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestStore")
            .field("store", &self.store)
            .field("exhaustivity", &self.exhaustivity)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Assert that a [`TaskResult`](crate::TaskResult) is a success, optionally
/// with a given value.
#[macro_export]
macro_rules! assert_task_success {
    ($result:expr) => {
        match $result {
            $crate::TaskResult::Success(_) => {}
            $crate::TaskResult::Failure(failure) => {
                panic!("Expected Success, got Failure: {}", failure)
            }
        }
    };
    ($result:expr, $expected:expr) => {
        match $result {
            $crate::TaskResult::Success(value) => assert_eq!(value, $expected),
            $crate::TaskResult::Failure(failure) => {
                panic!("Expected Success, got Failure: {}", failure)
            }
        }
    };
}

/// Assert that a [`TaskResult`](crate::TaskResult) is a failure, optionally
/// of a given error type.
#[macro_export]
macro_rules! assert_task_failure {
    ($result:expr) => {
        match $result {
            $crate::TaskResult::Failure(_) => {}
            $crate::TaskResult::Success(value) => {
                panic!("Expected Failure, got Success: {:?}", value)
            }
        }
    };
    ($result:expr, $error:ty) => {
        match $result {
            $crate::TaskResult::Failure(failure) => assert!(
                failure.is::<$error>(),
                "Expected Failure of type {}, got: {}",
                stringify!($error),
                failure
            ),
            $crate::TaskResult::Success(value) => {
                panic!("Expected Failure, got Success: {:?}", value)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;
    use crate::reducer::Reduce;
    use crate::TaskResult;

    #[derive(Debug, Clone, PartialEq)]
    enum Action {
        Start,
        Tick(u8),
        Noop,
    }

    fn ticker() -> impl Reducer<State = Vec<u8>, Action = Action> {
        Reduce::new(|ticks: &mut Vec<u8>, action: Action| match action {
            Action::Start => Effect::run(|send| async move {
                send.send(Action::Tick(1));
                send.send(Action::Tick(2));
            }),
            Action::Tick(n) => {
                ticks.push(n);
                Effect::none()
            }
            Action::Noop => Effect::none(),
        })
    }

    #[tokio::test]
    async fn walks_through_received_actions() {
        let mut store = TestStore::new(Vec::new(), ticker());
        store.send(Action::Start, |_| {});
        store.receive(Action::Tick(1), |t| t.push(1)).await;
        store.receive(Action::Tick(2), |t| t.push(2)).await;
        store.finish().await;
    }

    #[tokio::test]
    #[should_panic(expected = "state mismatch after sending")]
    async fn wrong_state_panics() {
        let mut store = TestStore::new(Vec::new(), ticker());
        store.send(Action::Noop, |t| t.push(9));
    }

    #[tokio::test]
    #[should_panic(expected = "received an unexpected action")]
    async fn wrong_received_action_panics() {
        let mut store = TestStore::new(Vec::new(), ticker());
        store.send(Action::Start, |_| {});
        store.receive(Action::Tick(2), |t| t.push(2)).await;
    }

    #[tokio::test]
    #[should_panic(expected = "were never asserted")]
    async fn finish_requires_every_received_action() {
        let mut store = TestStore::new(Vec::new(), ticker());
        store.send(Action::Start, |_| {});
        store.receive(Action::Tick(1), |t| t.push(1)).await;
        store.finish().await;
    }

    #[tokio::test]
    #[should_panic(expected = "must handle 2 received action(s)")]
    async fn send_requires_received_actions_first() {
        let mut store = TestStore::new(Vec::new(), ticker());
        store.send(Action::Start, |_| {});
        store.store().settled().await;
        store.send(Action::Noop, |_| {});
    }

    #[tokio::test]
    async fn non_exhaustive_skips_what_it_does_not_assert() {
        let mut store =
            TestStore::new(Vec::new(), ticker()).with_exhaustivity(Exhaustivity::Off);
        store.send(Action::Start, |_| {});
        store.receive(Action::Tick(2), |_| {}).await;
        assert_eq!(store.state(), vec![1, 2]);
        store.finish().await;
    }

    #[tokio::test]
    async fn skip_received_actions_clears_the_queue() {
        let mut store = TestStore::new(Vec::new(), ticker());
        store.send(Action::Start, |_| {});
        store.store().settled().await;
        store.skip_received_actions();
        store.send(Action::Noop, |_| {});
        store.finish().await;
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "never arrived")]
    async fn receive_times_out() {
        let mut store = TestStore::new(Vec::new(), ticker());
        store.send(Action::Noop, |_| {});
        store.receive(Action::Tick(1), |_| {}).await;
    }

    #[tokio::test(start_paused = true)]
    async fn skip_in_flight_effects_lets_finish_pass() {
        let mut store = TestStore::new(
            0u8,
            Reduce::new(|_: &mut u8, _: ()| {
                Effect::fire_and_forget(std::future::pending())
            }),
        );
        store.send((), |_| {});
        assert_eq!(store.store().effects_in_flight(), 1);
        store.skip_in_flight_effects();
        store.finish().await;
    }

    #[test]
    fn task_result_macros() {
        let ok: TaskResult<u8> = "3".parse::<u8>().into();
        assert_task_success!(ok.clone());
        assert_task_success!(ok, 3);

        let err: TaskResult<u8> = "x".parse::<u8>().into();
        assert_task_failure!(err.clone());
        assert_task_failure!(err, std::num::ParseIntError);
    }
}
