//! Injected collaborators for effects: clocks and id generators.
//!
//! Reducers receive their dependencies explicitly, usually as fields set at
//! construction time. Effects capture clones of them. Tests swap in
//! deterministic implementations by constructing the reducer differently;
//! nothing is looked up ambiently.
//!
//! # Example
//!
//! ```rust
//! use reflux::dependencies::{Dependencies, UuidGenerator};
//!
//! let deps = Dependencies::live().with_uuid(UuidGenerator::incrementing());
//! assert_eq!(
//!     deps.uuid.generate().to_string(),
//!     "00000000-0000-0000-0000-000000000000"
//! );
//! assert_eq!(
//!     deps.uuid.generate().to_string(),
//!     "00000000-0000-0000-0000-000000000001"
//! );
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::effect::BoxFuture;

/// A source of time for effects.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> Instant;

    /// A future that completes `duration` after this call.
    ///
    /// The deadline is fixed when `sleep` is called, not when the future is
    /// first polled, so effects built during a reduce are timed from the
    /// action that created them.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// The live clock, backed by tokio's timer.
///
/// Because it uses `tokio::time`, tests running with paused time
/// (`#[tokio::test(start_paused = true)]`) control it through
/// `tokio::time::advance`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        let deadline = Instant::now() + duration;
        Box::pin(async move { tokio::time::sleep_until(deadline).await })
    }
}

/// A clock whose sleeps finish immediately.
///
/// Each sleep moves the virtual `now` forward by the requested duration, so
/// code that measures elapsed time still sees it pass.
#[derive(Debug)]
pub struct ImmediateClock {
    now: Mutex<Instant>,
}

impl ImmediateClock {
    /// Start the virtual clock at the current instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }
}

impl Default for ImmediateClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ImmediateClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        *self.now.lock() += duration;
        Box::pin(std::future::ready(()))
    }
}

/// Generates UUIDs on demand.
#[derive(Clone)]
pub struct UuidGenerator {
    generate: Arc<dyn Fn() -> Uuid + Send + Sync>,
}

impl UuidGenerator {
    /// Wrap an arbitrary generator function.
    pub fn new<F>(generate: F) -> Self
    where
        F: Fn() -> Uuid + Send + Sync + 'static,
    {
        Self {
            generate: Arc::new(generate),
        }
    }

    /// Random (v4) UUIDs.
    pub fn live() -> Self {
        Self::new(Uuid::new_v4)
    }

    /// `00000000-0000-0000-0000-000000000000`, then `…001`, `…002`, and so on.
    pub fn incrementing() -> Self {
        let next = AtomicU64::new(0);
        Self::new(move || Uuid::from_u128(u128::from(next.fetch_add(1, Ordering::SeqCst))))
    }

    /// Always the same UUID.
    pub fn constant(uuid: Uuid) -> Self {
        Self::new(move || uuid)
    }

    /// Produce the next UUID.
    pub fn generate(&self) -> Uuid {
        (self.generate)()
    }
}

impl fmt::Debug for UuidGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UuidGenerator")
            .field("generate", &"<function>")
            .finish()
    }
}

/// The standard dependency bundle handed to reducers.
#[derive(Debug, Clone)]
pub struct Dependencies {
    /// Time source for delays, debouncing and timeouts.
    pub clock: Arc<dyn Clock>,
    /// Id generator for newly created entities.
    pub uuid: UuidGenerator,
}

impl Dependencies {
    /// Production dependencies: tokio time and random UUIDs.
    pub fn live() -> Self {
        Self {
            clock: Arc::new(TokioClock),
            uuid: UuidGenerator::live(),
        }
    }

    /// Deterministic dependencies: tokio time (pause it in tests) and
    /// incrementing UUIDs.
    pub fn test() -> Self {
        Self {
            clock: Arc::new(TokioClock),
            uuid: UuidGenerator::incrementing(),
        }
    }

    /// Replace the clock.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the UUID generator.
    pub fn with_uuid(mut self, uuid: UuidGenerator) -> Self {
        self.uuid = uuid;
        self
    }
}

impl Default for Dependencies {
    fn default() -> Self {
        Self::live()
    }
}
