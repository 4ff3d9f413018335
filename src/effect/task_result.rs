//! Comparable results for fallible effect work.
//!
//! Actions must stay comparable so tests can assert on them, but most error
//! types are not `PartialEq`. [`TaskResult`] wraps a success value or any
//! error in a form that is `Clone + PartialEq`: two failures are equal when
//! they hold the same concrete error type with the same display text.
//!
//! # Example
//!
//! ```rust
//! use reflux::{Effect, TaskResult};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Action {
//!     Parsed(TaskResult<u32>),
//! }
//!
//! let effect: Effect<Action> = Effect::task(async {
//!     Action::Parsed(TaskResult::from_future(async { "12".parse::<u32>() }).await)
//! });
//! # drop(effect);
//! ```

use std::any::TypeId;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The outcome of fallible effect work, with a comparable error.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult<T> {
    /// The work succeeded.
    Success(T),
    /// The work failed.
    Failure(TaskFailure),
}

impl<T> TaskResult<T> {
    /// Await a fallible future and capture its outcome.
    pub async fn from_future<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>>,
        E: StdError + Send + Sync + 'static,
    {
        future.await.into()
    }

    /// Whether this is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Success(_))
    }

    /// Whether this is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskResult::Failure(_))
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> TaskResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            TaskResult::Success(value) => TaskResult::Success(f(value)),
            TaskResult::Failure(failure) => TaskResult::Failure(failure),
        }
    }

    /// Convert into a plain `Result`.
    pub fn into_result(self) -> Result<T, TaskFailure> {
        match self {
            TaskResult::Success(value) => Ok(value),
            TaskResult::Failure(failure) => Err(failure),
        }
    }
}

impl<T, E> From<Result<T, E>> for TaskResult<T>
where
    E: StdError + Send + Sync + 'static,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => TaskResult::Success(value),
            Err(error) => TaskResult::Failure(TaskFailure::new(error)),
        }
    }
}

/// A type-erased, cloneable, comparable error.
#[derive(Clone)]
pub struct TaskFailure {
    error: Arc<dyn StdError + Send + Sync>,
    type_id: TypeId,
}

impl TaskFailure {
    /// Wrap an error.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            error: Arc::new(error),
            type_id: TypeId::of::<E>(),
        }
    }

    /// Borrow the wrapped error if it has type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.error.downcast_ref::<E>()
    }

    /// Whether the wrapped error has type `E`.
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<E>()
    }
}

impl PartialEq for TaskFailure {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.error.to_string() == other.error.to_string()
    }
}

impl fmt::Debug for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TaskFailure").field(&self.error).finish()
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl StdError for TaskFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.error.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("device busy")]
    struct Busy;

    #[derive(Debug, thiserror::Error)]
    #[error("device busy")]
    struct LookAlike;

    #[tokio::test]
    async fn from_future_captures_success_and_failure() {
        let ok = TaskResult::from_future(async { "7".parse::<u8>() }).await;
        assert_eq!(ok, TaskResult::Success(7));

        let err = TaskResult::from_future(async { "x".parse::<u8>() }).await;
        assert!(err.is_failure());
    }

    #[test]
    fn failures_compare_by_type_and_message() {
        assert_eq!(TaskFailure::new(Busy), TaskFailure::new(Busy));
        assert_ne!(TaskFailure::new(Busy), TaskFailure::new(LookAlike));
    }

    #[test]
    fn downcast_and_is() {
        let failure = TaskFailure::new(Busy);
        assert!(failure.is::<Busy>());
        assert!(!failure.is::<LookAlike>());
        assert!(failure.downcast_ref::<Busy>().is_some());
        assert_eq!(failure.to_string(), "device busy");
    }

    #[test]
    fn map_and_into_result() {
        let result: TaskResult<u8> = TaskResult::Success(2);
        assert_eq!(result.map(|n| n * 10).into_result(), Ok(20));

        let failed: TaskResult<u8> = Err::<u8, _>(Busy).into();
        assert_eq!(failed.into_result(), Err(TaskFailure::new(Busy)));
    }
}
