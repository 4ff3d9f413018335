//! Combine - run reducers in sequence on the same action.

use std::fmt;

use crate::effect::Effect;
use crate::reducer::{BoxReducer, Reducer};

/// Runs two reducers in order against the same action.
///
/// State mutations accumulate: `second` sees the state as left by `first`.
/// The effects of both are merged and run concurrently.
pub struct Combine<A, B> {
    first: A,
    second: B,
}

impl<A, B> Combine<A, B> {
    /// Combine two reducers.
    pub fn new(first: A, second: B) -> Self {
        Combine { first, second }
    }
}

impl<A, B> Reducer for Combine<A, B>
where
    A: Reducer,
    B: Reducer<State = A::State, Action = A::Action>,
{
    type State = A::State;
    type Action = A::Action;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Effect<Self::Action> {
        let first = self.first.reduce(state, action.clone());
        let second = self.second.reduce(state, action);
        first.merge_with(second)
    }
}

impl<A, B> fmt::Debug for Combine<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combine")
            .field("first", &"<reducer>")
            .field("second", &"<reducer>")
            .finish()
    }
}

/// Any number of reducers run in declared order, like [`Combine`].
///
/// # Example
///
/// ```rust
/// use reflux::prelude::*;
///
/// let body = CombineReducers::new()
///     .with(Reduce::new(|count: &mut i32, step: i32| {
///         *count += step;
///         Effect::none()
///     }))
///     .with(Reduce::new(|count: &mut i32, _step: i32| {
///         *count *= 10;
///         Effect::none()
///     }));
///
/// let mut count = 0;
/// body.reduce(&mut count, 2);
/// assert_eq!(count, 20);
/// ```
pub struct CombineReducers<S, A> {
    reducers: Vec<BoxReducer<S, A>>,
}

impl<S, A> CombineReducers<S, A>
where
    S: Send + 'static,
    A: Clone + Send + 'static,
{
    /// An empty chain.
    pub fn new() -> Self {
        Self {
            reducers: Vec::new(),
        }
    }

    /// Append a reducer to the chain.
    pub fn with<R>(mut self, reducer: R) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        self.reducers.push(Box::new(reducer));
        self
    }

    /// Number of reducers in the chain.
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A> Default for CombineReducers<S, A>
where
    S: Send + 'static,
    A: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> FromIterator<BoxReducer<S, A>> for CombineReducers<S, A> {
    fn from_iter<I: IntoIterator<Item = BoxReducer<S, A>>>(iter: I) -> Self {
        Self {
            reducers: iter.into_iter().collect(),
        }
    }
}

impl<S, A> Reducer for CombineReducers<S, A>
where
    S: Send + 'static,
    A: Clone + Send + 'static,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &mut S, action: A) -> Effect<A> {
        Effect::merge(
            self.reducers
                .iter()
                .map(|reducer| reducer.reduce(state, action.clone()))
                .collect::<Vec<_>>(),
        )
    }
}

impl<S, A> fmt::Debug for CombineReducers<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombineReducers")
            .field("len", &self.reducers.len())
            .finish()
    }
}
