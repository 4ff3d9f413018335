//! Reducers: pure state transitions that describe their side effects.
//!
//! A [`Reducer`] takes the current state and an action, mutates the state in
//! place, and returns an [`Effect`] for any asynchronous work. It must not
//! block, sleep or perform I/O itself.
//!
//! Larger features are built from smaller ones:
//!
//! - [`Scope`] lifts a child reducer into a parent's state and action space.
//! - [`ReducerExt::combine`] runs reducers in sequence on the same action.
//! - [`ReducerExt::if_let`] and [`ReducerExt::for_each`] run a child reducer
//!   on optional state or on an element of an [`IdentifiedVec`].
//! - [`ReducerExt::traced`] logs actions and state changes.
//!
//! # Example
//!
//! ```rust
//! use reflux::prelude::*;
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Counter {
//!     count: i32,
//! }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum CounterAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! let counter = Reduce::new(|state: &mut Counter, action: CounterAction| {
//!     match action {
//!         CounterAction::Increment => state.count += 1,
//!         CounterAction::Decrement => state.count -= 1,
//!     }
//!     Effect::none()
//! });
//!
//! let mut state = Counter::default();
//! counter.reduce(&mut state, CounterAction::Increment);
//! assert_eq!(state.count, 1);
//! ```
//!
//! [`IdentifiedVec`]: crate::IdentifiedVec

mod combinators;
mod paths;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::effect::Effect;
use crate::identified::{Identifiable, IdentifiedVec};

pub use combinators::{ActionFormat, Combine, CombineReducers, ForEach, IfLet, Scope, Traced};
pub use paths::CasePath;

/// A pure state transition that returns a description of its side effects.
pub trait Reducer: Send + Sync + 'static {
    /// The state this reducer operates on.
    type State: Send + 'static;

    /// The actions this reducer handles.
    ///
    /// Actions are `Clone` because one action is offered to every reducer in
    /// a combined chain.
    type Action: Clone + Send + 'static;

    /// Apply `action` to `state`, returning the effect to run.
    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Effect<Self::Action>;
}

/// A type-erased reducer.
pub type BoxReducer<S, A> = Box<dyn Reducer<State = S, Action = A>>;

impl<R: Reducer + ?Sized> Reducer for Box<R> {
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Effect<Self::Action> {
        (**self).reduce(state, action)
    }
}

impl<R: Reducer + ?Sized> Reducer for Arc<R> {
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Effect<Self::Action> {
        (**self).reduce(state, action)
    }
}

/// A reducer built from a closure.
pub struct Reduce<S, A, F> {
    f: F,
    _marker: PhantomData<fn(&mut S, A)>,
}

impl<S, A, F> Reduce<S, A, F>
where
    F: Fn(&mut S, A) -> Effect<A> + Send + Sync + 'static,
{
    /// Wrap `f` as a reducer.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<S, A, F> Reducer for Reduce<S, A, F>
where
    S: Send + 'static,
    A: Clone + Send + 'static,
    F: Fn(&mut S, A) -> Effect<A> + Send + Sync + 'static,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: &mut S, action: A) -> Effect<A> {
        (self.f)(state, action)
    }
}

impl<S, A, F> fmt::Debug for Reduce<S, A, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reduce").field("f", &"<function>").finish()
    }
}

/// A reducer that does nothing.
pub struct EmptyReducer<S, A> {
    _marker: PhantomData<fn(&mut S, A)>,
}

impl<S, A> EmptyReducer<S, A> {
    /// Create the no-op reducer.
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S, A> Default for EmptyReducer<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> Reducer for EmptyReducer<S, A>
where
    S: Send + 'static,
    A: Clone + Send + 'static,
{
    type State = S;
    type Action = A;

    fn reduce(&self, _state: &mut S, _action: A) -> Effect<A> {
        Effect::none()
    }
}

impl<S, A> fmt::Debug for EmptyReducer<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmptyReducer")
    }
}

/// Composition methods available on every [`Reducer`].
pub trait ReducerExt: Reducer + Sized {
    /// Run `self`, then `other`, on the same action.
    ///
    /// `other` sees the state as already mutated by `self`; the two effects
    /// are merged.
    fn combine<R>(self, other: R) -> Combine<Self, R>
    where
        R: Reducer<State = Self::State, Action = Self::Action>,
    {
        Combine::new(self, other)
    }

    /// Run `child` on optional child state, before `self`.
    ///
    /// When `action` extracts a child action and `state` finds the child,
    /// the child reduces it and its effects are lifted back. When the child
    /// state is absent the child step is skipped silently. `self` always
    /// runs afterwards with the original action.
    fn if_let<L, C>(self, state: L, action: CasePath<Self::Action, C::Action>, child: C) -> IfLet<Self, L, C>
    where
        C: Reducer,
        L: Fn(&mut Self::State) -> Option<&mut C::State> + Send + Sync + 'static,
    {
        IfLet::new(self, state, action, child)
    }

    /// Run `child` on the element of a collection addressed by id, before
    /// `self`.
    ///
    /// Actions for ids that are no longer present are skipped silently.
    fn for_each<L, C>(
        self,
        elements: L,
        action: CasePath<Self::Action, (<C::State as Identifiable>::Id, C::Action)>,
        child: C,
    ) -> ForEach<Self, L, C>
    where
        C: Reducer,
        C::State: Identifiable,
        L: Fn(&mut Self::State) -> &mut IdentifiedVec<C::State> + Send + Sync + 'static,
    {
        ForEach::new(self, elements, action, child)
    }

    /// Log every action and the resulting state change at debug level.
    fn traced(self, format: ActionFormat) -> Traced<Self>
    where
        Self::State: fmt::Debug,
        Self::Action: fmt::Debug,
    {
        Traced::new(self, format)
    }

    /// Erase the reducer's type.
    fn boxed(self) -> BoxReducer<Self::State, Self::Action> {
        Box::new(self)
    }
}

impl<R: Reducer> ReducerExt for R {}

#[cfg(test)]
mod tests;
