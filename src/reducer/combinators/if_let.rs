//! IfLet - run a child reducer on optional state.

use std::fmt;

use crate::effect::Effect;
use crate::reducer::{CasePath, Reducer};

/// A parent reducer with a child that runs on optional state.
///
/// Built by [`ReducerExt::if_let`](crate::ReducerExt::if_let). The child
/// runs first so it sees its state before the parent can clear it (for
/// example on a dismiss action). Child actions that arrive while the child
/// state is absent are logged at debug level and skipped.
pub struct IfLet<P: Reducer, L, C: Reducer> {
    parent: P,
    state: L,
    action: CasePath<P::Action, C::Action>,
    child: C,
}

impl<P, L, C> IfLet<P, L, C>
where
    P: Reducer,
    C: Reducer,
    L: Fn(&mut P::State) -> Option<&mut C::State> + Send + Sync + 'static,
{
    /// Attach `child` to the optional state found by `state`.
    pub fn new(parent: P, state: L, action: CasePath<P::Action, C::Action>, child: C) -> Self {
        Self {
            parent,
            state,
            action,
            child,
        }
    }
}

impl<P, L, C> Reducer for IfLet<P, L, C>
where
    P: Reducer,
    C: Reducer,
    L: Fn(&mut P::State) -> Option<&mut C::State> + Send + Sync + 'static,
{
    type State = P::State;
    type Action = P::Action;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Effect<Self::Action> {
        let child_effect = match self.action.extract(action.clone()) {
            Ok(child_action) => match (self.state)(state) {
                Some(child_state) => self
                    .child
                    .reduce(child_state, child_action)
                    .map(self.action.embedder()),
                None => {
                    tracing::debug!(
                        child = std::any::type_name::<C::State>(),
                        "child action received while child state is absent; ignoring"
                    );
                    Effect::none()
                }
            },
            Err(_) => Effect::none(),
        };
        child_effect.merge_with(self.parent.reduce(state, action))
    }
}

impl<P: Reducer, L, C: Reducer> fmt::Debug for IfLet<P, L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IfLet")
            .field("state", &"<function>")
            .field("action", &self.action)
            .finish()
    }
}
