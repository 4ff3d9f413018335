//! ForEach - run a child reducer on one element of a collection.

use std::fmt;

use crate::effect::Effect;
use crate::identified::{Identifiable, IdentifiedVec};
use crate::reducer::{CasePath, Reducer};

type ElementAction<C> = (<<C as Reducer>::State as Identifiable>::Id, <C as Reducer>::Action);

/// A parent reducer with a child that runs on the element addressed by id.
///
/// Built by [`ReducerExt::for_each`](crate::ReducerExt::for_each). Parent
/// actions carrying `(id, child_action)` are routed to the element with that
/// id; the child's effects are tagged with the same id on the way back. The
/// child runs before the parent, and an id that is no longer present is
/// skipped with a debug log.
pub struct ForEach<P: Reducer, L, C>
where
    C: Reducer,
    C::State: Identifiable,
{
    parent: P,
    elements: L,
    action: CasePath<P::Action, ElementAction<C>>,
    child: C,
}

impl<P, L, C> ForEach<P, L, C>
where
    P: Reducer,
    C: Reducer,
    C::State: Identifiable,
    L: Fn(&mut P::State) -> &mut IdentifiedVec<C::State> + Send + Sync + 'static,
{
    /// Attach `child` to the elements found by `elements`.
    pub fn new(
        parent: P,
        elements: L,
        action: CasePath<P::Action, ElementAction<C>>,
        child: C,
    ) -> Self {
        Self {
            parent,
            elements,
            action,
            child,
        }
    }
}

impl<P, L, C> Reducer for ForEach<P, L, C>
where
    P: Reducer,
    C: Reducer,
    C::State: Identifiable,
    L: Fn(&mut P::State) -> &mut IdentifiedVec<C::State> + Send + Sync + 'static,
{
    type State = P::State;
    type Action = P::Action;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Effect<Self::Action> {
        let child_effect = match self.action.extract(action.clone()) {
            Ok((id, child_action)) => match (self.elements)(state).get_mut(&id) {
                Some(element) => {
                    let embed = self.action.embedder();
                    self.child
                        .reduce(element, child_action)
                        .map(move |child_action| embed((id.clone(), child_action)))
                }
                None => {
                    tracing::debug!(?id, "element action for missing id; ignoring");
                    Effect::none()
                }
            },
            Err(_) => Effect::none(),
        };
        child_effect.merge_with(self.parent.reduce(state, action))
    }
}

impl<P, L, C> fmt::Debug for ForEach<P, L, C>
where
    P: Reducer,
    C: Reducer,
    C::State: Identifiable,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForEach")
            .field("elements", &"<function>")
            .field("action", &self.action)
            .finish()
    }
}
