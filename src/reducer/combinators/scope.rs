//! Scope - lift a child reducer into a parent domain.

use std::fmt;
use std::marker::PhantomData;

use crate::effect::Effect;
use crate::reducer::{CasePath, Reducer};

/// Runs a child reducer on a slice of parent state, for parent actions that
/// embed a child action.
///
/// Parent actions of any other case are ignored. The child's effects are
/// mapped back into the parent action space through the case path.
///
/// # Example
///
/// ```rust
/// use reflux::prelude::*;
/// use reflux::case_path;
///
/// #[derive(Debug, Default)]
/// struct App {
///     clicks: u32,
/// }
///
/// #[derive(Debug, Clone)]
/// enum AppAction {
///     Button(()),
///     Quit,
/// }
///
/// let clicks = Reduce::new(|n: &mut u32, _: ()| {
///     *n += 1;
///     Effect::none()
/// });
///
/// let app = Scope::new(|app: &mut App| &mut app.clicks, case_path!(AppAction::Button), clicks);
///
/// let mut state = App::default();
/// app.reduce(&mut state, AppAction::Button(()));
/// app.reduce(&mut state, AppAction::Quit);
/// assert_eq!(state.clicks, 1);
/// ```
pub struct Scope<PS, PA, L, C: Reducer> {
    state: L,
    action: CasePath<PA, C::Action>,
    child: C,
    _marker: PhantomData<fn(&mut PS)>,
}

impl<PS, PA, L, C> Scope<PS, PA, L, C>
where
    C: Reducer,
    L: Fn(&mut PS) -> &mut C::State + Send + Sync + 'static,
{
    /// Scope `child` to the state at `state` and the actions in `action`.
    pub fn new(state: L, action: CasePath<PA, C::Action>, child: C) -> Self {
        Self {
            state,
            action,
            child,
            _marker: PhantomData,
        }
    }
}

impl<PS, PA, L, C> Reducer for Scope<PS, PA, L, C>
where
    PS: Send + 'static,
    PA: Clone + Send + 'static,
    C: Reducer,
    L: Fn(&mut PS) -> &mut C::State + Send + Sync + 'static,
{
    type State = PS;
    type Action = PA;

    fn reduce(&self, state: &mut PS, action: PA) -> Effect<PA> {
        match self.action.extract(action) {
            Ok(child_action) => self
                .child
                .reduce((self.state)(state), child_action)
                .map(self.action.embedder()),
            Err(_) => Effect::none(),
        }
    }
}

impl<PS, PA, L, C: Reducer> fmt::Debug for Scope<PS, PA, L, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("state", &"<function>")
            .field("action", &self.action)
            .finish()
    }
}
