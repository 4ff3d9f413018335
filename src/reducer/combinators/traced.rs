//! Traced - log actions and state changes.

use std::fmt;

use tracing::Level;

use crate::effect::Effect;
use crate::reducer::Reducer;
use crate::snapshot;

/// How much of each action [`Traced`] logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionFormat {
    /// The full `Debug` rendering, payload included.
    #[default]
    Full,
    /// Only the variant name, for actions carrying bulky or sensitive data.
    LabelsOnly,
}

impl ActionFormat {
    fn render<A: fmt::Debug>(self, action: &A) -> String {
        let full = format!("{:?}", action);
        match self {
            ActionFormat::Full => full,
            ActionFormat::LabelsOnly => {
                let end = full.find(['(', ' ', '{']).unwrap_or(full.len());
                full[..end].to_string()
            }
        }
    }
}

/// Wraps a reducer and logs, at debug level, every action it receives
/// together with a line diff of the state it changed.
///
/// Nothing is formatted unless debug logging is enabled for this crate.
pub struct Traced<R> {
    inner: R,
    format: ActionFormat,
}

impl<R> Traced<R> {
    /// Trace `inner`, rendering actions with `format`.
    pub fn new(inner: R, format: ActionFormat) -> Self {
        Self { inner, format }
    }
}

impl<R> Reducer for Traced<R>
where
    R: Reducer,
    R::State: fmt::Debug,
    R::Action: fmt::Debug,
{
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) -> Effect<Self::Action> {
        if !tracing::enabled!(Level::DEBUG) {
            return self.inner.reduce(state, action);
        }

        let label = self.format.render(&action);
        let before = format!("{:#?}", state);
        let effect = self.inner.reduce(state, action);
        let after = format!("{:#?}", state);

        if before == after {
            tracing::debug!(action = %label, "received action (no state change)");
        } else {
            tracing::debug!(
                action = %label,
                changes = %snapshot::line_diff(&before, &after),
                "received action"
            );
        }
        effect
    }
}

impl<R> fmt::Debug for Traced<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("inner", &"<reducer>")
            .field("format", &self.format)
            .finish()
    }
}
