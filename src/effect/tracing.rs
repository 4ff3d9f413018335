//! Tracing support for effects.
//!
//! Every leaf of an effect runs inside a span. By default the store creates a
//! `trace`-level `effect` span carrying the store name and the task priority;
//! [`Effect::instrument`] replaces it with a caller-supplied span.

use super::{Effect, Kind};

impl<A: Send + 'static> Effect<A> {
    /// Run this effect's work inside `span`.
    ///
    /// Applies to every leaf that does not already carry a span, so inner
    /// instrumentation wins over outer.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reflux::Effect;
    /// use tracing::info_span;
    ///
    /// let effect: Effect<u32> = Effect::task(async { 42 })
    ///     .instrument(info_span!("load_answer", source = "cache"));
    /// # drop(effect);
    /// ```
    pub fn instrument(mut self, span: tracing::Span) -> Self {
        self.apply_span(&span);
        self
    }

    fn apply_span(&mut self, span: &tracing::Span) {
        match &mut self.kind {
            Kind::None | Kind::Cancel(_) => {}
            Kind::Run(operation) => {
                if operation.span.is_none() {
                    operation.span = Some(span.clone());
                }
            }
            Kind::Merge(effects) | Kind::Concatenate(effects) | Kind::Race(effects) => {
                for effect in effects {
                    effect.apply_span(span);
                }
            }
            Kind::Cancellable { effect, .. } => effect.apply_span(span),
        }
    }
}
