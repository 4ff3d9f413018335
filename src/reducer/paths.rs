//! Case paths: embedding and extracting one case of an enum.
//!
//! A parent action embeds child actions in one of its variants. Scoping a
//! child reducer needs both directions: pull a child action *out* of a parent
//! action (if it is that case) and wrap a child action *into* the parent (to
//! lift the child's effects). [`CasePath`] carries the two functions as one
//! value; [`case_path!`](crate::case_path) writes it for single-field tuple
//! variants.

use std::fmt;
use std::sync::Arc;

/// The extract/embed pair for one case of an enum `P` holding a `C`.
pub struct CasePath<P, C> {
    extract: Arc<dyn Fn(P) -> Result<C, P> + Send + Sync>,
    embed: Arc<dyn Fn(C) -> P + Send + Sync>,
}

impl<P: 'static, C: 'static> CasePath<P, C> {
    /// Build a case path from its two directions.
    ///
    /// `extract` must hand the value back unchanged (as `Err`) when it is a
    /// different case, and `extract(embed(c))` must return `Ok(c)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reflux::CasePath;
    ///
    /// #[derive(Debug, Clone, PartialEq)]
    /// enum Action {
    ///     Row(u32, bool),
    ///     Clear,
    /// }
    ///
    /// let row = CasePath::new(
    ///     |action| match action {
    ///         Action::Row(id, checked) => Ok((id, checked)),
    ///         other => Err(other),
    ///     },
    ///     |(id, checked)| Action::Row(id, checked),
    /// );
    ///
    /// assert_eq!(row.extract(Action::Row(3, true)), Ok((3, true)));
    /// assert_eq!(row.extract(Action::Clear), Err(Action::Clear));
    /// assert_eq!(row.embed((1, false)), Action::Row(1, false));
    /// ```
    pub fn new<E, M>(extract: E, embed: M) -> Self
    where
        E: Fn(P) -> Result<C, P> + Send + Sync + 'static,
        M: Fn(C) -> P + Send + Sync + 'static,
    {
        Self {
            extract: Arc::new(extract),
            embed: Arc::new(embed),
        }
    }

    /// Pull the child value out, or return the parent unchanged.
    pub fn extract(&self, parent: P) -> Result<C, P> {
        (self.extract)(parent)
    }

    /// Wrap a child value into the parent case.
    pub fn embed(&self, child: C) -> P {
        (self.embed)(child)
    }

    /// An owned embed function, for mapping effects.
    pub fn embedder(&self) -> impl Fn(C) -> P + Send + Sync + 'static {
        let embed = Arc::clone(&self.embed);
        move |child| embed(child)
    }

    /// Compose with a case path one level deeper.
    pub fn appending<D: 'static>(self, inner: CasePath<C, D>) -> CasePath<P, D> {
        let outer_extract = Arc::clone(&self.extract);
        let outer_embed = Arc::clone(&self.embed);
        let inner_extract = Arc::clone(&inner.extract);
        let inner_embed = inner.embed;
        let rewrap = Arc::clone(&self.embed);
        CasePath::new(
            move |parent| {
                let child = outer_extract(parent)?;
                inner_extract(child).map_err(|child| rewrap(child))
            },
            move |value| outer_embed(inner_embed(value)),
        )
    }
}

impl<P, C> Clone for CasePath<P, C> {
    fn clone(&self) -> Self {
        Self {
            extract: Arc::clone(&self.extract),
            embed: Arc::clone(&self.embed),
        }
    }
}

impl<P, C> fmt::Debug for CasePath<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasePath")
            .field("parent", &std::any::type_name::<P>())
            .field("child", &std::any::type_name::<C>())
            .finish()
    }
}

/// Build a [`CasePath`] for a single-field tuple variant.
///
/// # Example
///
/// ```rust
/// use reflux::case_path;
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum Counter {
///     Increment,
/// }
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum App {
///     First(Counter),
///     Second(Counter),
/// }
///
/// let first = case_path!(App::First);
/// assert_eq!(first.extract(App::First(Counter::Increment)), Ok(Counter::Increment));
/// assert!(first.extract(App::Second(Counter::Increment)).is_err());
/// ```
#[macro_export]
macro_rules! case_path {
    ($($variant:ident)::+) => {
        $crate::CasePath::new(
            |parent| match parent {
                $($variant)::+(child) => ::core::result::Result::Ok(child),
                #[allow(unreachable_patterns)]
                other => ::core::result::Result::Err(other),
            },
            $($variant)::+,
        )
    };
}
