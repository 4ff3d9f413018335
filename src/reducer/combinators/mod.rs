//! Combinator types for reducer composition.
//!
//! Most users build these through [`ReducerExt`](super::ReducerExt) and
//! [`Scope::new`]; the types are public so they can appear in signatures.

mod combine;
mod for_each;
mod if_let;
mod scope;
mod traced;

pub use combine::{Combine, CombineReducers};
pub use for_each::ForEach;
pub use if_let::IfLet;
pub use scope::Scope;
pub use traced::{ActionFormat, Traced};
