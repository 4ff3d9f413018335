//! # Reflux
//!
//! > *"State flows down, actions flow back"*
//!
//! A Rust library for building application features as unidirectional data
//! flow: state, actions, pure reducers and explicit, cancellable effects.
//!
//! ## Philosophy
//!
//! **Reflux** keeps the **pure core, imperative shell** split explicit:
//! - **Reducers** are pure: given a state and an action they mutate the state
//!   and *describe* the side effects to perform.
//! - **Effects** are data: lazy descriptions of async work that talk back only
//!   by sending actions.
//! - **The store** is the only thing that runs anything. It serializes every
//!   state change and executes effects on tokio.
//!
//! Small features compose into larger ones with [`Scope`], [`ReducerExt`] and
//! [`Store::scope`], and every feature can be tested step by step with
//! [`TestStore`](testing::TestStore).
//!
//! ## Quick Example
//!
//! ```rust
//! use reflux::prelude::*;
//! use std::time::Duration;
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Search {
//!     query: String,
//!     results: Vec<String>,
//! }
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum SearchAction {
//!     QueryChanged(String),
//!     Results(Vec<String>),
//! }
//!
//! #[derive(Debug, Hash, PartialEq, Eq)]
//! struct SearchRequest;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let deps = Dependencies::live();
//! let search = Reduce::new(move |state: &mut Search, action: SearchAction| match action {
//!     SearchAction::QueryChanged(query) => {
//!         state.query = query.clone();
//!         Effect::task(async move { SearchAction::Results(vec![query.to_uppercase()]) })
//!             .debounce(SearchRequest, Duration::from_millis(300), deps.clock.clone())
//!     }
//!     SearchAction::Results(results) => {
//!         state.results = results;
//!         Effect::none()
//!     }
//! });
//!
//! let store = Store::new(Search::default(), search);
//! store.send(SearchAction::QueryChanged("rust".into())).finish().await.unwrap();
//! assert_eq!(store.state().results, vec!["RUST".to_string()]);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cancellation;
pub mod dependencies;
pub mod effect;
pub mod error;
pub mod identified;
pub mod reducer;
mod snapshot;
pub mod store;
pub mod testing;

pub use cancellation::CancelId;
pub use dependencies::Dependencies;
pub use effect::{Effect, Sender, TaskFailure, TaskPriority, TaskResult};
pub use error::StoreError;
pub use identified::{Identifiable, IdentifiedVec};
pub use reducer::{CasePath, Reduce, Reducer, ReducerExt, Scope};
pub use store::{Observation, Store, StoreTask};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dependencies::{Clock, Dependencies, UuidGenerator};
    pub use crate::effect::{Effect, Sender, TaskPriority, TaskResult};
    pub use crate::identified::{Identifiable, IdentifiedVec};
    pub use crate::reducer::{
        ActionFormat, CasePath, CombineReducers, EmptyReducer, Reduce, Reducer, ReducerExt, Scope,
    };
    pub use crate::store::Store;
}
