//! Cooperative cancellation: identities, tokens and the registry.
//!
//! Effects started by a [`Store`](crate::Store) never get forcibly
//! interrupted. Each running effect observes a [`CancellationToken`] and stops
//! at its next suspension point once the token is cancelled. Effects made
//! [`cancellable`](crate::Effect::cancellable) are additionally recorded in a
//! [`CancellationRegistry`] under a [`CancelId`], so a later
//! [`Effect::cancel`](crate::Effect::cancel) can find them.
//!
//! # Example
//!
//! ```rust
//! use reflux::cancellation::{CancelId, CancellationToken};
//!
//! let parent = CancellationToken::new();
//! let child = parent.child();
//!
//! parent.cancel();
//! assert!(child.is_cancelled());
//!
//! // Ids compare by type and value.
//! assert_eq!(CancelId::new("search"), CancelId::new("search"));
//! assert_ne!(CancelId::new(1_u32), CancelId::new(1_u64));
//! ```

mod id;
mod registry;
mod token;

pub use id::CancelId;
pub use registry::{CancellationRegistry, Registration, RegistrationId};
pub use token::CancellationToken;
