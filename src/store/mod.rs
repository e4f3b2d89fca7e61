//! Independently-owned state mirrors, mutated only by their own reducers.
//!
//! The controller composes these stores but never reaches into their state
//! directly; each applies inbound event deltas and exposes derived views
//! that are always consistent with current state immediately after any
//! mutation.

mod message;
mod model;
mod session;

pub use message::MessageStore;
pub use model::ModelStore;
pub use session::SessionStore;
