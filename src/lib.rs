//! Client-side reconciliation core for OpenCode-style coding-agent sessions.
//!
//! Invariant: the remote session server owns all session/message content.
//! The stores here are read-through mirrors rebuilt from inbound events, and
//! every user intent leaves as a fire-and-forget command whose effects come
//! back over the same event stream. The only optimistic local mutations are
//! client-side conveniences (model selection, the composer prefill buffer),
//! never message or session content.
//!
//! # Public API Overview
//! - Mirror server state with the stores in [`store`] and route events
//!   through a [`controller::SessionController`].
//! - Feed transport events in strict arrival order via
//!   [`dispatch::EventQueue`].
//! - Inject the outbound command path with [`controller::CommandSink`].
//! - Derive to-do lists with [`todo::parse_todos`] and persist client-local
//!   preferences with [`prefs::Prefs`].

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod prefs;
pub mod store;
pub mod todo;

pub use config::EnvConfig;
pub use controller::{Checkpoint, CommandSink, FileChange, SessionController};
pub use dispatch::EventQueue;
pub use prefs::{Prefs, PrefsError};
pub use store::{MessageStore, ModelStore, SessionStore};
pub use todo::{parse_todos, TodoItem};
