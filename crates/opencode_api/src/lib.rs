//! Wire contract and transport client for an OpenCode-style session server.
//!
//! This crate owns the typed event/command surface only: inbound
//! [`ServerEvent`] values parsed from the server's SSE stream, outbound
//! [`ClientCommand`] payloads, and the session/message/part data model both
//! sides share. It intentionally contains no store or reconciliation logic
//! and no UI coupling.
//!
//! Commands are fire-and-forget from the caller's perspective: a successful
//! submit means the server accepted the payload, and every visible state
//! change arrives back through the event stream.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod retry;
pub mod sse;
pub mod types;

pub use client::OpencodeClient;
pub use commands::{ClientCommand, CommandEnvelope, FileAttachment};
pub use config::ApiConfig;
pub use error::ApiError;
pub use events::{ServerEvent, StatusInfo};
pub use sse::SseStreamParser;
pub use types::{
    MessageInfo, MessageWithParts, ModelInfo, ModelLimit, ModelRef, Part, PartBody, ProviderInfo,
    ReasoningTime, RevertInfo, Role, SessionInfo, SessionSummary, ShareInfo, TimeInfo, TokenUsage,
    ToolState,
};
