//! Inbound events published by the session server over its SSE stream.

use serde::{Deserialize, Serialize};

use crate::types::{MessageInfo, Part, SessionInfo};

/// Session activity status carried by `session.status` events.
///
/// Only `"busy"` is meaningful to the client; every other value clears the
/// busy flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    #[serde(rename = "type")]
    pub kind: String,
}

impl StatusInfo {
    #[must_use]
    pub fn busy() -> Self {
        Self {
            kind: "busy".to_string(),
        }
    }

    #[must_use]
    pub fn idle() -> Self {
        Self {
            kind: "idle".to_string(),
        }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.kind == "busy"
    }
}

/// Server event, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "message.updated")]
    MessageUpdated { info: MessageInfo },
    #[serde(rename = "message.part.updated")]
    MessagePartUpdated { part: Part },
    #[serde(rename = "message.removed")]
    MessageRemoved {
        #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        #[serde(rename = "messageID")]
        message_id: String,
    },
    #[serde(rename = "session.status")]
    SessionStatus {
        #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
        status: StatusInfo,
    },
    #[serde(rename = "session.updated")]
    SessionUpdated { info: SessionInfo },
    #[serde(rename = "session.created")]
    SessionCreated { info: SessionInfo },
    #[serde(rename = "session.deleted")]
    SessionDeleted { info: SessionInfo },
}

impl ServerEvent {
    /// Parses one SSE data payload. Unknown discriminants and malformed
    /// payloads yield `None`; the stream is expected to self-correct on the
    /// next full event, so callers skip rather than fail.
    #[must_use]
    pub fn parse(payload: &str) -> Option<Self> {
        serde_json::from_str(payload).ok()
    }

    /// Stable discriminant name, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageUpdated { .. } => "message.updated",
            Self::MessagePartUpdated { .. } => "message.part.updated",
            Self::MessageRemoved { .. } => "message.removed",
            Self::SessionStatus { .. } => "session.status",
            Self::SessionUpdated { .. } => "session.updated",
            Self::SessionCreated { .. } => "session.created",
            Self::SessionDeleted { .. } => "session.deleted",
        }
    }
}
