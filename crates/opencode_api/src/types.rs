//! Shared data model for sessions, messages, and streaming parts.
//!
//! The remote server is authoritative for all of these records; the client
//! only mirrors them. Unknown fields are tolerated everywhere so that newer
//! servers can add payload data without breaking older clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Creation/update timestamps in epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeInfo {
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub updated: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareInfo {
    pub url: String,
}

/// Present while an undo is pending; its presence is what enables redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevertInfo {
    #[serde(rename = "messageID")]
    pub message_id: String,
}

/// File-change aggregate across the session's turns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(default)]
    pub files: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Non-null marks this session as a delegated child/subtask session.
    #[serde(rename = "parentID", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share: Option<ShareInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert: Option<RevertInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
    #[serde(default)]
    pub time: TimeInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    pub id: String,
    #[serde(rename = "sessionID")]
    pub session_id: String,
    pub role: Role,
    /// Human-readable digest of a turn, independent of compaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub time: TimeInfo,
}

/// Per-step token accounting carried by `step-finish` parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input: u64,
    #[serde(default)]
    pub output: u64,
}

/// Tool execution state machine. The server only moves `status` forward
/// through `pending → running → {completed, error}`; the client renders
/// whatever state it last saw and treats `status` as the single source of
/// truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolState {
    Pending,
    Running {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<Value>,
        #[serde(default)]
        output: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<Value>,
        error: String,
    },
}

impl ToolState {
    /// Tool-call input for whichever state currently carries one.
    #[must_use]
    pub fn input(&self) -> Option<&Value> {
        match self {
            Self::Pending => None,
            Self::Running { input, .. }
            | Self::Completed { input, .. }
            | Self::Error { input, .. } => input.as_ref(),
        }
    }

    #[must_use]
    pub fn output(&self) -> Option<&Value> {
        match self {
            Self::Completed { output, .. } => Some(output),
            _ => None,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&Value> {
        match self {
            Self::Running { metadata, .. } | Self::Completed { metadata, .. } => metadata.as_ref(),
            _ => None,
        }
    }
}

/// Completion marker for reasoning parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningTime {
    #[serde(default)]
    pub end: Option<u64>,
}

/// One incrementally-arriving piece of a message, unique by `id` within its
/// owning message. Updates are idempotent upserts keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    #[serde(rename = "messageID")]
    pub message_id: String,
    #[serde(rename = "sessionID", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub body: PartBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PartBody {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
        /// Server-generated context filler, hidden from direct display
        /// unless it is the only content.
        #[serde(default)]
        synthetic: bool,
    },
    #[serde(rename = "tool")]
    Tool {
        tool: String,
        #[serde(rename = "callID", default, skip_serializing_if = "Option::is_none")]
        call_id: Option<String>,
        state: ToolState,
    },
    #[serde(rename = "reasoning")]
    Reasoning {
        #[serde(default)]
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<ReasoningTime>,
    },
    #[serde(rename = "step-finish")]
    StepFinish {
        #[serde(default)]
        tokens: TokenUsage,
    },
    #[serde(rename = "file")]
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    #[serde(rename = "subtask")]
    Subtask {
        agent: String,
        description: String,
        #[serde(default)]
        prompt: String,
        /// Server-side extras; may carry the spawned child session id under
        /// a `sessionID` key once the delegation starts.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
}

/// One message plus its ordered parts, as loaded from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageWithParts {
    pub info: MessageInfo,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl MessageWithParts {
    #[must_use]
    pub fn new(info: MessageInfo) -> Self {
        Self {
            info,
            parts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLimit {
    #[serde(default)]
    pub context: u64,
    #[serde(default)]
    pub output: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub limit: ModelLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// A `{provider, model}` pair as carried by send/set-model commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    #[serde(rename = "providerID")]
    pub provider_id: String,
    #[serde(rename = "modelID")]
    pub model_id: String,
}
