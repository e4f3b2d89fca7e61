//! Outbound command payloads issued to the session server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ModelRef;

/// File attached to an outgoing user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

/// Command to the session server, discriminated by `type`.
///
/// Every command is fire-and-forget: the client never blocks on an
/// acknowledgment, and all resulting state arrives back as [`crate::ServerEvent`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    #[serde(rename = "send")]
    Send {
        #[serde(rename = "sessionID")]
        session_id: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<ModelRef>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        files: Vec<FileAttachment>,
    },
    #[serde(rename = "session.create")]
    CreateSession {
        #[serde(rename = "parentID", default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    #[serde(rename = "session.select")]
    SelectSession {
        #[serde(rename = "sessionID")]
        session_id: String,
    },
    #[serde(rename = "session.delete")]
    DeleteSession {
        #[serde(rename = "sessionID")]
        session_id: String,
    },
    #[serde(rename = "abort")]
    Abort {
        #[serde(rename = "sessionID")]
        session_id: String,
    },
    /// Compress/summarize the session server-side.
    #[serde(rename = "summarize")]
    Summarize {
        #[serde(rename = "sessionID")]
        session_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<ModelRef>,
    },
    #[serde(rename = "revert")]
    Revert {
        #[serde(rename = "sessionID")]
        session_id: String,
        #[serde(rename = "messageID")]
        message_id: String,
    },
    /// Redo: clears a pending revert.
    #[serde(rename = "unrevert")]
    Unrevert {
        #[serde(rename = "sessionID")]
        session_id: String,
    },
    #[serde(rename = "fork")]
    Fork {
        #[serde(rename = "sessionID")]
        session_id: String,
        #[serde(rename = "messageID", default, skip_serializing_if = "Option::is_none")]
        message_id: Option<String>,
    },
    #[serde(rename = "model.set")]
    SetModel { model: ModelRef },
}

impl ClientCommand {
    /// Stable discriminant name, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Send { .. } => "send",
            Self::CreateSession { .. } => "session.create",
            Self::SelectSession { .. } => "session.select",
            Self::DeleteSession { .. } => "session.delete",
            Self::Abort { .. } => "abort",
            Self::Summarize { .. } => "summarize",
            Self::Revert { .. } => "revert",
            Self::Unrevert { .. } => "unrevert",
            Self::Fork { .. } => "fork",
            Self::SetModel { .. } => "model.set",
        }
    }
}

/// Wire envelope pairing a command with a client-generated request id, so
/// server logs can correlate retried submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(rename = "requestID")]
    pub request_id: String,
    #[serde(flatten)]
    pub command: ClientCommand,
}

impl CommandEnvelope {
    #[must_use]
    pub fn new(command: ClientCommand) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_command_serializes_with_wire_field_names() {
        let command = ClientCommand::Send {
            session_id: "ses_1".to_string(),
            text: "hello".to_string(),
            model: Some(ModelRef {
                provider_id: "anthropic".to_string(),
                model_id: "claude".to_string(),
            }),
            files: Vec::new(),
        };

        let json = serde_json::to_value(&command).expect("command serializes");
        assert_eq!(json["type"], "send");
        assert_eq!(json["sessionID"], "ses_1");
        assert_eq!(json["model"]["providerID"], "anthropic");
        assert!(json.get("files").is_none());
    }

    #[test]
    fn envelope_flattens_command_next_to_request_id() {
        let envelope = CommandEnvelope::new(ClientCommand::Unrevert {
            session_id: "ses_9".to_string(),
        });

        let json = serde_json::to_value(&envelope).expect("envelope serializes");
        assert_eq!(json["type"], "unrevert");
        assert_eq!(json["sessionID"], "ses_9");
        assert!(json["requestID"].as_str().is_some_and(|id| !id.is_empty()));
    }
}
