use opencode_api::{MessageInfo, MessageWithParts, Part, PartBody};

use crate::todo::{parse_todos, TodoItem};

/// Ordered message list for the active session, plus the one-shot composer
/// prefill buffer repopulated after an undo.
///
/// All operations are total functions over in-memory state: malformed event
/// data (unknown message id, unparseable todo payload) degrades to a no-op
/// or `None`, never an error.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MessageStore {
    messages: Vec<MessageWithParts>,
    prefill: Option<String>,
}

impl MessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[MessageWithParts] {
        &self.messages
    }

    /// Full replacement, used when a session's history is (re)loaded from
    /// the server. The list is accepted as given.
    pub fn set_messages(&mut self, messages: Vec<MessageWithParts>) {
        self.messages = messages;
    }

    /// Upsert by id: appends a new entry with empty parts, or replaces only
    /// the `info` of an existing entry, preserving its parts.
    pub fn apply_message_updated(&mut self, info: MessageInfo) {
        if let Some(existing) = self
            .messages
            .iter_mut()
            .find(|message| message.info.id == info.id)
        {
            existing.info = info;
        } else {
            self.messages.push(MessageWithParts::new(info));
        }
    }

    /// Upsert a part by id within its owning message. An orphan part whose
    /// message is not present is silently dropped; it must never create a
    /// phantom message.
    pub fn apply_part_updated(&mut self, part: Part) {
        let Some(message) = self
            .messages
            .iter_mut()
            .find(|message| message.info.id == part.message_id)
        else {
            log::debug!(
                "dropping orphan part {} for unknown message {}",
                part.id,
                part.message_id
            );
            return;
        };

        if let Some(existing) = message
            .parts
            .iter_mut()
            .find(|existing| existing.id == part.id)
        {
            *existing = part;
        } else {
            message.parts.push(part);
        }
    }

    /// Removes a message entirely; used when the server deletes a turn
    /// during compaction.
    pub fn apply_message_removed(&mut self, message_id: &str) {
        self.messages
            .retain(|message| message.info.id != message_id);
    }

    /// Stages text for the composer.
    pub fn set_prefill_text(&mut self, text: impl Into<String>) {
        self.prefill = Some(text.into());
    }

    #[must_use]
    pub fn prefill(&self) -> Option<&str> {
        self.prefill.as_deref()
    }

    /// Takes the staged prefill text. Consuming twice is a no-op.
    pub fn consume_prefill(&mut self) -> Option<String> {
        self.prefill.take()
    }

    /// Sum of `tokens.input` across all `step-finish` parts currently
    /// present. Removing a message removes its contribution automatically.
    #[must_use]
    pub fn input_tokens(&self) -> u64 {
        self.messages
            .iter()
            .flat_map(|message| &message.parts)
            .map(|part| match &part.body {
                PartBody::StepFinish { tokens } => tokens.input,
                _ => 0,
            })
            .sum()
    }

    /// Most recent to-do list: scans messages newest-first, then parts
    /// newest-first, trying completed tool output before falling back to
    /// the tool call's `input.todos`.
    #[must_use]
    pub fn latest_todos(&self) -> Option<Vec<TodoItem>> {
        for message in self.messages.iter().rev() {
            for part in message.parts.iter().rev() {
                let PartBody::Tool { tool, state, .. } = &part.body else {
                    continue;
                };
                if tool != "todowrite" && tool != "todoread" {
                    continue;
                }

                if let Some(todos) = state.output().and_then(parse_todos) {
                    return Some(todos);
                }
                if let Some(todos) = state
                    .input()
                    .and_then(|input| input.get("todos"))
                    .and_then(parse_todos)
                {
                    return Some(todos);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencode_api::{Role, TimeInfo, TokenUsage, ToolState};
    use serde_json::json;

    fn info(id: &str, role: Role) -> MessageInfo {
        MessageInfo {
            id: id.to_string(),
            session_id: "ses_1".to_string(),
            role,
            summary: None,
            time: TimeInfo::default(),
        }
    }

    fn step_finish(id: &str, message_id: &str, input: u64) -> Part {
        Part {
            id: id.to_string(),
            message_id: message_id.to_string(),
            session_id: None,
            body: PartBody::StepFinish {
                tokens: TokenUsage { input, output: 10 },
            },
        }
    }

    fn todo_tool(id: &str, message_id: &str, state: ToolState) -> Part {
        Part {
            id: id.to_string(),
            message_id: message_id.to_string(),
            session_id: None,
            body: PartBody::Tool {
                tool: "todowrite".to_string(),
                call_id: None,
                state,
            },
        }
    }

    #[test]
    fn message_upsert_is_idempotent_and_preserves_parts() {
        let mut store = MessageStore::new();
        store.apply_message_updated(info("msg_1", Role::User));
        store.apply_part_updated(step_finish("prt_1", "msg_1", 100));

        store.apply_message_updated(info("msg_1", Role::User));
        store.apply_message_updated(info("msg_1", Role::User));

        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].parts.len(), 1);
    }

    #[test]
    fn orphan_part_never_creates_a_phantom_message() {
        let mut store = MessageStore::new();
        store.apply_part_updated(step_finish("prt_1", "msg_missing", 5));

        assert!(store.messages().is_empty());
        assert_eq!(store.input_tokens(), 0);
    }

    #[test]
    fn part_upsert_replaces_by_id_and_keeps_order() {
        let mut store = MessageStore::new();
        store.apply_message_updated(info("msg_1", Role::Assistant));
        store.apply_part_updated(step_finish("prt_a", "msg_1", 1));
        store.apply_part_updated(step_finish("prt_b", "msg_1", 2));
        store.apply_part_updated(step_finish("prt_a", "msg_1", 7));

        let parts = &store.messages()[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].id, "prt_a");
        assert_eq!(store.input_tokens(), 9);
    }

    #[test]
    fn token_sum_tracks_message_removal_exactly() {
        let mut store = MessageStore::new();
        store.apply_message_updated(info("msg_1", Role::Assistant));
        store.apply_message_updated(info("msg_2", Role::Assistant));
        store.apply_part_updated(step_finish("prt_1", "msg_1", 4000));
        store.apply_part_updated(step_finish("prt_2", "msg_2", 500));
        assert_eq!(store.input_tokens(), 4500);

        store.apply_message_removed("msg_1");
        assert_eq!(store.input_tokens(), 500);

        store.apply_message_removed("msg_unknown");
        assert_eq!(store.input_tokens(), 500);
    }

    #[test]
    fn prefill_is_one_shot() {
        let mut store = MessageStore::new();
        assert_eq!(store.consume_prefill(), None);

        store.set_prefill_text("restored draft");
        assert_eq!(store.prefill(), Some("restored draft"));
        assert_eq!(store.consume_prefill(), Some("restored draft".to_string()));
        assert_eq!(store.consume_prefill(), None);
    }

    #[test]
    fn latest_todos_prefers_newest_output_then_input() {
        let mut store = MessageStore::new();
        store.apply_message_updated(info("msg_1", Role::Assistant));
        store.apply_message_updated(info("msg_2", Role::Assistant));

        store.apply_part_updated(todo_tool(
            "prt_old",
            "msg_1",
            ToolState::Completed {
                title: None,
                input: None,
                output: json!([{ "content": "stale entry" }]),
                metadata: None,
            },
        ));
        store.apply_part_updated(todo_tool(
            "prt_new",
            "msg_2",
            ToolState::Running {
                title: None,
                input: Some(json!({ "todos": [{ "content": "fresh entry" }] })),
                metadata: None,
            },
        ));

        let todos = store.latest_todos().expect("todo list derived");
        assert_eq!(todos[0].content, "fresh entry");

        // Unparseable payloads fall through to older parts.
        store.apply_part_updated(todo_tool(
            "prt_bad",
            "msg_2",
            ToolState::Completed {
                title: None,
                input: None,
                output: json!("{broken"),
                metadata: None,
            },
        ));
        let todos = store.latest_todos().expect("falls back past bad payload");
        assert_eq!(todos[0].content, "fresh entry");
    }
}
