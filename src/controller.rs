//! Cross-store orchestration: event routing, user intents, derived views.
//!
//! The controller is the only component allowed to read from more than one
//! store. It never mutates store internals directly; it composes their
//! public operations, and every user intent leaves through the injected
//! [`CommandSink`] as a fire-and-forget command.

use line_diff::{diff_lines, stats, window_context, DiffLine, DiffStats};
use opencode_api::{
    ClientCommand, FileAttachment, MessageWithParts, ModelRef, Part, PartBody, ProviderInfo, Role,
    ServerEvent, SessionInfo, ToolState,
};
use serde_json::Value;

use crate::store::{MessageStore, ModelStore, SessionStore};

/// Outbound command path, injected so the core is testable without a live
/// transport. Submission never blocks and never reports failure; resulting
/// state arrives back as events.
pub trait CommandSink {
    fn submit(&mut self, command: ClientCommand);
}

/// A revert target derived from the message list. A boundary exists between
/// consecutive messages `(A, B)` iff `A` is an assistant turn and `B` a user
/// turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub message_id: String,
}

/// One file touched by a tool call, with its windowed edit script and
/// per-file line counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub lines: Vec<DiffLine>,
    pub additions: usize,
    pub deletions: usize,
}

#[derive(Debug, Default)]
pub struct SessionController {
    sessions: SessionStore,
    messages: MessageStore,
    models: ModelStore,
}

impl SessionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    #[must_use]
    pub fn models(&self) -> &ModelStore {
        &self.models
    }

    /// Snapshot loads from the server, used on startup and reconnect.
    pub fn load_sessions(&mut self, sessions: Vec<SessionInfo>) {
        self.sessions.set_sessions(sessions);
    }

    pub fn load_messages(&mut self, messages: Vec<MessageWithParts>) {
        self.messages.set_messages(messages);
    }

    pub fn load_providers(&mut self, providers: Vec<ProviderInfo>) {
        self.models.set_providers(providers);
    }

    /// Takes the staged composer prefill, if any. One-shot.
    pub fn consume_prefill(&mut self) -> Option<String> {
        self.messages.consume_prefill()
    }

    fn is_active_session(&self, session_id: &str) -> bool {
        self.sessions
            .active()
            .is_some_and(|active| active.id == session_id)
    }

    fn active_session_id(&self) -> Option<String> {
        self.sessions.active().map(|active| active.id.clone())
    }

    /// Routes one inbound event to the owning store, strictly in arrival
    /// order. Message-level events for sessions other than the active one
    /// are filtered here; only the session store sees cross-session traffic.
    pub fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::MessageUpdated { info } => {
                if self.is_active_session(&info.session_id) {
                    self.messages.apply_message_updated(info);
                } else {
                    log::debug!("ignoring message.updated for inactive session {}", info.session_id);
                }
            }
            ServerEvent::MessagePartUpdated { part } => {
                let in_scope = part
                    .session_id
                    .as_deref()
                    .is_none_or(|id| self.is_active_session(id));
                if in_scope {
                    self.messages.apply_part_updated(part);
                }
            }
            ServerEvent::MessageRemoved {
                session_id,
                message_id,
            } => {
                let in_scope = session_id
                    .as_deref()
                    .is_none_or(|id| self.is_active_session(id));
                if in_scope {
                    self.messages.apply_message_removed(&message_id);
                }
            }
            ServerEvent::SessionStatus { status, .. } => {
                self.sessions.apply_status(&status);
            }
            ServerEvent::SessionUpdated { info } => {
                self.sessions.apply_session_updated(info);
            }
            ServerEvent::SessionCreated { info } => {
                self.sessions.apply_session_created(info);
            }
            ServerEvent::SessionDeleted { info } => {
                let was_active = self.is_active_session(&info.id);
                self.sessions.apply_session_deleted(&info.id);
                if was_active {
                    // Nulling the active session also clears the message
                    // state derived from it.
                    self.sessions.clear_active();
                    self.messages.set_messages(Vec::new());
                }
            }
        }
    }

    /// Sends a user message to the active session, carrying the current
    /// model selection. Returns `false` when no session is active.
    pub fn send(
        &mut self,
        sink: &mut dyn CommandSink,
        text: impl Into<String>,
        files: Vec<FileAttachment>,
    ) -> bool {
        let Some(session_id) = self.active_session_id() else {
            return false;
        };

        sink.submit(ClientCommand::Send {
            session_id,
            text: text.into(),
            model: self.models.selected().cloned(),
            files,
        });
        true
    }

    /// Activates a known session: optimistic local switch (the picker
    /// closes, the message list empties until history loads), plus a select
    /// command so the server scopes subsequent events.
    pub fn select_session(&mut self, sink: &mut dyn CommandSink, session_id: &str) -> bool {
        let Some(session) = self.sessions.find(session_id).cloned() else {
            return false;
        };

        self.sessions.set_active(Some(session));
        self.messages.set_messages(Vec::new());
        sink.submit(ClientCommand::SelectSession {
            session_id: session_id.to_string(),
        });
        true
    }

    pub fn create_session(
        &mut self,
        sink: &mut dyn CommandSink,
        parent_id: Option<String>,
        title: Option<String>,
    ) {
        sink.submit(ClientCommand::CreateSession { parent_id, title });
    }

    /// Local removal waits for the `session.deleted` event.
    pub fn delete_session(&mut self, sink: &mut dyn CommandSink, session_id: &str) {
        sink.submit(ClientCommand::DeleteSession {
            session_id: session_id.to_string(),
        });
    }

    /// Aborting relies entirely on the busy flag transitioning back to idle
    /// once the server confirms; no in-flight handle is tracked locally.
    pub fn abort(&mut self, sink: &mut dyn CommandSink) -> bool {
        let Some(session_id) = self.active_session_id() else {
            return false;
        };

        sink.submit(ClientCommand::Abort { session_id });
        true
    }

    /// Server-side compaction of the active session.
    pub fn compress(&mut self, sink: &mut dyn CommandSink) -> bool {
        let Some(session_id) = self.active_session_id() else {
            return false;
        };

        sink.submit(ClientCommand::Summarize {
            session_id,
            model: self.models.selected().cloned(),
        });
        true
    }

    /// Reverts the active session to `message_id` and stages the
    /// reverted-away user message's wording into the composer prefill, so
    /// nothing is re-sent until the user decides to submit.
    pub fn revert(&mut self, sink: &mut dyn CommandSink, message_id: &str) -> bool {
        let Some(session_id) = self.active_session_id() else {
            return false;
        };

        let prefill = self.reverted_user_text(message_id);
        sink.submit(ClientCommand::Revert {
            session_id,
            message_id: message_id.to_string(),
        });
        if let Some(text) = prefill {
            self.messages.set_prefill_text(text);
        }
        true
    }

    /// Reverts to the most recent checkpoint boundary.
    pub fn undo(&mut self, sink: &mut dyn CommandSink) -> bool {
        let Some(checkpoint) = self.checkpoints().pop() else {
            return false;
        };

        self.revert(sink, &checkpoint.message_id)
    }

    /// Redo is only offered while the session carries a pending revert
    /// pointer; otherwise the intent is rejected.
    pub fn redo(&mut self, sink: &mut dyn CommandSink) -> bool {
        if !self.can_redo() {
            return false;
        }
        let Some(session_id) = self.active_session_id() else {
            return false;
        };

        sink.submit(ClientCommand::Unrevert { session_id });
        true
    }

    /// Truncates history before the edited turn, then appends the
    /// replacement: revert to the preceding message (or to the message
    /// itself when it is first in the conversation), followed by a send.
    pub fn edit_and_resend(
        &mut self,
        sink: &mut dyn CommandSink,
        message_id: &str,
        text: impl Into<String>,
    ) -> bool {
        let Some(session_id) = self.active_session_id() else {
            return false;
        };
        let Some(index) = self
            .messages
            .messages()
            .iter()
            .position(|message| message.info.id == message_id)
        else {
            return false;
        };

        let revert_target = if index == 0 {
            message_id.to_string()
        } else {
            self.messages.messages()[index - 1].info.id.clone()
        };

        sink.submit(ClientCommand::Revert {
            session_id: session_id.clone(),
            message_id: revert_target,
        });
        sink.submit(ClientCommand::Send {
            session_id,
            text: text.into(),
            model: self.models.selected().cloned(),
            files: Vec::new(),
        });
        true
    }

    pub fn fork(&mut self, sink: &mut dyn CommandSink, message_id: Option<String>) -> bool {
        let Some(session_id) = self.active_session_id() else {
            return false;
        };

        sink.submit(ClientCommand::Fork {
            session_id,
            message_id,
        });
        true
    }

    /// Optimistic local selection plus a set-model command. A later inbound
    /// update may still overwrite the local copy idempotently.
    pub fn select_model(&mut self, sink: &mut dyn CommandSink, model: ModelRef) {
        self.models.set_selected(model.clone());
        sink.submit(ClientCommand::SetModel { model });
    }

    /// Checkpoint boundaries, re-derived from the message list on demand.
    #[must_use]
    pub fn checkpoints(&self) -> Vec<Checkpoint> {
        self.messages
            .messages()
            .windows(2)
            .filter_map(|pair| {
                (pair[0].info.role == Role::Assistant && pair[1].info.role == Role::User).then(
                    || Checkpoint {
                        message_id: pair[1].info.id.clone(),
                    },
                )
            })
            .collect()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.sessions
            .active()
            .is_some_and(|active| active.revert.is_some())
    }

    /// Context-usage ratio for the selected model. A missing or zero context
    /// limit yields `None`, the sentinel that hides the usage indicator.
    #[must_use]
    pub fn context_ratio(&self) -> Option<f64> {
        let limit = self.models.context_limit();
        if limit == 0 {
            return None;
        }

        Some(self.messages.input_tokens() as f64 / limit as f64)
    }

    /// Files touched by completed `edit`/`write` tool calls, each carrying a
    /// windowed edit script and per-file line counts. Later calls on the
    /// same path replace earlier entries so only the latest state of each
    /// file is tracked.
    #[must_use]
    pub fn file_changes(&self) -> Vec<FileChange> {
        let mut changes: Vec<FileChange> = Vec::new();

        for message in self.messages.messages() {
            for part in &message.parts {
                let PartBody::Tool { tool, state, .. } = &part.body else {
                    continue;
                };
                if tool != "edit" && tool != "write" {
                    continue;
                }
                if !matches!(state, ToolState::Completed { .. }) {
                    continue;
                }
                let Some(metadata) = state.metadata() else {
                    continue;
                };
                let Some(path) = metadata.get("path").and_then(Value::as_str) else {
                    continue;
                };

                let before = metadata.get("before").and_then(Value::as_str).unwrap_or("");
                let after = metadata.get("after").and_then(Value::as_str).unwrap_or("");
                let script = diff_lines(before, after);
                let totals = stats(&script);
                let change = FileChange {
                    path: path.to_string(),
                    lines: window_context(&script),
                    additions: totals.additions,
                    deletions: totals.deletions,
                };

                if let Some(existing) = changes.iter_mut().find(|entry| entry.path == change.path)
                {
                    *existing = change;
                } else {
                    changes.push(change);
                }
            }
        }

        changes
    }

    /// Added/removed line totals across all tracked file changes, for the
    /// header summary.
    #[must_use]
    pub fn change_totals(&self) -> DiffStats {
        let mut totals = DiffStats::default();
        for change in self.file_changes() {
            totals.merge(DiffStats {
                additions: change.additions,
                deletions: change.deletions,
            });
        }

        totals
    }

    /// Best-effort association of a subtask part with the child session it
    /// spawned: among children of the active session, matches by
    /// title-contains-description, then title-contains-prompt, then the
    /// server-provided `sessionID` metadata hint, in that precedence. Two
    /// siblings with similar descriptions can mismatch; this is a heuristic,
    /// not an identity mapping.
    #[must_use]
    pub fn find_child_session(&self, part: &Part) -> Option<&SessionInfo> {
        let PartBody::Subtask {
            description,
            prompt,
            metadata,
            ..
        } = &part.body
        else {
            return None;
        };
        let active_id = self.sessions.active().map(|active| active.id.as_str())?;

        let children: Vec<&SessionInfo> = self
            .sessions
            .sessions()
            .iter()
            .filter(|session| session.parent_id.as_deref() == Some(active_id))
            .collect();

        if !description.is_empty() {
            if let Some(found) = children
                .iter()
                .find(|session| {
                    session
                        .title
                        .as_deref()
                        .is_some_and(|title| title.contains(description.as_str()))
                })
                .copied()
            {
                return Some(found);
            }
        }

        if !prompt.is_empty() {
            if let Some(found) = children
                .iter()
                .find(|session| {
                    session
                        .title
                        .as_deref()
                        .is_some_and(|title| title.contains(prompt.as_str()))
                })
                .copied()
            {
                return Some(found);
            }
        }

        let hinted = metadata
            .as_ref()
            .and_then(|metadata| metadata.get("sessionID"))
            .and_then(Value::as_str)?;
        children.into_iter().find(|session| session.id == hinted)
    }

    /// Wording to restore into the composer when `message_id` is reverted
    /// away: the target itself when it is a user turn, otherwise the first
    /// user turn after it. Synthetic text parts are excluded.
    fn reverted_user_text(&self, message_id: &str) -> Option<String> {
        let messages = self.messages.messages();
        let index = messages
            .iter()
            .position(|message| message.info.id == message_id)?;
        let user_message = messages[index..]
            .iter()
            .find(|message| message.info.role == Role::User)?;

        let text = user_message
            .parts
            .iter()
            .filter_map(|part| match &part.body {
                PartBody::Text { text, synthetic } if !synthetic => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        (!text.is_empty()).then_some(text)
    }
}
