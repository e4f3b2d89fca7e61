#![allow(dead_code)]

use opencode_api::{
    ClientCommand, MessageInfo, MessageWithParts, Part, PartBody, Role, SessionInfo, TimeInfo,
    TokenUsage,
};
use session_mirror::CommandSink;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Command sink that records every submission for assertion.
#[derive(Default)]
pub struct RecordingSink {
    pub commands: Vec<ClientCommand>,
}

impl CommandSink for RecordingSink {
    fn submit(&mut self, command: ClientCommand) {
        self.commands.push(command);
    }
}

impl RecordingSink {
    pub fn kinds(&self) -> Vec<&'static str> {
        self.commands.iter().map(ClientCommand::kind).collect()
    }
}

pub fn session(id: &str) -> SessionInfo {
    SessionInfo {
        id: id.to_string(),
        title: None,
        parent_id: None,
        share: None,
        revert: None,
        summary: None,
        time: TimeInfo::default(),
    }
}

pub fn message_info(id: &str, session_id: &str, role: Role) -> MessageInfo {
    MessageInfo {
        id: id.to_string(),
        session_id: session_id.to_string(),
        role,
        summary: None,
        time: TimeInfo::default(),
    }
}

pub fn message(id: &str, session_id: &str, role: Role) -> MessageWithParts {
    MessageWithParts::new(message_info(id, session_id, role))
}

pub fn text_part(id: &str, message_id: &str, text: &str) -> Part {
    Part {
        id: id.to_string(),
        message_id: message_id.to_string(),
        session_id: None,
        body: PartBody::Text {
            text: text.to_string(),
            synthetic: false,
        },
    }
}

pub fn step_finish_part(id: &str, message_id: &str, input: u64) -> Part {
    Part {
        id: id.to_string(),
        message_id: message_id.to_string(),
        session_id: None,
        body: PartBody::StepFinish {
            tokens: TokenUsage { input, output: 0 },
        },
    }
}
