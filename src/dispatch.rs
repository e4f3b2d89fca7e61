//! Single-consumer event queue between the transport and the controller.
//!
//! The transport pushes decoded events here; a single dispatch loop drains
//! them into the controller in strict arrival order. No reordering buffer
//! exists anywhere on this path.

use std::collections::VecDeque;

use opencode_api::ServerEvent;

use crate::config::EnvConfig;
use crate::controller::SessionController;

#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<ServerEvent>,
    debug_events: bool,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue honoring the `SESSION_MIRROR_DEBUG_EVENTS` override, which
    /// raises per-event logging from trace to debug.
    #[must_use]
    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            pending: VecDeque::new(),
            debug_events: config.debug_events,
        }
    }

    pub fn enqueue(&mut self, event: ServerEvent) {
        self.pending.push_back(event);
    }

    /// Applies every pending event to the controller, front to back, and
    /// returns how many were dispatched.
    pub fn drain_into(&mut self, controller: &mut SessionController) -> usize {
        let mut dispatched = 0;
        while let Some(event) = self.pending.pop_front() {
            if self.debug_events {
                log::debug!("dispatching {}", event.kind());
            } else {
                log::trace!("dispatching {}", event.kind());
            }
            controller.handle_event(event);
            dispatched += 1;
        }

        dispatched
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;
    use opencode_api::{SessionInfo, TimeInfo};

    fn created(id: &str) -> ServerEvent {
        ServerEvent::SessionCreated {
            info: SessionInfo {
                id: id.to_string(),
                title: None,
                parent_id: None,
                share: None,
                revert: None,
                summary: None,
                time: TimeInfo::default(),
            },
        }
    }

    #[test]
    fn drains_in_arrival_order() {
        let mut queue = EventQueue::new();
        let mut controller = SessionController::new();

        queue.enqueue(created("ses_1"));
        queue.enqueue(created("ses_2"));
        queue.enqueue(created("ses_3"));
        assert_eq!(queue.len(), 3);

        let dispatched = queue.drain_into(&mut controller);
        assert_eq!(dispatched, 3);
        assert!(queue.is_empty());

        // Creation prepends, so arrival order shows up reversed in the list.
        let ids: Vec<_> = controller
            .sessions()
            .sessions()
            .iter()
            .map(|session| session.id.as_str())
            .collect();
        assert_eq!(ids, vec!["ses_3", "ses_2", "ses_1"]);
    }

    #[test]
    fn config_built_queue_dispatches_identically() {
        let config = EnvConfig {
            debug_events: true,
            ..EnvConfig::default()
        };
        let mut queue = EventQueue::from_config(&config);
        let mut controller = SessionController::new();

        queue.enqueue(created("ses_1"));
        assert_eq!(queue.drain_into(&mut controller), 1);
        assert_eq!(controller.sessions().sessions().len(), 1);
    }
}
