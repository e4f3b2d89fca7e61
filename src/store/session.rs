use opencode_api::{SessionInfo, StatusInfo};

/// Session list (most-recent-first), active-session pointer, and the busy
/// flag.
///
/// The busy flag has no local watchdog: the server is the sole driver, and
/// it stays set until a `session.status` event carries anything other than
/// `busy`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionStore {
    sessions: Vec<SessionInfo>,
    active: Option<SessionInfo>,
    busy: bool,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sessions(&self) -> &[SessionInfo] {
        &self.sessions
    }

    #[must_use]
    pub fn active(&self) -> Option<&SessionInfo> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub fn find(&self, session_id: &str) -> Option<&SessionInfo> {
        self.sessions
            .iter()
            .find(|session| session.id == session_id)
    }

    /// Snapshot load from the server.
    pub fn set_sessions(&mut self, sessions: Vec<SessionInfo>) {
        self.sessions = sessions;
    }

    pub fn set_active(&mut self, session: Option<SessionInfo>) {
        self.active = session;
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Replaces the matching list entry, and the active copy when it is the
    /// same session. The two views are independent copies kept consistent by
    /// updating both here.
    pub fn apply_session_updated(&mut self, info: SessionInfo) {
        if self
            .active
            .as_ref()
            .is_some_and(|active| active.id == info.id)
        {
            self.active = Some(info.clone());
        }

        if let Some(existing) = self
            .sessions
            .iter_mut()
            .find(|session| session.id == info.id)
        {
            *existing = info;
        } else {
            // An update for a session we never saw created still lands in
            // the list; the server is authoritative.
            self.sessions.insert(0, info);
        }
    }

    /// Most-recent-first ordering is a product decision, not incidental.
    pub fn apply_session_created(&mut self, info: SessionInfo) {
        self.sessions.retain(|session| session.id != info.id);
        self.sessions.insert(0, info);
    }

    /// Removes from the list only. Clearing the active pointer (and the
    /// message state derived from it) is the controller's responsibility.
    pub fn apply_session_deleted(&mut self, session_id: &str) {
        self.sessions.retain(|session| session.id != session_id);
    }

    /// `idle → busy` when the status is `busy`; back to idle on any other
    /// value.
    pub fn apply_status(&mut self, status: &StatusInfo) {
        self.busy = status.is_busy();
    }
}
