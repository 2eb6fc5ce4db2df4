//! In-memory session table
//!
//! Sole owner of conversation state. A handling cycle loads a copy, hands it
//! to the state machine, and commits the replacement in one step.

use crate::state_machine::{SessionKey, SessionState};
use dashmap::DashMap;

#[derive(Default)]
pub struct SessionTable {
    sessions: DashMap<SessionKey, SessionState>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for the key, creating a fresh session on first contact
    pub fn load(&self, key: &SessionKey) -> SessionState {
        self.sessions
            .entry(key.clone())
            .or_insert_with(|| SessionState::new(key.sender_id.clone()))
            .value()
            .clone()
    }

    /// Replace the stored state wholesale
    pub fn commit(&self, key: &SessionKey, state: SessionState) {
        self.sessions.insert(key.clone(), state);
    }

    /// Stored state without creating one
    pub fn get(&self, key: &SessionKey) -> Option<SessionState> {
        self.sessions.get(key).map(|entry| entry.value().clone())
    }

    #[allow(dead_code)] // Used in tests
    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default_session() {
        let table = SessionTable::new();
        let key = SessionKey::new("acme", "5491100000000");

        assert!(table.get(&key).is_none());
        let state = table.load(&key);
        assert_eq!(state, SessionState::new("5491100000000"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_commit_then_load_round_trips() {
        let table = SessionTable::new();
        let key = SessionKey::new("acme", "alice");

        let state = SessionState {
            cursor_node_id: Some("main".to_string()),
            traversal_index: 4,
            pending_advance: 3,
            awaiting_selection: true,
            ..SessionState::new("alice")
        };
        table.commit(&key, state.clone());

        assert_eq!(table.load(&key), state);
        assert_eq!(table.get(&key), Some(state));
    }

    #[test]
    fn test_sessions_are_tenant_scoped() {
        let table = SessionTable::new();
        let acme = SessionKey::new("acme", "alice");
        let globex = SessionKey::new("globex", "alice");

        let mut moved = table.load(&acme);
        moved.traversal_index = 2;
        table.commit(&acme, moved);

        assert_eq!(table.load(&globex).traversal_index, 0);
        assert_eq!(table.load(&acme).traversal_index, 2);
    }

    #[test]
    fn test_loaded_copy_does_not_alias_stored_state() {
        let table = SessionTable::new();
        let key = SessionKey::new("acme", "alice");

        let mut copy = table.load(&key);
        copy.awaiting_selection = true;

        assert!(!table.load(&key).awaiting_selection);
    }
}
