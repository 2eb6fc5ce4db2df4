//! Conversation session types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sender's position in the menu tree between messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub sender_id: String,
    /// Last node presented as the current menu context
    pub cursor_node_id: Option<String>,
    /// Where the next linear scan over the tenant's nodes resumes
    pub traversal_index: usize,
    /// Last numeric selection applied to `traversal_index`
    pub pending_advance: usize,
    /// Next inbound body is read as a numeric choice among the cursor's children
    pub awaiting_selection: bool,
}

impl SessionState {
    /// Fresh session for a sender that has never written before
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            cursor_node_id: None,
            traversal_index: 0,
            pending_advance: 0,
            awaiting_selection: false,
        }
    }
}

/// Identity of a session: one sender within one tenant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub tenant_id: String,
    pub sender_id: String,
}

impl SessionKey {
    pub fn new(tenant_id: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            sender_id: sender_id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.sender_id)
    }
}
