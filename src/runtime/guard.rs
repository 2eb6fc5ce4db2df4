//! Per-sender single-flight gate
//!
//! At most one inbound message per sender is handled at a time. Senders are
//! independent keys in a concurrent set, so unrelated senders never wait on
//! each other.

use dashmap::DashSet;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct DispatchGuard {
    held: Arc<DashSet<String>>,
}

impl DispatchGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim the sender. `None` means another message for the
    /// same sender is in flight and this one must be dropped.
    pub fn try_acquire(&self, sender_id: &str) -> Option<DispatchPermit> {
        if self.held.insert(sender_id.to_string()) {
            Some(DispatchPermit {
                guard: self.clone(),
                sender_id: sender_id.to_string(),
            })
        } else {
            None
        }
    }

    /// Give the sender back. Idempotent.
    pub fn release(&self, sender_id: &str) {
        self.held.remove(sender_id);
    }

    pub fn is_held(&self, sender_id: &str) -> bool {
        self.held.contains(sender_id)
    }
}

/// Claim on one sender, released when dropped
#[must_use = "dropping the permit releases the sender immediately"]
pub struct DispatchPermit {
    guard: DispatchGuard,
    sender_id: String,
}

impl DispatchPermit {
    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }
}

impl Drop for DispatchPermit {
    fn drop(&mut self) {
        self.guard.release(&self.sender_id);
    }
}
