//! Mock implementations for testing
//!
//! These mocks enable runtime tests without a database or a bridge.

use super::traits::*;
use crate::db::MenuNode;
use crate::transport::TransportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport that records everything it is asked to send
#[allow(dead_code)]
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<(String, String)>>,
    registered: Mutex<HashMap<String, String>>,
    fail_sends: AtomicBool,
    fail_logout: AtomicBool,
    logouts: AtomicUsize,
    initializations: AtomicUsize,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `number` resolvable to `chat_id`
    pub fn with_registered(self, number: &str, chat_id: &str) -> Self {
        self.registered
            .lock()
            .unwrap()
            .insert(number.to_string(), chat_id.to_string());
        self
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_logout(&self, fail: bool) {
        self.fail_logout.store(fail, Ordering::SeqCst);
    }

    /// Recorded `(chat_id, text)` pairs
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to one chat, in order
    pub fn sent_to(&self, chat_id: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::network("mock send failure"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn resolve_number(&self, number: &str) -> Result<Option<String>, TransportError> {
        Ok(self.registered.lock().unwrap().get(number).cloned())
    }

    async fn initialize(&self) -> Result<(), TransportError> {
        self.initializations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn logout(&self) -> Result<(), TransportError> {
        if self.fail_logout.load(Ordering::SeqCst) {
            return Err(TransportError::server_error("mock logout failure"));
        }
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Mock Node Store
// ============================================================================

/// Node store over a fixed list, optionally failing every read
#[allow(dead_code)]
#[derive(Default)]
pub struct MockNodeStore {
    nodes: Mutex<Vec<MenuNode>>,
    fail: AtomicBool,
}

#[allow(dead_code)]
impl MockNodeStore {
    pub fn new(nodes: Vec<MenuNode>) -> Self {
        Self {
            nodes: Mutex::new(nodes),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), String> {
        if self.fail.load(Ordering::SeqCst) {
            Err("mock store failure".to_string())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NodeStore for MockNodeStore {
    async fn list_nodes(&self, tenant_id: &str) -> Result<Vec<MenuNode>, String> {
        self.check()?;
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn count_children(&self, parent_id: &str) -> Result<usize, String> {
        self.check()?;
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(parent_id))
            .count())
    }

    async fn get_node(&self, id: &str) -> Result<Option<MenuNode>, String> {
        self.check()?;
        Ok(self.nodes.lock().unwrap().iter().find(|n| n.id == id).cloned())
    }
}
