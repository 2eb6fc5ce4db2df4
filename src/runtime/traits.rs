//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::db::{Database, MenuNode};
use crate::transport::TransportError;
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to a tenant's menu nodes
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// All nodes of the tenant, in a stable scan order
    async fn list_nodes(&self, tenant_id: &str) -> Result<Vec<MenuNode>, String>;

    /// Number of nodes directly under `parent_id`
    async fn count_children(&self, parent_id: &str) -> Result<usize, String>;

    /// Look up a single node
    async fn get_node(&self, id: &str) -> Result<Option<MenuNode>, String>;
}

/// Messaging network connection
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver text to a chat address
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError>;

    /// Map a phone number to its chat address, `None` when not on the network
    async fn resolve_number(&self, number: &str) -> Result<Option<String>, TransportError>;

    /// Start (or restart) the network session
    async fn initialize(&self) -> Result<(), TransportError>;

    /// End the network session
    async fn logout(&self) -> Result<(), TransportError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: NodeStore + ?Sized> NodeStore for Arc<T> {
    async fn list_nodes(&self, tenant_id: &str) -> Result<Vec<MenuNode>, String> {
        (**self).list_nodes(tenant_id).await
    }

    async fn count_children(&self, parent_id: &str) -> Result<usize, String> {
        (**self).count_children(parent_id).await
    }

    async fn get_node(&self, id: &str) -> Result<Option<MenuNode>, String> {
        (**self).get_node(id).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), TransportError> {
        (**self).send_text(chat_id, text).await
    }

    async fn resolve_number(&self, number: &str) -> Result<Option<String>, TransportError> {
        (**self).resolve_number(number).await
    }

    async fn initialize(&self) -> Result<(), TransportError> {
        (**self).initialize().await
    }

    async fn logout(&self) -> Result<(), TransportError> {
        (**self).logout().await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as a NodeStore
#[derive(Clone)]
pub struct DatabaseNodeStore {
    db: Database,
}

impl DatabaseNodeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn inner(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl NodeStore for DatabaseNodeStore {
    async fn list_nodes(&self, tenant_id: &str) -> Result<Vec<MenuNode>, String> {
        self.db.list_nodes(tenant_id).map_err(|e| e.to_string())
    }

    async fn count_children(&self, parent_id: &str) -> Result<usize, String> {
        self.db.count_children(parent_id).map_err(|e| e.to_string())
    }

    async fn get_node(&self, id: &str) -> Result<Option<MenuNode>, String> {
        self.db.get_node(id).map_err(|e| e.to_string())
    }
}
