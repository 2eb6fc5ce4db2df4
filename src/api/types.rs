//! API request and response types

use crate::db::MenuNode;
use crate::runtime::SessionSnapshot;
use serde::{Deserialize, Serialize};

/// Query string for an operator send
#[derive(Debug, Deserialize)]
pub struct SendMessageQuery {
    pub to: String,
    pub message: String,
}

/// Request to bind inbound events to a tenant
#[derive(Debug, Deserialize)]
pub struct SetTenantRequest {
    pub tenant_id: String,
}

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub tenant_id: String,
}

#[derive(Debug, Serialize)]
pub struct NodeListResponse {
    pub nodes: Vec<MenuNode>,
}

/// A node together with the number of choices it offers
#[derive(Debug, Serialize)]
pub struct NodeResponse {
    pub node: MenuNode,
    pub child_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionSnapshot,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
