//! Database schema and types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS menu_nodes (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    parent_id TEXT,
    body TEXT NOT NULL,
    kind TEXT NOT NULL,
    trigger_text TEXT,
    num_order INTEGER NOT NULL,
    finish_lane BOOLEAN NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_menu_nodes_tenant_order ON menu_nodes(tenant_id, num_order);
CREATE INDEX IF NOT EXISTS idx_menu_nodes_parent ON menu_nodes(parent_id);
";

/// Whether a node branches into further choices or ends a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Menu,
    Leaf,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Menu => write!(f, "MENU"),
            NodeKind::Leaf => write!(f, "LEAF"),
        }
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MENU" => Ok(NodeKind::Menu),
            "LEAF" => Ok(NodeKind::Leaf),
            other => Err(format!("unknown node kind: {other}")),
        }
    }
}

/// One unit of scripted reply content in a tenant's menu forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: String,
    pub tenant_id: String,
    pub parent_id: Option<String>,
    pub body: String,
    pub kind: NodeKind,
    pub trigger: Option<String>,
    pub order: i64,
    pub finish_lane: bool,
}

impl MenuNode {
    /// A `MENU` node with no parent
    pub fn is_root_menu(&self) -> bool {
        self.parent_id.is_none() && self.kind == NodeKind::Menu
    }

    /// True when this node hangs directly under `cursor`.
    ///
    /// An absent cursor has no children, so roots never match here.
    pub fn is_child_of(&self, cursor: Option<&str>) -> bool {
        match (self.parent_id.as_deref(), cursor) {
            (Some(parent), Some(cursor)) => parent == cursor,
            _ => false,
        }
    }

    /// Case-insensitive comparison of the trigger against an inbound body
    pub fn matches_trigger(&self, body: &str) -> bool {
        self.trigger
            .as_deref()
            .is_some_and(|trigger| trigger.to_lowercase() == body.to_lowercase())
    }
}

/// Fields accepted when creating a node
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub body: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub trigger: Option<String>,
    pub order: i64,
    #[serde(default)]
    pub finish_lane: bool,
}
