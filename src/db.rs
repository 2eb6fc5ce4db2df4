//! Database module for the menu bot
//!
//! Persists the tenant-scoped menu node forest. Sessions live in memory
//! (see `runtime::sessions`), so this is the only durable state.

mod schema;

pub use schema::*;

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Node already exists: {0}")]
    NodeExists(String),
    #[error("Parent node not found in tenant: {0}")]
    ParentNotFound(String),
    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

const NODE_COLUMNS: &str =
    "id, tenant_id, parent_id, body, kind, trigger_text, num_order, finish_lane";

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Node Operations ====================

    /// Insert a node into a tenant's forest.
    ///
    /// A missing `id` gets a fresh UUID. A parent, when given, must already
    /// exist in the same tenant.
    pub fn insert_node(&self, tenant_id: &str, new: NewMenuNode) -> DbResult<MenuNode> {
        let conn = self.lock()?;
        let id = new
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM menu_nodes WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if exists {
            return Err(DbError::NodeExists(id));
        }

        if let Some(parent) = &new.parent_id {
            let parent_in_tenant: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM menu_nodes WHERE id = ?1 AND tenant_id = ?2)",
                params![parent, tenant_id],
                |row| row.get(0),
            )?;
            if !parent_in_tenant {
                return Err(DbError::ParentNotFound(parent.clone()));
            }
        }

        conn.execute(
            "INSERT INTO menu_nodes (id, tenant_id, parent_id, body, kind, trigger_text, num_order, finish_lane, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                tenant_id,
                new.parent_id,
                new.body,
                new.kind.to_string(),
                new.trigger,
                new.order,
                new.finish_lane,
                Utc::now().to_rfc3339()
            ],
        )?;

        Ok(MenuNode {
            id,
            tenant_id: tenant_id.to_string(),
            parent_id: new.parent_id,
            body: new.body,
            kind: new.kind,
            trigger: new.trigger,
            order: new.order,
            finish_lane: new.finish_lane,
        })
    }

    /// All nodes of a tenant in scan order.
    ///
    /// Equal `order` values fall back to insertion order (rowid), so the
    /// sequence is stable across calls.
    pub fn list_nodes(&self, tenant_id: &str) -> DbResult<Vec<MenuNode>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {NODE_COLUMNS} FROM menu_nodes
             WHERE tenant_id = ?1
             ORDER BY num_order ASC, rowid ASC"
        ))?;

        let rows = stmt.query_map(params![tenant_id], row_to_node)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Number of nodes whose parent is `parent_id`
    pub fn count_children(&self, parent_id: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM menu_nodes WHERE parent_id = ?1",
            params![parent_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Look a node up by id
    pub fn get_node(&self, id: &str) -> DbResult<Option<MenuNode>> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {NODE_COLUMNS} FROM menu_nodes WHERE id = ?1"),
            params![id],
            row_to_node,
        )
        .optional()
        .map_err(DbError::from)
    }
}

fn row_to_node(row: &Row<'_>) -> rusqlite::Result<MenuNode> {
    let kind = row
        .get::<_, String>(4)?
        .parse::<NodeKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into()))?;

    Ok(MenuNode {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        parent_id: row.get(2)?,
        body: row.get(3)?,
        kind,
        trigger: row.get(5)?,
        order: row.get(6)?,
        finish_lane: row.get(7)?,
    })
}
