//! HTTP API for the menu bot
//!
//! Operator endpoints for the transport, the webhook the transport bridge
//! reports events to, and menu node administration.

mod handlers;
mod pairing;
mod types;

pub use handlers::create_router;

use crate::db::Database;
use crate::runtime::ProductionRuntime;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ProductionRuntime>,
}

impl AppState {
    pub fn new(runtime: Arc<ProductionRuntime>) -> Self {
        Self { runtime }
    }

    pub fn db(&self) -> &Database {
        self.runtime.store().inner()
    }
}
