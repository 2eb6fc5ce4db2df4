//! Runtime for handling conversations
//!
//! Owns everything with side effects around the pure state machine: the
//! session table, the per-sender dispatch guard, reply pacing and the
//! operator commands on the transport.

mod cleanup;
mod executor;
mod gateway;
mod guard;
mod sessions;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{BotRuntime, DisconnectError, RuntimeSettings, SessionSnapshot};
pub use traits::*;

use std::sync::Arc;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = BotRuntime<DatabaseNodeStore, Arc<dyn Transport>>;
