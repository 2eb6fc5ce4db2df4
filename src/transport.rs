//! Connection to the messaging network
//!
//! The network session itself (pairing, wire protocol) runs in a bridge
//! process. This module talks to that bridge and defines the events it
//! reports back.

mod bridge;
mod error;

pub use bridge::HttpBridgeTransport;
pub use error::{TransportError, TransportErrorKind};

use serde::Deserialize;

/// Events the bridge reports about the network session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    /// A new pairing code is available for scanning
    Qr { code: String },
    /// The session is paired and connected
    Ready,
    /// A chat message arrived
    Message {
        from: String,
        body: String,
        /// Overrides the tenant this bot instance is bound to
        #[serde(default)]
        tenant_id: Option<String>,
    },
}
