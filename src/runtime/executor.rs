//! Bot runtime
//!
//! Drives one handling cycle per inbound message: guard, load, transition,
//! paced send, commit. Also hosts the operator commands that act on the
//! transport.

use super::cleanup::remove_cache_dir;
use super::gateway::PacedGateway;
use super::guard::DispatchGuard;
use super::sessions::SessionTable;
use super::traits::{NodeStore, Transport};
use crate::state_machine::{transition, SessionKey, SessionState};
use crate::transport::{TransportError, TransportEvent};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Tunables for a runtime instance
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Wait before every outbound reply
    pub reply_delay: Duration,
    /// Prefixed to operator-supplied numbers
    pub country_code: String,
    /// Local state the transport keeps between sessions
    pub cache_dir: PathBuf,
    pub cleanup_retries: u32,
    pub cleanup_delay: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_secs(2),
            country_code: "54".to_string(),
            cache_dir: PathBuf::from(".bot_cache"),
            cleanup_retries: 5,
            cleanup_delay: Duration::from_secs(1),
        }
    }
}

/// How a handling cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Replies sent and the new session committed
    Completed { replies: usize },
    /// Another message from the same sender was in flight
    Dropped,
    /// Nodes could not be read or a reply could not be sent; session untouched
    Failed,
}

#[derive(Debug, Error)]
pub enum DisconnectError {
    #[error("Failed to remove transport cache: {0}")]
    Cleanup(#[from] io::Error),
    #[error("Logout failed: {0}")]
    Logout(#[source] TransportError),
    #[error("Re-initialization failed: {0}")]
    Reinitialize(#[source] TransportError),
}

/// Session as reported to operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: SessionState,
    /// A message for this sender is being handled right now
    pub locked: bool,
}

pub struct BotRuntime<S, T> {
    store: S,
    gateway: PacedGateway<T>,
    sessions: SessionTable,
    guard: DispatchGuard,
    /// Tenant that inbound transport events resolve against
    tenant_id: RwLock<String>,
    pairing_code: RwLock<Option<String>>,
    settings: RuntimeSettings,
}

impl<S, T> BotRuntime<S, T>
where
    S: NodeStore + 'static,
    T: Transport + 'static,
{
    pub fn new(store: S, transport: T, tenant_id: impl Into<String>, settings: RuntimeSettings) -> Self {
        Self {
            store,
            gateway: PacedGateway::new(transport, settings.reply_delay),
            sessions: SessionTable::new(),
            guard: DispatchGuard::new(),
            tenant_id: RwLock::new(tenant_id.into()),
            pairing_code: RwLock::new(None),
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transport(&self) -> &T {
        self.gateway.transport()
    }

    pub async fn tenant_id(&self) -> String {
        self.tenant_id.read().await.clone()
    }

    /// Bind inbound transport events to another tenant's menu
    pub async fn set_tenant(&self, tenant_id: impl Into<String>) {
        let tenant_id = tenant_id.into();
        tracing::info!(tenant = %tenant_id, "Inbound messages now resolve against tenant");
        *self.tenant_id.write().await = tenant_id;
    }

    /// Latest pairing code reported by the transport, if any
    pub async fn pairing_code(&self) -> Option<String> {
        self.pairing_code.read().await.clone()
    }

    /// React to a transport event.
    ///
    /// Messages are handled on their own task so senders proceed
    /// concurrently; the handle is returned for callers that want to wait.
    pub async fn handle_event(self: &Arc<Self>, event: TransportEvent) -> Option<JoinHandle<InboundOutcome>> {
        match event {
            TransportEvent::Qr { code } => {
                tracing::info!("New pairing code available at /api/bot/qrcode");
                *self.pairing_code.write().await = Some(code);
                None
            }
            TransportEvent::Ready => {
                tracing::info!("Transport connected");
                None
            }
            TransportEvent::Message {
                from,
                body,
                tenant_id,
            } => {
                let tenant_id = match tenant_id {
                    Some(tenant_id) => tenant_id,
                    None => self.tenant_id().await,
                };
                let runtime = Arc::clone(self);
                Some(tokio::spawn(async move {
                    runtime.on_inbound_message(&tenant_id, &from, &body).await
                }))
            }
        }
    }

    /// One full handling cycle for an inbound message
    pub async fn on_inbound_message(&self, tenant_id: &str, sender_id: &str, body: &str) -> InboundOutcome {
        tracing::debug!(tenant = %tenant_id, sender = %sender_id, body = %body, "Inbound message");

        let Some(permit) = self.guard.try_acquire(sender_id) else {
            tracing::info!(sender = %sender_id, "Sender already being handled, dropping message");
            return InboundOutcome::Dropped;
        };

        let key = SessionKey::new(tenant_id, sender_id);
        let state = self.sessions.load(&key);

        let nodes = match self.store.list_nodes(tenant_id).await {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::error!(session = %key, error = %e, "Failed to load menu nodes");
                return InboundOutcome::Failed;
            }
        };

        let result = transition(&nodes, &state, body);
        for anomaly in &result.anomalies {
            tracing::warn!(session = %key, %anomaly, "Recovered from menu data inconsistency");
        }

        for reply in &result.replies {
            if let Err(e) = self.gateway.reply(sender_id, reply).await {
                tracing::error!(
                    session = %key,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Failed to send reply, keeping previous session"
                );
                return InboundOutcome::Failed;
            }
        }

        let replies = result.replies.len();
        tracing::debug!(
            tenant = %tenant_id,
            sender = %permit.sender_id(),
            state = ?result.new_state,
            "Committing session"
        );
        self.sessions.commit(&key, result.new_state);
        InboundOutcome::Completed { replies }
    }

    /// Operator send to a local phone number
    pub async fn send_message(&self, to: &str, message: &str) -> Result<(), TransportError> {
        let to = to.trim();
        if to.is_empty() || !to.chars().all(|c| c.is_ascii_digit()) {
            return Err(TransportError::invalid_destination(format!(
                "Destination must be a phone number, got {to:?}"
            )));
        }

        let number = format!("{}{to}", self.settings.country_code);
        let Some(chat_id) = self.transport().resolve_number(&number).await? else {
            return Err(TransportError::not_registered(format!(
                "The phone number {to} is not registered on the network"
            )));
        };

        self.transport().send_text(&chat_id, message).await?;
        tracing::info!(to = %to, "Operator message sent");
        Ok(())
    }

    /// Drop the network session and its local cache, then start a new one
    pub async fn disconnect(&self) -> Result<(), DisconnectError> {
        remove_cache_dir(
            &self.settings.cache_dir,
            self.settings.cleanup_retries,
            self.settings.cleanup_delay,
        )
        .await?;

        self.transport()
            .logout()
            .await
            .map_err(DisconnectError::Logout)?;
        *self.pairing_code.write().await = None;
        tracing::info!(cache = %self.settings.cache_dir.display(), "Transport disconnected and cache removed");

        self.transport()
            .initialize()
            .await
            .map_err(DisconnectError::Reinitialize)?;
        tracing::info!("Transport initialized again");
        Ok(())
    }

    /// Stored session plus lock status, without creating a session
    pub fn session_snapshot(&self, tenant_id: &str, sender_id: &str) -> Option<SessionSnapshot> {
        self.sessions
            .get(&SessionKey::new(tenant_id, sender_id))
            .map(|state| SessionSnapshot {
                state,
                locked: self.guard.is_held(sender_id),
            })
    }
}
