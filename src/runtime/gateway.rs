//! Outbound gateway with reply pacing
//!
//! The network throttles accounts that answer too fast, so every reply waits
//! a fixed delay first. The wait is an async sleep on the sender's own task
//! and never holds up other senders.

use super::traits::Transport;
use crate::transport::TransportError;
use std::time::Duration;

pub struct PacedGateway<T> {
    transport: T,
    delay: Duration,
}

impl<T: Transport> PacedGateway<T> {
    pub fn new(transport: T, delay: Duration) -> Self {
        Self { transport, delay }
    }

    /// Wait out the pacing delay, then deliver
    pub async fn reply(&self, to: &str, text: &str) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;
        self.transport.send_text(to, text).await
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
