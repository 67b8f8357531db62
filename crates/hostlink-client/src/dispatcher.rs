//! Command dispatch: ordering, timeout, and transport fallback.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use hostlink_core::protocol::{CommandEnvelope, ResultEnvelope};
use hostlink_core::{Error, Result};

use crate::transport::CommandTransport;

/// Serializes commands and routes them across transports.
///
/// One command is in flight at a time; concurrent callers queue on the
/// dispatch lock in arrival order. The primary transport is tried first,
/// and transient failures fall back to the secondary. Non-transient
/// failures (protocol breaks, rejected credentials) surface immediately:
/// another transport would only repeat them.
pub struct Dispatcher {
    primary: Box<dyn CommandTransport>,
    fallback: Option<Box<dyn CommandTransport>>,
    in_flight: Mutex<()>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        primary: Box<dyn CommandTransport>,
        fallback: Option<Box<dyn CommandTransport>>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            in_flight: Mutex::new(()),
            timeout,
        }
    }

    /// Dispatch one command. The timeout covers both transport attempts.
    pub async fn dispatch(&self, envelope: &CommandEnvelope) -> Result<ResultEnvelope> {
        let _guard = self.in_flight.lock().await;
        tokio::time::timeout(self.timeout, self.try_transports(envelope))
            .await
            .map_err(|_| Error::Timeout)?
    }

    async fn try_transports(&self, envelope: &CommandEnvelope) -> Result<ResultEnvelope> {
        let primary_err = match self.primary.send(envelope).await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if !primary_err.is_transient() {
            return Err(primary_err);
        }

        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        debug!(
            command = envelope.command.as_str(),
            transport = self.primary.name(),
            error = %primary_err,
            "Primary transport failed, falling back"
        );

        match fallback.send(envelope).await {
            Ok(result) => Ok(result),
            Err(fallback_err) => {
                warn!(
                    command = envelope.command.as_str(),
                    primary = %primary_err,
                    fallback = %fallback_err,
                    "All transports failed"
                );
                Err(Error::transport(format!(
                    "all transports failed: {}: {}; {}: {}",
                    self.primary.name(),
                    primary_err,
                    fallback.name(),
                    fallback_err
                )))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
