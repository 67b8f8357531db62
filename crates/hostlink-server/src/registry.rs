//! Command registry: maps command names to handlers.
//!
//! `dispatch` is total: every envelope gets a [`ResultEnvelope`] back.
//! Handler errors become `success: false` results, names outside the
//! protocol table get a distinct "unknown command" failure, and names whose
//! capability the platform did not provide get a "not supported" failure.
//! The dispatcher itself never fails and never closes the connection.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use hostlink_core::protocol::{capability_of, Capability, CommandEnvelope, ResultEnvelope};
use hostlink_core::Result;

use crate::capability::Platform;
use crate::commands;

/// Boxed async handler for one command.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<ResultEnvelope>> + Send>>;
type Handler = Box<dyn Fn(Map<String, Value>) -> HandlerFuture + Send + Sync>;

/// Server-side command-name-to-handler map.
pub struct CommandRegistry {
    handlers: HashMap<String, Handler>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Create a registry with only the built-in `version` command.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };
        registry.register("version", |_params| async {
            Ok(ResultEnvelope::with(payload(json!({
                "version": env!("CARGO_PKG_VERSION"),
            }))))
        });
        registry
    }

    /// Build a registry wiring every capability the platform provides.
    ///
    /// Absent capabilities are flagged once at startup; their commands
    /// answer "not supported on this platform" at dispatch time.
    pub fn for_platform(platform: &Platform) -> Self {
        let mut registry = Self::new();
        let caps = platform.capabilities();

        if let Some(ops) = &platform.mouse {
            commands::mouse::register(&mut registry, Arc::clone(ops));
        }
        if let Some(ops) = &platform.keyboard {
            commands::keyboard::register(&mut registry, Arc::clone(ops));
        }
        if let Some(ops) = &platform.scroll {
            commands::scroll::register(&mut registry, Arc::clone(ops));
        }
        if let Some(ops) = &platform.screen {
            commands::screen::register(&mut registry, Arc::clone(ops));
        }
        if let Some(ops) = &platform.clipboard {
            commands::clipboard::register(&mut registry, Arc::clone(ops));
        }
        if let Some(ops) = &platform.filesystem {
            commands::fs::register(&mut registry, Arc::clone(ops));
        }
        if let Some(ops) = &platform.accessibility {
            commands::access::register(&mut registry, Arc::clone(ops));
        }
        if let Some(ops) = &platform.process {
            commands::shell::register(&mut registry, Arc::clone(ops));
        }

        for cap in [
            Capability::Mouse,
            Capability::Keyboard,
            Capability::Scroll,
            Capability::Screen,
            Capability::Clipboard,
            Capability::Filesystem,
            Capability::Accessibility,
            Capability::Process,
        ] {
            if !caps.contains(&cap) {
                warn!(capability = %cap, "Capability not provided by platform");
            }
        }
        info!(
            commands = registry.handlers.len(),
            "Command registry initialized"
        );

        registry
    }

    /// Register a handler for a command name.
    ///
    /// Re-registering a name replaces the previous handler.
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResultEnvelope>> + Send + 'static,
    {
        self.handlers
            .insert(name.into(), Box::new(move |params| Box::pin(handler(params))));
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether only built-ins are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute one envelope. Always returns a result envelope.
    pub async fn dispatch(&self, envelope: CommandEnvelope) -> ResultEnvelope {
        debug!(command = %envelope.command, "Dispatching command");

        match self.handlers.get(envelope.command.as_str()) {
            Some(handler) => match handler(envelope.params).await {
                Ok(result) => result,
                Err(e) => {
                    debug!(command = %envelope.command, error = %e, "Handler failed");
                    ResultEnvelope::err(e.to_string())
                }
            },
            None => match capability_of(&envelope.command) {
                Some(cap) => ResultEnvelope::err(format!(
                    "command `{}` not supported on this platform (requires {} capability)",
                    envelope.command, cap
                )),
                None => ResultEnvelope::err(format!("unknown command: {}", envelope.command)),
            },
        }
    }
}

/// Build a payload map from a `json!({...})` object literal.
pub(crate) fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use hostlink_core::Error;

    #[tokio::test]
    async fn version_is_always_registered() {
        let registry = CommandRegistry::new();
        let result = registry.dispatch(CommandEnvelope::new("version")).await;
        assert!(result.success);
        assert_eq!(result.get_str("version"), Some(env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn unknown_command_is_distinct() {
        let registry = CommandRegistry::new();
        let result = registry
            .dispatch(CommandEnvelope::new("not_a_real_command"))
            .await;
        assert!(!result.success);
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .starts_with("unknown command"));
    }

    #[tokio::test]
    async fn known_but_unregistered_reports_capability() {
        // Empty platform: `left_click` is in the protocol table but the
        // mouse capability is absent.
        let registry = CommandRegistry::for_platform(&Platform::new());
        let result = registry.dispatch(CommandEnvelope::new("left_click")).await;
        assert!(!result.success);
        let msg = result.error.unwrap();
        assert!(msg.contains("not supported on this platform"), "{msg}");
        assert!(msg.contains("mouse"), "{msg}");
    }

    #[tokio::test]
    async fn handler_error_becomes_failure_envelope() {
        let mut registry = CommandRegistry::new();
        registry.register("explode", |_params| async {
            Err(Error::protocol("boom"))
        });

        let result = registry.dispatch(CommandEnvelope::new("explode")).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("boom"));
        assert!(result.payload.is_empty());
    }

    #[tokio::test]
    async fn reregistering_replaces_handler() {
        let mut registry = CommandRegistry::new();
        registry.register("probe", |_p| async { Ok(ResultEnvelope::ok()) });
        registry.register("probe", |_p| async { Ok(ResultEnvelope::err("second")) });

        let result = registry.dispatch(CommandEnvelope::new("probe")).await;
        assert_eq!(result.error.as_deref(), Some("second"));
    }
}
