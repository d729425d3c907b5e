//! Controller event stream.
//!
//! The chrome around the container (navigation, config panel, status bar)
//! observes the controller through a broadcast subscription rather than
//! return values: load and mount failures surface here, never as `Err` from
//! controller methods.

use lectern_widget::Config;
use tokio::sync::broadcast;

/// A state-change notification emitted by the application controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A load was requested and is now in flight.
    LoadingStarted { path: String },

    /// The widget for `path` resolved and mounted.
    Loaded { path: String },

    /// The load for `path` failed to resolve or mount.
    LoadFailed { path: String, reason: String },
}

impl AppEvent {
    /// The application path this event concerns.
    pub fn path(&self) -> &str {
        match self {
            AppEvent::LoadingStarted { path }
            | AppEvent::Loaded { path }
            | AppEvent::LoadFailed { path, .. } => path,
        }
    }
}

/// A config change delivered by the config-panel collaborator.
///
/// The runtime treats the carried config as opaque and forwards it to the
/// active mount strategy unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigChangeEvent {
    /// The new config for the active application.
    pub config: Config,
}

impl ConfigChangeEvent {
    /// Wrap a config value.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

/// Broadcast bus the controller publishes [`AppEvent`]s on.
///
/// Subscribers that fall behind lose the oldest events, which is acceptable
/// for chrome notifications; nothing replays from this bus.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Create a bus retaining up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Emitting with no subscribers is a no-op.
    pub fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }
}
