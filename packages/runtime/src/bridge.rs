//! Message bridge between the parent page and an embedded child page.
//!
//! Frame-kind widgets host their interactive content in a sandboxed child
//! document. The parent pushes configuration over the bridge and the child
//! reports state back. Delivery runs over a single ordered channel with no
//! acknowledgments: ordering is guaranteed by the channel, nothing is
//! redelivered.
//!
//! The bridge is a three-state machine:
//!
//! ```text
//! unhandshaked ──child ready──► ready ──close──► closed
//! ```
//!
//! Before the child signals readiness every outbound envelope is queued; on
//! readiness the bridge sends `init`, flushes the queue (coalescing full
//! snapshots to the latest one) and goes `ready`. After `close` all sends
//! are silently dropped and inbound messages are ignored - the listener is
//! detached before the embedded document is destroyed, so no handler can
//! fire against a torn-down container.
//!
//! A child that never signals readiness is a legitimate transient state
//! (its own assets may still be fetching); the bridge queues forever and
//! never times out. A superseding load is the only cancellation.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use lectern_widget::{Config, State};

use crate::error::{Result, RuntimeError};

/// Envelope the parent sends to the embedded child page.
///
/// Serialized as internally tagged JSON across the embedding boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ParentToChild {
    /// Sent exactly once, immediately after the child signals readiness.
    Init,

    /// Full snapshot of config and state.
    PushRender { config: Config, state: State },

    /// Config-only delta.
    Config { config: Config },

    /// State-only delta. The payload travels under the `config` wire key:
    /// child pages in the wild already parse that key, so the asymmetry is
    /// kept rather than silently fixed. A deliberate wire-format break
    /// would be needed to rename it.
    State {
        #[serde(rename = "config")]
        state: State,
    },
}

/// Message the child page sends to the parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChildToParent {
    /// The child page has loaded and is ready to receive envelopes.
    Ready,

    /// The child reports its current widget state.
    State { state: State },
}

/// Outbound half of the embedding boundary.
///
/// Injectable so tests can observe the wire without a real embedded
/// document. Sends are synchronous; the channel is expected to buffer.
pub trait BridgeTransport: Send {
    /// Transmit one envelope to the child.
    fn send(&mut self, envelope: &ParentToChild) -> Result<()>;
}

/// Transport over an in-process channel carrying JSON-encoded envelopes.
///
/// The receiving half plays the child page: tests and demos read raw wire
/// strings from it in delivery order.
#[derive(Debug)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    /// Create a transport and the child-side receiver it delivers to.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl BridgeTransport for ChannelTransport {
    fn send(&mut self, envelope: &ParentToChild) -> Result<()> {
        let wire = serde_json::to_string(envelope)
            .map_err(|e| RuntimeError::Transport(e.to_string()))?;
        self.tx.send(wire).map_err(|_| RuntimeError::ChannelClosed)
    }
}

enum BridgePhase {
    Unhandshaked { queue: Vec<ParentToChild> },
    Ready,
    Closed,
}

/// Parent-side endpoint of the bridge for one mounted frame widget.
pub struct FrameBridge {
    transport: Box<dyn BridgeTransport>,
    phase: BridgePhase,
}

impl FrameBridge {
    /// Create a bridge in the `unhandshaked` phase over the given
    /// transport.
    pub fn new(transport: Box<dyn BridgeTransport>) -> Self {
        Self {
            transport,
            phase: BridgePhase::Unhandshaked { queue: Vec::new() },
        }
    }

    /// Whether the handshake has completed.
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, BridgePhase::Ready)
    }

    /// Whether the bridge has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(self.phase, BridgePhase::Closed)
    }

    /// Number of envelopes waiting for the handshake.
    pub fn queued(&self) -> usize {
        match &self.phase {
            BridgePhase::Unhandshaked { queue } => queue.len(),
            _ => 0,
        }
    }

    /// Send an envelope to the child.
    ///
    /// Queued while `unhandshaked`, transmitted while `ready`, silently
    /// dropped after `close` - a late send against a torn-down frame is
    /// expected, not an error.
    pub fn send(&mut self, envelope: ParentToChild) -> Result<()> {
        match &mut self.phase {
            BridgePhase::Unhandshaked { queue } => {
                queue.push(envelope);
                Ok(())
            }
            BridgePhase::Ready => self.transport.send(&envelope),
            BridgePhase::Closed => {
                trace!(?envelope, "bridge closed, dropping send");
                Ok(())
            }
        }
    }

    /// Process one inbound message from the child.
    ///
    /// Returns the reported state when the message was a state report. A
    /// readiness signal completes the handshake; a duplicate readiness
    /// signal is ignored. After `close` every inbound message is ignored.
    pub fn handle_child(&mut self, message: ChildToParent) -> Result<Option<State>> {
        match message {
            ChildToParent::Ready => {
                self.on_ready()?;
                Ok(None)
            }
            ChildToParent::State { state } => match self.phase {
                BridgePhase::Closed => {
                    trace!("bridge closed, ignoring child state report");
                    Ok(None)
                }
                _ => Ok(Some(state)),
            },
        }
    }

    /// Detach from the child. Must be called before the embedded document
    /// is destroyed. Idempotent; queued envelopes are discarded.
    pub fn close(&mut self) {
        if let BridgePhase::Unhandshaked { queue } = &self.phase {
            if !queue.is_empty() {
                debug!(
                    queued = queue.len(),
                    "closing unhandshaked bridge, discarding queued envelopes"
                );
            }
        }
        self.phase = BridgePhase::Closed;
    }

    fn on_ready(&mut self) -> Result<()> {
        let queue = match std::mem::replace(&mut self.phase, BridgePhase::Ready) {
            BridgePhase::Unhandshaked { queue } => queue,
            BridgePhase::Ready => {
                debug!("duplicate child readiness signal ignored");
                return Ok(());
            }
            BridgePhase::Closed => {
                // Listener already detached; stay closed.
                self.phase = BridgePhase::Closed;
                return Ok(());
            }
        };

        self.transport.send(&ParentToChild::Init)?;
        for envelope in coalesce(queue) {
            self.transport.send(&envelope)?;
        }
        Ok(())
    }
}

/// Collapse queued snapshots so only the latest `push-render` is delivered.
///
/// Deltas keep their relative order; the surviving snapshot keeps its
/// position, so a delta queued after the last snapshot is still applied on
/// top of it.
fn coalesce(queue: Vec<ParentToChild>) -> Vec<ParentToChild> {
    let last_snapshot = queue
        .iter()
        .rposition(|e| matches!(e, ParentToChild::PushRender { .. }));
    queue
        .into_iter()
        .enumerate()
        .filter(|(i, e)| !matches!(e, ParentToChild::PushRender { .. }) || Some(*i) == last_snapshot)
        .map(|(_, e)| e)
        .collect()
}
