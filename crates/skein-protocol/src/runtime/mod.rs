/// Skein runtime — integrates codec, registry, router, and token
/// coordinator into one live event loop.
///
/// The runtime owns all protocol state and exposes a channel-based API,
/// so the application (UI, bot, demo harness) never touches raw bytes
/// or protocol internals. All entry points — link events from the
/// transport and commands from the application — are serialized onto
/// the single loop, which is the concurrency model the core relies on.
mod effect;
mod executor;
mod r#loop;
mod state;
mod transport;

use tokio::sync::{mpsc, oneshot};

use crate::error::SkeinError;
use crate::types::PeerId;

pub use transport::{LinkEvent, Transport};

// ── Configuration ─────────────────────────────────────────────────────

/// Configuration for the skein runtime.
pub struct RuntimeConfig {
    /// Local peer identity. `None` mints a fresh random id, the normal
    /// case — identities live exactly as long as the process.
    pub local_id: Option<PeerId>,
    /// Capacity of the command and event channels.
    pub channel_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            local_id: None,
            channel_capacity: 64,
        }
    }
}

// ── Commands (app → runtime) ──────────────────────────────────────────

/// Commands the application sends to the runtime event loop.
pub enum RuntimeCommand {
    /// Apply a child event locally and broadcast it to all peers.
    SubmitChildEvent {
        x: f32,
        y: f32,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    },
    /// Claim the token from its presumed holder.
    RequestTokenFrom { peer: PeerId },
    /// Hand the token to a chosen peer.
    ReleaseTokenTo { peer: PeerId },
    /// Query: currently-known peers.
    Peers { reply: oneshot::Sender<Vec<PeerId>> },
    /// Query: does this peer currently hold the token.
    HoldsToken { reply: oneshot::Sender<bool> },
    /// Graceful shutdown.
    Shutdown,
}

// ── Events (runtime → app) ───────────────────────────────────────────

/// Events the application observer receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProtocolEvent {
    /// A child event to apply — locally originated (`remote == false`)
    /// or relayed from a peer (`remote == true`). Relayed events are
    /// applied but never re-forwarded.
    ChildEvent {
        x: f32,
        y: f32,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        remote: bool,
    },
    /// Local token possession changed.
    EnabledChanged(bool),
    /// First link to a previously-unknown peer came up.
    PeerJoined { peer: PeerId },
    /// A peer's last link went down.
    PeerLeft { peer: PeerId },
}

// ── RuntimeHandle (app-facing API) ───────────────────────────────────

/// Handle to communicate with a running skein runtime.
///
/// Cheap to clone. All methods are non-blocking channel sends.
#[derive(Clone)]
pub struct RuntimeHandle {
    cmd_tx: mpsc::Sender<RuntimeCommand>,
    local_id: PeerId,
}

impl RuntimeHandle {
    /// This peer's identity.
    pub fn local_id(&self) -> PeerId {
        self.local_id
    }

    /// Apply a child event locally and broadcast it to all peers.
    pub async fn submit_child_event(
        &self,
        x: f32,
        y: f32,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> Result<(), SkeinError> {
        self.cmd_tx
            .send(RuntimeCommand::SubmitChildEvent { x, y, r, g, b, a })
            .await
            .map_err(|_| SkeinError::RuntimeShutDown)
    }

    /// Claim the token from its presumed holder.
    pub async fn request_token_from(&self, peer: PeerId) -> Result<(), SkeinError> {
        self.cmd_tx
            .send(RuntimeCommand::RequestTokenFrom { peer })
            .await
            .map_err(|_| SkeinError::RuntimeShutDown)
    }

    /// Hand the token to a chosen peer. Fire-and-forget.
    pub async fn release_token_to(&self, peer: PeerId) -> Result<(), SkeinError> {
        self.cmd_tx
            .send(RuntimeCommand::ReleaseTokenTo { peer })
            .await
            .map_err(|_| SkeinError::RuntimeShutDown)
    }

    /// Currently-known peers.
    pub async fn peers(&self) -> Vec<PeerId> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(RuntimeCommand::Peers { reply: tx }).await;
        rx.await.unwrap_or_default()
    }

    /// Whether this peer currently holds the token.
    pub async fn holds_token(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        let _ = self
            .cmd_tx
            .send(RuntimeCommand::HoldsToken { reply: tx })
            .await;
        rx.await.unwrap_or(false)
    }

    /// Graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown).await;
    }
}

// ── RuntimeChannels ──────────────────────────────────────────────────

/// Channels returned to the application when the runtime starts.
pub struct RuntimeChannels {
    /// Handle to send commands to the runtime.
    pub handle: RuntimeHandle,
    /// Receive observer events (child events, enabled changes, peer
    /// join/leave).
    pub events: mpsc::Receiver<ProtocolEvent>,
}

// ── SkeinRuntime ─────────────────────────────────────────────────────

/// The skein runtime — spawn it and communicate via channels.
pub struct SkeinRuntime;

impl SkeinRuntime {
    /// Create and start the runtime.
    ///
    /// `link_events` is the transport's notification stream; `transport`
    /// is its outbound surface. Returns channels for the application.
    /// Spawns the event loop as a tokio task.
    pub fn spawn<T: Transport + 'static>(
        transport: T,
        link_events: mpsc::Receiver<LinkEvent>,
        config: RuntimeConfig,
    ) -> RuntimeChannels {
        let local_id = config.local_id.unwrap_or_else(PeerId::generate);

        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>(config.channel_capacity);
        let (event_tx, event_rx) = mpsc::channel::<ProtocolEvent>(config.channel_capacity);

        tokio::spawn(r#loop::runtime_loop(
            transport,
            local_id,
            cmd_rx,
            event_tx,
            link_events,
        ));

        RuntimeChannels {
            handle: RuntimeHandle { cmd_tx, local_id },
            events: event_rx,
        }
    }
}
