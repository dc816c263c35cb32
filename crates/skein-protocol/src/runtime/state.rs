use crate::codec::Message;
use crate::registry::PeerRegistry;
use crate::router::{self, Inbound};
use crate::token::{TokenAction, TokenCoordinator};
use crate::types::{Link, PeerId};

use super::effect::RuntimeEffect;
use super::ProtocolEvent;

/// Complete protocol state — pure logic, zero async, zero network.
///
/// Every `handle_*` method returns `Vec<RuntimeEffect>`. Nothing here
/// touches the transport or the channels, which keeps registry and
/// token mutations atomic with respect to each other: handlers run to
/// completion on the single event loop before the next input.
pub struct RuntimeState {
    registry: PeerRegistry,
    token: TokenCoordinator,
}

impl RuntimeState {
    pub fn new(local_id: PeerId) -> Self {
        Self {
            registry: PeerRegistry::new(),
            token: TokenCoordinator::new(local_id),
        }
    }

    pub fn holds_token(&self) -> bool {
        self.token.holds_token()
    }

    pub fn peers(&self) -> Vec<PeerId> {
        self.registry.peers().collect()
    }

    // ── Transport inputs ─────────────────────────────────────────────

    /// A link came up. The first link to a peer is the join edge that
    /// drives the token tie-break.
    pub fn handle_link_connected(&mut self, link: Link) -> Vec<RuntimeEffect> {
        if !self.registry.on_link_connected(link) {
            return Vec::new();
        }
        tracing::info!(peer = %link.remote_peer, link = %link.id, "peer joined");
        let mut effects = vec![RuntimeEffect::Emit(ProtocolEvent::PeerJoined {
            peer: link.remote_peer,
        })];
        let actions = self.token.on_peer_joined(link.remote_peer);
        effects.extend(self.token_actions(actions));
        effects
    }

    /// A link went down. The peer's last link disappearing is the
    /// departed edge.
    pub fn handle_link_disconnected(&mut self, link: Link) -> Vec<RuntimeEffect> {
        if !self.registry.on_link_disconnected(link.remote_peer, link.id) {
            return Vec::new();
        }
        tracing::info!(peer = %link.remote_peer, "peer left");
        vec![RuntimeEffect::Emit(ProtocolEvent::PeerLeft {
            peer: link.remote_peer,
        })]
    }

    /// A frame arrived. Child events are applied locally and never
    /// re-forwarded; token control feeds the coordinator; corrupt
    /// frames were already dropped by the router.
    pub fn handle_frame(&mut self, link: Link, frame: &[u8]) -> Vec<RuntimeEffect> {
        match router::dispatch(&link, frame) {
            Some(Inbound::Child { x, y, r, g, b, a }) => {
                vec![RuntimeEffect::Emit(ProtocolEvent::ChildEvent {
                    x,
                    y,
                    r,
                    g,
                    b,
                    a,
                    remote: true,
                })]
            }
            Some(Inbound::Token { from, holds }) => {
                let actions = self.token.on_control(from, holds);
                self.token_actions(actions)
            }
            None => Vec::new(),
        }
    }

    // ── Application inputs ───────────────────────────────────────────

    /// Apply a locally originated child event and broadcast it to
    /// every peer's primary link.
    pub fn handle_submit_child_event(
        &mut self,
        x: f32,
        y: f32,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> Vec<RuntimeEffect> {
        let message = Message::ChildEvent { x, y, r, g, b, a };
        let mut effects = vec![RuntimeEffect::Emit(ProtocolEvent::ChildEvent {
            x,
            y,
            r,
            g,
            b,
            a,
            remote: false,
        })];
        effects.extend(
            router::broadcast(&message, &self.registry)
                .into_iter()
                .map(RuntimeEffect::SendFrame),
        );
        effects
    }

    pub fn handle_request_token(&mut self, from: PeerId) -> Vec<RuntimeEffect> {
        let actions = self.token.request_from(from);
        self.token_actions(actions)
    }

    pub fn handle_release_token(&mut self, to: PeerId) -> Vec<RuntimeEffect> {
        let actions = self.token.release_to(to);
        self.token_actions(actions)
    }

    // ── Token action lowering ────────────────────────────────────────

    /// Lower coordinator actions to effects. A send to a peer that has
    /// since vanished degrades to a no-op inside the router.
    fn token_actions(&self, actions: Vec<TokenAction>) -> Vec<RuntimeEffect> {
        let mut effects = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                TokenAction::Send { to, holds } => {
                    let message = Message::TokenControl { holds };
                    if let Some(out) = router::unicast(to, &message, &self.registry) {
                        effects.push(RuntimeEffect::SendFrame(out));
                    }
                }
                TokenAction::Changed(holds) => {
                    effects.push(RuntimeEffect::Emit(ProtocolEvent::EnabledChanged(holds)));
                }
            }
        }
        effects
    }
}
