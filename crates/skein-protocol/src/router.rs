//! Broadcast routing for skein.
//!
//! Pure planning — encodes a message once and decides which links the
//! frame goes to, using the registry's primary-link selection. The
//! runtime executor performs the actual sends; a failure on one link
//! never blocks or fails delivery to the rest (best effort, no
//! atomicity across peers).

use bytes::Bytes;

use crate::codec::Message;
use crate::registry::PeerRegistry;
use crate::types::{Link, LinkId, PeerId};

/// One encoded frame bound for one link.
///
/// `frame` is a cheaply-cloned handle: a broadcast shares a single
/// encoded buffer across all targets.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundFrame {
    pub link: LinkId,
    pub frame: Bytes,
}

/// An inbound frame after decode, classified for dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Inbound {
    /// Application payload — applied locally, never re-forwarded.
    Child {
        x: f32,
        y: f32,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    },
    /// Token-control message for the coordinator.
    Token { from: PeerId, holds: bool },
}

/// Plan a broadcast: the frame goes to every known peer's primary link.
pub fn broadcast(message: &Message, registry: &PeerRegistry) -> Vec<OutboundFrame> {
    let frame = message.encode();
    registry
        .primary_links()
        .map(|link| OutboundFrame {
            link: link.id,
            frame: frame.clone(),
        })
        .collect()
}

/// Plan a unicast to one peer's primary link.
///
/// An unknown peer yields `None` — expected under link churn, not an
/// error to surface.
pub fn unicast(peer: PeerId, message: &Message, registry: &PeerRegistry) -> Option<OutboundFrame> {
    match registry.primary_link(peer) {
        Some(link) => Some(OutboundFrame {
            link: link.id,
            frame: message.encode(),
        }),
        None => {
            tracing::debug!(%peer, "unicast to unknown peer dropped");
            None
        }
    }
}

/// Decode and classify an inbound frame.
///
/// A corrupt frame is logged and dropped; the connection continues.
pub fn dispatch(link: &Link, frame: &[u8]) -> Option<Inbound> {
    match Message::decode(frame) {
        Ok(Message::ChildEvent { x, y, r, g, b, a }) => {
            Some(Inbound::Child { x, y, r, g, b, a })
        }
        Ok(Message::TokenControl { holds }) => Some(Inbound::Token {
            from: link.remote_peer,
            holds,
        }),
        Err(err) => {
            tracing::debug!(link = %link.id, peer = %link.remote_peer, %err, "bad frame dropped");
            None
        }
    }
}
