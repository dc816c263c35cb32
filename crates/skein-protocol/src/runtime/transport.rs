use bytes::Bytes;

use crate::types::{Link, LinkId};

/// Notifications the transport collaborator feeds into the runtime.
///
/// Delivery happens on one mpsc channel, which re-marshals arbitrary
/// transport threads onto the single runtime queue before any shared
/// state is touched.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// A link to a remote peer came up.
    Connected(Link),
    /// A link went down. Carries the same descriptor as `Connected`.
    Disconnected(Link),
    /// A frame arrived on a link.
    Frame { link: Link, frame: Bytes },
}

/// The outbound surface of the transport collaborator.
///
/// In production: whatever owns the physical links (radio, Wi-Fi,
/// loopback). In tests: a mock that records sends. Sends are
/// fire-and-forget — the core never observes delivery.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Hand a frame to a link for transmission.
    async fn send_frame(&self, link: LinkId, frame: &[u8]) -> Result<(), String>;
}
