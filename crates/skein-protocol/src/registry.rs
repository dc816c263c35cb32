/// Peer/link bookkeeping for skein.
///
/// Maps each known peer to its redundant links, ranked by priority.
/// The head of each list is the "primary" link used for all sends to
/// that peer; the rest are failover candidates only. Entries are
/// created on the first link and removed the instant their last link
/// disconnects.
use std::collections::HashMap;

use crate::types::{Link, LinkId, PeerId};

/// Known peers and their priority-ranked links.
///
/// Pure bookkeeping — no I/O, no link mutation. All calls must come
/// from the single runtime event loop, which makes the peer-joined /
/// peer-departed edges race-free.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<PeerId, Vec<Link>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connected link.
    ///
    /// Inserts into the peer's entry (creating it if absent) and
    /// re-sorts ascending by priority. The sort is stable, so links of
    /// equal priority keep arrival order. A link id already present
    /// for that peer is ignored.
    ///
    /// Returns `true` if this is the first link seen for the peer —
    /// the "peer joined" edge that feeds the token coordinator.
    pub fn on_link_connected(&mut self, link: Link) -> bool {
        let links = self.peers.entry(link.remote_peer).or_default();
        let joined = links.is_empty();
        if links.iter().any(|l| l.id == link.id) {
            tracing::debug!(link = %link.id, peer = %link.remote_peer, "duplicate link connect ignored");
            return false;
        }
        links.push(link);
        links.sort_by_key(|l| l.priority);
        joined
    }

    /// Remove a disconnected link by identity.
    ///
    /// Deletes the peer's entry when its list empties. Returns `true`
    /// if the peer has now fully disappeared.
    pub fn on_link_disconnected(&mut self, peer: PeerId, link_id: LinkId) -> bool {
        let Some(links) = self.peers.get_mut(&peer) else {
            return false;
        };
        links.retain(|l| l.id != link_id);
        if links.is_empty() {
            self.peers.remove(&peer);
            true
        } else {
            false
        }
    }

    /// The primary (lowest-priority-value) link for a peer, if known.
    pub fn primary_link(&self, peer: PeerId) -> Option<&Link> {
        self.peers.get(&peer).and_then(|links| links.first())
    }

    /// One primary link per currently-known peer, for broadcast fan-out.
    ///
    /// Order is unspecified — broadcast delivery order across peers is
    /// not guaranteed by this system.
    pub fn primary_links(&self) -> impl Iterator<Item = &Link> {
        self.peers.values().filter_map(|links| links.first())
    }

    /// Identities of all currently-known peers.
    pub fn peers(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.peers.keys().copied()
    }

    /// Number of currently-known peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
