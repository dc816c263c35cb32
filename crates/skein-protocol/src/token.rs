//! The exclusive-token coordinator.
//!
//! Every peer starts optimistically believing it holds the token (it
//! knows of no peers yet). On first contact between two peers, the one
//! with the numerically greater id keeps it; the other steps down by
//! running the same comparison locally. Handoff is fire-and-forget —
//! a dropped grant leaves the mesh with zero holders until manual
//! recovery, matching the system's best-effort delivery model.
//!
//! Pure logic: every input returns a list of [`TokenAction`]s for the
//! runtime to execute. No I/O, no async.

use crate::types::PeerId;

/// Output of the coordinator — wire sends and local state flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Unicast `TokenControl { holds }` to a peer.
    Send { to: PeerId, holds: bool },
    /// Local `holds_token` flipped; surface to the application.
    Changed(bool),
}

/// State machine over the single process-wide `holds_token` boolean.
#[derive(Debug)]
pub struct TokenCoordinator {
    local_id: PeerId,
    holds_token: bool,
}

impl TokenCoordinator {
    /// A fresh peer starts as the sole, unconfirmed holder.
    pub fn new(local_id: PeerId) -> Self {
        Self {
            local_id,
            holds_token: true,
        }
    }

    /// Whether this peer currently holds the token.
    pub fn holds_token(&self) -> bool {
        self.holds_token
    }

    /// A previously-unknown peer connected (first link seen).
    ///
    /// Tie-break while holding: the greater PeerId keeps the token.
    /// The keeper sends `TokenControl{false}` so the newcomer's
    /// startup default is explicitly stepped down even if its own
    /// comparison was missed; the loser steps down locally and sends
    /// the same confirmation, which the keeper ignores on receipt.
    pub fn on_peer_joined(&mut self, remote: PeerId) -> Vec<TokenAction> {
        if !self.holds_token {
            return Vec::new();
        }
        if remote > self.local_id {
            tracing::debug!(%remote, local = %self.local_id, "deferring token to higher peer id");
            self.holds_token = false;
            vec![
                TokenAction::Send {
                    to: remote,
                    holds: false,
                },
                TokenAction::Changed(false),
            ]
        } else {
            tracing::debug!(%remote, local = %self.local_id, "keeping token over lower peer id");
            vec![TokenAction::Send {
                to: remote,
                holds: false,
            }]
        }
    }

    /// Inbound `TokenControl` from a peer.
    ///
    /// `{false}` is informational — the sender confirms it does not
    /// hold — and changes nothing. `{true}` grants the token to a
    /// non-holder; a holder receiving it defers to the sender, which
    /// resolves a dual-holder conflict in the sender's favor.
    pub fn on_control(&mut self, from: PeerId, holds: bool) -> Vec<TokenAction> {
        match (self.holds_token, holds) {
            (_, false) => Vec::new(),
            (true, true) => {
                tracing::debug!(%from, "token conflict, deferring to sender");
                self.holds_token = false;
                vec![TokenAction::Changed(false)]
            }
            (false, true) => {
                tracing::debug!(%from, "token received");
                self.holds_token = true;
                vec![TokenAction::Changed(true)]
            }
        }
    }

    /// Hand the token to a chosen peer.
    ///
    /// Fire-and-forget: the local peer steps down immediately, waiting
    /// for no acknowledgment. A release while not holding is invalid
    /// and a no-op.
    pub fn release_to(&mut self, peer: PeerId) -> Vec<TokenAction> {
        if !self.holds_token {
            return Vec::new();
        }
        self.holds_token = false;
        vec![
            TokenAction::Send {
                to: peer,
                holds: true,
            },
            TokenAction::Changed(false),
        ]
    }

    /// Claim the token from its presumed holder.
    ///
    /// Expressed with the two-message wire vocabulary: claim locally
    /// and assert `TokenControl{true}` at the peer, which defers on
    /// receipt. A request while already holding is a no-op.
    pub fn request_from(&mut self, peer: PeerId) -> Vec<TokenAction> {
        if self.holds_token {
            return Vec::new();
        }
        self.holds_token = true;
        vec![
            TokenAction::Send {
                to: peer,
                holds: true,
            },
            TokenAction::Changed(true),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(raw: i64) -> PeerId {
        PeerId::from_raw(raw)
    }

    /// Drive one coordinator's Send actions into the other.
    fn deliver(from: PeerId, actions: &[TokenAction], other: &mut TokenCoordinator) {
        for action in actions {
            if let TokenAction::Send { holds, .. } = action {
                other.on_control(from, *holds);
            }
        }
    }

    #[test]
    fn fresh_peer_holds_by_default() {
        assert!(TokenCoordinator::new(peer(1)).holds_token());
    }

    #[test]
    fn pairwise_join_converges_on_higher_id() {
        let mut a = TokenCoordinator::new(peer(10));
        let mut b = TokenCoordinator::new(peer(20));

        // Both sides see the join and exchange one round of control
        // messages, in both delivery orders.
        let from_a = a.on_peer_joined(peer(20));
        let from_b = b.on_peer_joined(peer(10));
        deliver(peer(10), &from_a, &mut b);
        deliver(peer(20), &from_b, &mut a);

        assert!(!a.holds_token());
        assert!(b.holds_token());
    }

    #[test]
    fn join_while_holding_lower_peer_keeps_and_notifies() {
        let mut c = TokenCoordinator::new(peer(20));
        let actions = c.on_peer_joined(peer(10));
        assert!(c.holds_token());
        assert_eq!(
            actions,
            vec![TokenAction::Send {
                to: peer(10),
                holds: false
            }]
        );
    }

    #[test]
    fn join_while_holding_higher_peer_steps_down() {
        let mut c = TokenCoordinator::new(peer(10));
        let actions = c.on_peer_joined(peer(20));
        assert!(!c.holds_token());
        assert_eq!(
            actions,
            vec![
                TokenAction::Send {
                    to: peer(20),
                    holds: false
                },
                TokenAction::Changed(false),
            ]
        );
    }

    #[test]
    fn join_while_not_holding_does_nothing() {
        let mut c = TokenCoordinator::new(peer(10));
        c.on_peer_joined(peer(20));
        assert!(c.on_peer_joined(peer(5)).is_empty());
        assert!(!c.holds_token());
    }

    #[test]
    fn control_false_is_informational() {
        let mut holder = TokenCoordinator::new(peer(20));
        assert!(holder.on_control(peer(10), false).is_empty());
        assert!(holder.holds_token());

        let mut non_holder = TokenCoordinator::new(peer(10));
        non_holder.on_peer_joined(peer(20));
        assert!(non_holder.on_control(peer(20), false).is_empty());
        assert!(!non_holder.holds_token());
    }

    #[test]
    fn holder_defers_on_control_true() {
        let mut c = TokenCoordinator::new(peer(20));
        let actions = c.on_control(peer(10), true);
        assert!(!c.holds_token());
        assert_eq!(actions, vec![TokenAction::Changed(false)]);
    }

    #[test]
    fn handoff_moves_the_token() {
        let mut h = TokenCoordinator::new(peer(20));
        let mut p = TokenCoordinator::new(peer(10));
        p.on_peer_joined(peer(20)); // p stepped down at join

        let actions = h.release_to(peer(10));
        assert!(!h.holds_token());
        deliver(peer(20), &actions, &mut p);
        assert!(p.holds_token());
    }

    #[test]
    fn release_while_not_holding_is_a_no_op() {
        let mut c = TokenCoordinator::new(peer(10));
        c.on_peer_joined(peer(20));
        assert!(c.release_to(peer(20)).is_empty());
        assert!(!c.holds_token());
    }

    #[test]
    fn request_claims_and_makes_holder_defer() {
        let mut holder = TokenCoordinator::new(peer(20));
        let mut requester = TokenCoordinator::new(peer(10));
        requester.on_peer_joined(peer(20));

        let actions = requester.request_from(peer(20));
        assert!(requester.holds_token());
        deliver(peer(10), &actions, &mut holder);
        assert!(!holder.holds_token());
    }

    #[test]
    fn request_while_holding_is_a_no_op() {
        let mut c = TokenCoordinator::new(peer(20));
        assert!(c.request_from(peer(10)).is_empty());
        assert!(c.holds_token());
    }
}
