/// The skein runtime event loop.
///
/// A single async task that owns all mutable protocol state and
/// multiplexes over transport notifications and application commands.
/// Every handler runs to completion before the next input — the
/// serialization the registry and coordinator invariants rely on.
use tokio::sync::mpsc;

use crate::types::PeerId;

use super::executor::execute_effects;
use super::state::RuntimeState;
use super::transport::{LinkEvent, Transport};
use super::{ProtocolEvent, RuntimeCommand};

pub(super) async fn runtime_loop<T: Transport>(
    transport: T,
    local_id: PeerId,
    mut cmd_rx: mpsc::Receiver<RuntimeCommand>,
    event_tx: mpsc::Sender<ProtocolEvent>,
    mut link_rx: mpsc::Receiver<LinkEvent>,
) {
    let mut state = RuntimeState::new(local_id);
    tracing::info!(%local_id, "skein runtime started");

    loop {
        tokio::select! {
            // ── Transport notifications ─────────────────────────
            event = link_rx.recv() => {
                let Some(event) = event else {
                    tracing::info!("transport channel closed, stopping runtime");
                    break;
                };
                let effects = match event {
                    LinkEvent::Connected(link) => state.handle_link_connected(link),
                    LinkEvent::Disconnected(link) => state.handle_link_disconnected(link),
                    LinkEvent::Frame { link, frame } => state.handle_frame(link, &frame),
                };
                execute_effects(effects, &transport, &event_tx).await;
            }

            // ── Application commands ────────────────────────────
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    tracing::info!("all handles dropped, stopping runtime");
                    break;
                };
                match cmd {
                    RuntimeCommand::SubmitChildEvent { x, y, r, g, b, a } => {
                        let effects = state.handle_submit_child_event(x, y, r, g, b, a);
                        execute_effects(effects, &transport, &event_tx).await;
                    }
                    RuntimeCommand::RequestTokenFrom { peer } => {
                        let effects = state.handle_request_token(peer);
                        execute_effects(effects, &transport, &event_tx).await;
                    }
                    RuntimeCommand::ReleaseTokenTo { peer } => {
                        let effects = state.handle_release_token(peer);
                        execute_effects(effects, &transport, &event_tx).await;
                    }
                    RuntimeCommand::Peers { reply } => {
                        let _ = reply.send(state.peers());
                    }
                    RuntimeCommand::HoldsToken { reply } => {
                        let _ = reply.send(state.holds_token());
                    }
                    RuntimeCommand::Shutdown => {
                        tracing::info!(%local_id, "runtime shutdown requested");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::Message;
    use crate::runtime::transport::mock::MockTransport;
    use crate::runtime::{LinkEvent, ProtocolEvent, RuntimeConfig, SkeinRuntime};
    use crate::types::{Link, LinkId, PeerId};

    use tokio::sync::mpsc;

    fn spawn_runtime(
        local_id: i64,
    ) -> (
        MockTransport,
        mpsc::Sender<LinkEvent>,
        crate::runtime::RuntimeChannels,
    ) {
        let transport = MockTransport::new();
        let (link_tx, link_rx) = mpsc::channel(16);
        let channels = SkeinRuntime::spawn(
            transport.clone(),
            link_rx,
            RuntimeConfig {
                local_id: Some(PeerId::from_raw(local_id)),
                ..Default::default()
            },
        );
        (transport, link_tx, channels)
    }

    fn link(id: u64, peer: i64, priority: i32) -> Link {
        Link::new(LinkId(id), PeerId::from_raw(peer), priority)
    }

    #[tokio::test]
    async fn queries_reflect_live_state() {
        let (_transport, link_tx, channels) = spawn_runtime(20);
        assert!(channels.handle.holds_token().await);
        assert!(channels.handle.peers().await.is_empty());

        link_tx
            .send(LinkEvent::Connected(link(1, 10, 1)))
            .await
            .unwrap();

        // Queries are serialized behind the connect on the same loop.
        assert_eq!(channels.handle.peers().await, vec![PeerId::from_raw(10)]);
        assert!(channels.handle.holds_token().await);
    }

    #[tokio::test]
    async fn lower_peer_join_triggers_step_down_frame() {
        let (transport, link_tx, channels) = spawn_runtime(20);
        link_tx
            .send(LinkEvent::Connected(link(1, 10, 1)))
            .await
            .unwrap();
        // Drain through a query to be sure the event was processed.
        channels.handle.peers().await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, LinkId(1));
        assert_eq!(
            Message::decode(&sent[0].1).unwrap(),
            Message::TokenControl { holds: false }
        );
    }

    #[tokio::test]
    async fn inbound_grant_surfaces_enabled_change() {
        let (_transport, link_tx, mut channels) = spawn_runtime(10);
        link_tx
            .send(LinkEvent::Connected(link(1, 20, 1)))
            .await
            .unwrap();

        // Join against the higher peer: we step down.
        assert!(matches!(
            channels.events.recv().await,
            Some(ProtocolEvent::PeerJoined { .. })
        ));
        assert_eq!(
            channels.events.recv().await,
            Some(ProtocolEvent::EnabledChanged(false))
        );

        // The peer later hands the token back.
        link_tx
            .send(LinkEvent::Frame {
                link: link(1, 20, 1),
                frame: Message::TokenControl { holds: true }.encode(),
            })
            .await
            .unwrap();
        assert_eq!(
            channels.events.recv().await,
            Some(ProtocolEvent::EnabledChanged(true))
        );
        assert!(channels.handle.holds_token().await);
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let (_transport, _link_tx, channels) = spawn_runtime(1);
        channels.handle.shutdown().await;

        // Commands queued before the Shutdown drains may still land;
        // once the loop exits, sends start failing.
        let closed = async {
            loop {
                if channels
                    .handle
                    .submit_child_event(0.0, 0.0, 0.0, 0.0, 0.0, 1.0)
                    .await
                    .is_err()
                {
                    break;
                }
                tokio::task::yield_now().await;
            }
        };
        tokio::time::timeout(std::time::Duration::from_secs(1), closed)
            .await
            .expect("runtime did not stop");
    }
}
