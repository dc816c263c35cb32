//! In-memory mesh harness for skein integration tests.
//!
//! Wires multiple live runtimes together without any real transport:
//! each node gets a [`MeshTransport`] whose sends are delivered as
//! `LinkEvent::Frame`s into the far side's link-event channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use skein_protocol::{
    Link, LinkEvent, LinkId, PeerId, ProtocolEvent, RuntimeChannels, RuntimeConfig, RuntimeHandle,
    SkeinRuntime, Transport,
};
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 256;

/// Where a frame written to one link end comes out: the far node's
/// event channel, tagged with the far side's view of the link.
struct Route {
    to: mpsc::Sender<LinkEvent>,
    far_link: Link,
}

/// One node's outbound transport surface.
#[derive(Clone, Default)]
pub struct MeshTransport {
    routes: Arc<Mutex<HashMap<LinkId, Route>>>,
}

#[async_trait::async_trait]
impl Transport for MeshTransport {
    async fn send_frame(&self, link: LinkId, frame: &[u8]) -> Result<(), String> {
        let (to, far_link) = {
            let routes = self.routes.lock().unwrap();
            let route = routes
                .get(&link)
                .ok_or_else(|| format!("no route for {link}"))?;
            (route.to.clone(), route.far_link)
        };
        to.send(LinkEvent::Frame {
            link: far_link,
            frame: Bytes::copy_from_slice(frame),
        })
        .await
        .map_err(|_| "far node gone".to_string())
    }
}

/// A live runtime plus the plumbing the mesh needs to reach it.
pub struct Node {
    pub id: PeerId,
    pub handle: RuntimeHandle,
    pub events: mpsc::Receiver<ProtocolEvent>,
    transport: MeshTransport,
    link_tx: mpsc::Sender<LinkEvent>,
}

/// The mesh: spawns nodes and connects/disconnects link pairs.
#[derive(Default)]
pub struct Mesh {
    next_link: AtomicU64,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a runtime with a fixed identity.
    pub fn spawn_node(&self, id: i64) -> Node {
        let transport = MeshTransport::default();
        let (link_tx, link_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let RuntimeChannels { handle, events } = SkeinRuntime::spawn(
            transport.clone(),
            link_rx,
            RuntimeConfig {
                local_id: Some(PeerId::from_raw(id)),
                channel_capacity: CHANNEL_CAPACITY,
            },
        );
        Node {
            id: PeerId::from_raw(id),
            handle,
            events,
            transport,
            link_tx,
        }
    }

    /// Connect two nodes with one bidirectional link pair.
    ///
    /// Routes are wired before either side learns of the link, so
    /// frames sent from within the connect handling (the token
    /// tie-break) are deliverable. Returns each side's descriptor.
    pub async fn connect(&self, a: &Node, b: &Node, priority: i32) -> (Link, Link) {
        let a_link = Link::new(self.mint_link_id(), b.id, priority);
        let b_link = Link::new(self.mint_link_id(), a.id, priority);

        a.transport.routes.lock().unwrap().insert(
            a_link.id,
            Route {
                to: b.link_tx.clone(),
                far_link: b_link,
            },
        );
        b.transport.routes.lock().unwrap().insert(
            b_link.id,
            Route {
                to: a.link_tx.clone(),
                far_link: a_link,
            },
        );

        tracing::debug!(a = %a.id, b = %b.id, priority, "mesh: link pair up");
        a.link_tx.send(LinkEvent::Connected(a_link)).await.unwrap();
        b.link_tx.send(LinkEvent::Connected(b_link)).await.unwrap();
        (a_link, b_link)
    }

    /// Tear down one link pair previously returned by [`connect`].
    pub async fn disconnect(&self, a: &Node, b: &Node, pair: (Link, Link)) {
        let (a_link, b_link) = pair;
        a.transport.routes.lock().unwrap().remove(&a_link.id);
        b.transport.routes.lock().unwrap().remove(&b_link.id);
        a.link_tx
            .send(LinkEvent::Disconnected(a_link))
            .await
            .unwrap();
        b.link_tx
            .send(LinkEvent::Disconnected(b_link))
            .await
            .unwrap();
    }

    fn mint_link_id(&self) -> LinkId {
        LinkId(self.next_link.fetch_add(1, Ordering::Relaxed))
    }
}

/// Poll a condition until it holds, panicking after 2 seconds.
///
/// A macro so the condition can `.await` handle queries in place.
#[macro_export]
macro_rules! wait_until {
    ($what:expr, $cond:expr) => {{
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
        while !$cond {
            if tokio::time::Instant::now() > deadline {
                panic!("timed out waiting for: {}", $what);
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }};
}

/// Receive events until one matches, skipping the rest. Panics after
/// 2 seconds or if the channel closes.
pub async fn expect_event<F>(
    events: &mut mpsc::Receiver<ProtocolEvent>,
    what: &str,
    mut pred: F,
) -> ProtocolEvent
where
    F: FnMut(&ProtocolEvent) -> bool,
{
    let matching = async {
        loop {
            match events.recv().await {
                Some(event) if pred(&event) => return event,
                Some(_) => continue,
                None => panic!("event channel closed waiting for: {what}"),
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(2), matching)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for: {what}"))
}
