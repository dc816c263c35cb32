//! Effect executor — the only place that touches I/O.
//!
//! Takes a list of RuntimeEffect and executes them concretely:
//! - SendFrame -> transport.send_frame(), failures logged and dropped
//! - Emit -> event_tx.try_send(), so the loop never blocks on a slow
//!   application consumer

use tokio::sync::mpsc;

use super::effect::RuntimeEffect;
use super::transport::Transport;
use super::ProtocolEvent;

/// Execute a list of effects using the given transport and event channel.
pub(super) async fn execute_effects<T: Transport>(
    effects: Vec<RuntimeEffect>,
    transport: &T,
    event_tx: &mpsc::Sender<ProtocolEvent>,
) {
    for effect in effects {
        match effect {
            RuntimeEffect::SendFrame(out) => {
                // Fire-and-forget: the core does not observe delivery,
                // one unreachable link never affects the others.
                if let Err(err) = transport.send_frame(out.link, &out.frame).await {
                    tracing::debug!(link = %out.link, %err, "send failed, frame dropped");
                }
            }
            RuntimeEffect::Emit(event) => {
                if event_tx.try_send(event).is_err() {
                    tracing::warn!("event channel full, observer event dropped");
                }
            }
        }
    }
}
