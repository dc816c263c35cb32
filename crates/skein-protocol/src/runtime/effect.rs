use crate::router::OutboundFrame;

use super::ProtocolEvent;

/// Intention produced by the pure logic in `RuntimeState`.
///
/// Every handler returns `Vec<RuntimeEffect>`; the event loop then
/// executes them via the `Transport` and the event channel.
#[derive(Debug)]
pub enum RuntimeEffect {
    /// Hand an encoded frame to a link, fire-and-forget.
    SendFrame(OutboundFrame),
    /// Surface an event to the application observer.
    Emit(ProtocolEvent),
}
