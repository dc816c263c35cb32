use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::DecodeError;

/// Wire discriminant for [`Message::ChildEvent`].
pub const DISCRIMINANT_CHILD_EVENT: u8 = 0;
/// Wire discriminant for [`Message::TokenControl`].
pub const DISCRIMINANT_TOKEN_CONTROL: u8 = 1;

/// Fixed payload size of a ChildEvent frame (six LE f32s).
pub const CHILD_EVENT_PAYLOAD: usize = 24;
/// Fixed payload size of a TokenControl frame.
pub const TOKEN_CONTROL_PAYLOAD: usize = 1;

/// A wire message — the unit of communication between skein peers.
///
/// Every frame is `1 + payload_size(type)` bytes: a one-byte
/// discriminant followed by a fixed-layout payload. Discriminant
/// values, field order, and little-endian float encoding are the wire
/// contract — every deployed peer must agree on them; there is no
/// length prefix, checksum, versioning, or negotiation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    /// Opaque application payload (interaction position + color),
    /// relayed verbatim between peers.
    ChildEvent {
        x: f32,
        y: f32,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    },
    /// Token-control assertion, directed at one peer.
    TokenControl { holds: bool },
}

impl Message {
    /// Fixed payload size for this variant, excluding the discriminant.
    pub fn payload_size(&self) -> usize {
        match self {
            Message::ChildEvent { .. } => CHILD_EVENT_PAYLOAD,
            Message::TokenControl { .. } => TOKEN_CONTROL_PAYLOAD,
        }
    }

    /// Encode to a wire frame.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(1 + self.payload_size());
        match *self {
            Message::ChildEvent { x, y, r, g, b, a } => {
                buf.put_u8(DISCRIMINANT_CHILD_EVENT);
                buf.put_f32_le(x);
                buf.put_f32_le(y);
                buf.put_f32_le(r);
                buf.put_f32_le(g);
                buf.put_f32_le(b);
                buf.put_f32_le(a);
            }
            Message::TokenControl { holds } => {
                buf.put_u8(DISCRIMINANT_TOKEN_CONTROL);
                buf.put_u8(u8::from(holds));
            }
        }
        buf.freeze()
    }

    /// Decode a wire frame.
    ///
    /// Trailing bytes beyond the variant's fixed size are ignored; a
    /// frame shorter than its fixed size never yields a partial message.
    pub fn decode(mut frame: &[u8]) -> Result<Self, DecodeError> {
        if frame.is_empty() {
            return Err(DecodeError::TruncatedPayload { need: 1, got: 0 });
        }
        let discriminant = frame.get_u8();
        match discriminant {
            DISCRIMINANT_CHILD_EVENT => {
                if frame.remaining() < CHILD_EVENT_PAYLOAD {
                    return Err(DecodeError::TruncatedPayload {
                        need: CHILD_EVENT_PAYLOAD,
                        got: frame.remaining(),
                    });
                }
                Ok(Message::ChildEvent {
                    x: frame.get_f32_le(),
                    y: frame.get_f32_le(),
                    r: frame.get_f32_le(),
                    g: frame.get_f32_le(),
                    b: frame.get_f32_le(),
                    a: frame.get_f32_le(),
                })
            }
            DISCRIMINANT_TOKEN_CONTROL => {
                if frame.remaining() < TOKEN_CONTROL_PAYLOAD {
                    return Err(DecodeError::TruncatedPayload {
                        need: TOKEN_CONTROL_PAYLOAD,
                        got: frame.remaining(),
                    });
                }
                Ok(Message::TokenControl {
                    holds: frame.get_u8() != 0,
                })
            }
            other => Err(DecodeError::UnknownDiscriminant(other)),
        }
    }
}
