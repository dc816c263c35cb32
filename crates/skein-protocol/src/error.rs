/// A frame that fails to decode.
///
/// Decode never partially succeeds: a corrupt frame yields no message
/// and the caller drops it (logged, never propagated as a crash).
/// Nothing in this core is fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown message discriminant: {0:#04x}")]
    UnknownDiscriminant(u8),

    #[error("truncated payload: need {need} bytes, got {got}")]
    TruncatedPayload { need: usize, got: usize },
}

/// Errors surfaced by the runtime handle.
#[derive(Debug, thiserror::Error)]
pub enum SkeinError {
    /// The runtime event loop is no longer running.
    #[error("runtime shut down")]
    RuntimeShutDown,

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_discriminant() {
        let err = DecodeError::UnknownDiscriminant(0x7f);
        assert_eq!(err.to_string(), "unknown message discriminant: 0x7f");
    }

    #[test]
    fn display_truncated_payload() {
        let err = DecodeError::TruncatedPayload { need: 24, got: 3 };
        assert_eq!(err.to_string(), "truncated payload: need 24 bytes, got 3");
    }

    #[test]
    fn display_runtime_shut_down() {
        assert_eq!(SkeinError::RuntimeShutDown.to_string(), "runtime shut down");
    }

    #[test]
    fn decode_error_wraps_into_skein_error() {
        let err: SkeinError = DecodeError::UnknownDiscriminant(9).into();
        assert_eq!(err.to_string(), "decode error: unknown message discriminant: 0x09");
    }
}
