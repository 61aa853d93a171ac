use thiserror::Error;

use drive_sce_format::FormatError;

/**
    Failures of the command transport. Always terminal for the current attempt.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to open {device}: {reason}")]
    Open { device: String, reason: String },
    #[error("SG_IO ioctl failed: {0}")]
    Ioctl(String),
    #[error("device status {status}, host status {host_status}, driver status {driver_status}")]
    DeviceStatus {
        status: u8,
        host_status: u16,
        driver_status: u16,
    },
    #[error("no transfer parameters for opcode 0x{0:02X}")]
    UnknownOpcode(u8),
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/**
    Errors of the authentication engine and the disc-data layer.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ── Transport (propagated verbatim) ───────────────────────────────
    #[error(transparent)]
    Transport(#[from] TransportError),

    // ── Cipher primitives ─────────────────────────────────────────────
    #[error("cipher failure: {0}")]
    Crypto(String),

    // ── Payload validation ────────────────────────────────────────────
    #[error("check code mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
    #[error("malformed frame: {0}")]
    MalformedFrame(FormatError),

    // ── Nonce exchange ────────────────────────────────────────────────
    #[error("drive did not echo the host nonce (retryable: {retryable})")]
    NonceEchoMismatch { retryable: bool },
    #[error("drive nonce equals host nonce")]
    NonceCollision,

    // ── Configuration ─────────────────────────────────────────────────
    #[error("no challenge keys for role mode 0x{0:02X}")]
    InvalidRoleOrMode(u32),
    #[error("challenge key pair is all-zero")]
    KeyMaterialUninitialized,

    // ── Session state ─────────────────────────────────────────────────
    #[error("no session keys: authentication has not completed")]
    SessionNotEstablished,
}

impl AuthError {
    /**
        Whether the super-authentication cascade may move on to the next key pair.
    */
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NonceEchoMismatch { retryable: true })
    }
}

impl From<FormatError> for AuthError {
    fn from(e: FormatError) -> Self {
        match e {
            FormatError::CheckCodeMismatch { expected, actual } => {
                Self::ChecksumMismatch { expected, actual }
            }
            other => Self::MalformedFrame(other),
        }
    }
}

/**
    Type alias for results that may return an [`AuthError`].
*/
pub type AuthResult<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_code_mismatch_maps_to_checksum() {
        let err: AuthError = FormatError::CheckCodeMismatch {
            expected: 0x12,
            actual: 0x34,
        }
        .into();
        assert_eq!(
            err,
            AuthError::ChecksumMismatch {
                expected: 0x12,
                actual: 0x34
            }
        );
    }

    #[test]
    fn other_format_errors_are_malformed_frames() {
        let err: AuthError = FormatError::UnknownSecureCommand(7).into();
        assert!(matches!(err, AuthError::MalformedFrame(_)));
    }

    #[test]
    fn only_retryable_echo_mismatch_is_retryable() {
        assert!(AuthError::NonceEchoMismatch { retryable: true }.is_retryable());
        assert!(!AuthError::NonceEchoMismatch { retryable: false }.is_retryable());
        assert!(!AuthError::NonceCollision.is_retryable());
        assert!(
            !AuthError::ChecksumMismatch {
                expected: 0,
                actual: 1
            }
            .is_retryable()
        );
    }
}
