use thiserror::Error;

/**
    Errors from building or parsing command and response frames.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    // ── Framing ───────────────────────────────────────────────────────
    #[error("{what} is truncated: need {expected} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("frame size header mismatch: {first:#x} != {second:#x}")]
    SizeMismatch { first: u32, second: u32 },
    #[error("{data} data bytes do not fit a frame with payload size {payload:#x}")]
    Oversized { data: usize, payload: u32 },

    // ── Field values ──────────────────────────────────────────────────
    #[error("unknown secure command {0:#04x}")]
    UnknownSecureCommand(u8),
    #[error("unknown SCE function {0:#04x}")]
    UnknownSceFunction(u8),

    // ── Integrity ─────────────────────────────────────────────────────
    #[error("check code mismatch: expected {expected:#04x}, got {actual:#04x}")]
    CheckCodeMismatch { expected: u8, actual: u8 },
}

/**
    Type alias for results that may return a [`FormatError`].
*/
pub type FormatResult<T> = std::result::Result<T, FormatError>;
