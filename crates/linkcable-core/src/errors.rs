//! Error types for the linkcable exchange core
//!
//! Per-concern error enums unified by [`LinkcableError`]. Only permission
//! and connect/discovery failures are surfaced to callers as actionable
//! errors; scan noise and malformed frames are absorbed where they occur.

// ----------------------------------------------------------------------------
// Protocol Errors
// ----------------------------------------------------------------------------

/// Errors raised while decoding a wire frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    #[error("unknown opcode value: {value}")]
    UnknownOpCode { value: u8 },

    #[error("record index {index} outside catalog (max {max})")]
    IndexOutOfRange { index: u16, max: u16 },
}

// ----------------------------------------------------------------------------
// Transport Errors
// ----------------------------------------------------------------------------

/// Errors raised by the peripheral transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("radio adapter not available: {reason}")]
    AdapterUnavailable { reason: String },

    #[error("failed to start scan: {reason}")]
    ScanFailed { reason: String },

    #[error("failed to connect to {peripheral}: {reason}")]
    ConnectFailed { peripheral: String, reason: String },

    #[error("connection to {peripheral} timed out")]
    ConnectTimeout { peripheral: String },

    #[error("service discovery failed: {reason}")]
    DiscoveryFailed { reason: String },

    #[error("exchange characteristic not found on peripheral")]
    CharacteristicNotFound,

    #[error("failed to subscribe to notifications: {reason}")]
    SubscribeFailed { reason: String },

    #[error("failed to write frame: {reason}")]
    WriteFailed { reason: String },

    #[error("no peripheral connected")]
    NotConnected,
}

// ----------------------------------------------------------------------------
// Unified Error Type
// ----------------------------------------------------------------------------

/// Core error type for the linkcable exchange system
#[derive(Debug, thiserror::Error)]
pub enum LinkcableError {
    #[error("permission to use the radio was denied")]
    PermissionDenied,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{operation} is not valid in state {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl LinkcableError {
    /// Create a connect-failed error
    pub fn connect_failed<P: Into<String>, R: Into<String>>(peripheral: P, reason: R) -> Self {
        LinkcableError::Transport(TransportError::ConnectFailed {
            peripheral: peripheral.into(),
            reason: reason.into(),
        })
    }

    /// Create an invalid-state error for an operation
    pub fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        LinkcableError::InvalidState { operation, state }
    }
}

// ----------------------------------------------------------------------------
// Type Aliases
// ----------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, LinkcableError>;
