//! Error types and handling for dsmlink

/// Result type alias for dsmlink operations
pub type Result<T> = std::result::Result<T, DsmError>;

/// Errors surfaced by the marshaling core.
///
/// Transport-side failures pass through separately as [`TransportError`];
/// everything else is produced by name decoding, layout arithmetic, or the
/// two marshaling directions.
#[derive(Debug, thiserror::Error)]
pub enum DsmError {
    /// Variable name does not follow the type-suffix grammar
    #[error("illegal variable name: {name}")]
    IllegalName { name: String },

    /// Numeric value out of range for the target element, or string too
    /// long for its fixed buffer
    #[error("value out of range: {message}")]
    Range { message: String },

    /// Nested value's shape or kind does not match the schema
    #[error("could not decode value: {message}")]
    Decode { message: String },

    /// Capability not supported by the marshaling core
    #[error("not implemented: {message}")]
    NotImplemented { message: String },

    /// Invariant violation, fatal to the current call
    #[error("internal error: {message}")]
    Internal { message: String },

    /// `read_wait` called before any variable was monitored
    #[error("read_wait called with nothing monitored")]
    NothingMonitored,

    /// Failure reported by the shared-memory transport
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DsmError {
    /// Create an illegal-name error
    pub fn illegal_name(name: impl Into<String>) -> Self {
        Self::IllegalName { name: name.into() }
    }

    /// Create a range error
    pub fn range(message: impl Into<String>) -> Self {
        Self::Range {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a not-implemented error
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Failures owned by the external shared-memory transport.
///
/// The core never retries these; they abort the current call and reach the
/// caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Remote procedure call to the shared-memory service failed
    #[error("RPC failure")]
    RpcFailure,

    /// No shared space exists for the target computer
    #[error("no shared space for partner: {partner}")]
    NoShare { partner: String },

    /// The allocation name does not exist on the partner
    #[error("allocation name does not exist: {name}")]
    NoSuchName { name: String },

    /// Allocation version mismatch between the two ends
    #[error("allocation version mismatch")]
    VersionMismatch,

    /// The shared memory segment could not be opened
    #[error("cannot open shared memory")]
    NoResource,

    /// Any status the taxonomy does not name
    #[error("unhandled transport status: {status}")]
    CatchAll { status: i32 },
}
