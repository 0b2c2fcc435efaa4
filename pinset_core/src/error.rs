use crate::Cid;
use crate::resolve::PinTarget;

/// Errors surfaced by input normalization and the pin-add pipeline.
///
/// Any of these ends the batch. Pins applied before the failing request
/// stay applied.
#[derive(thiserror::Error, Debug)]
pub enum PinError {
    /// The source, or one of its elements, does not have a pinnable shape.
    #[error("invalid pin input: {0}")]
    InvalidInput(String),

    /// A target could not be mapped to an identifier.
    #[error("failed to resolve {target}: {source}")]
    Resolution {
        target: PinTarget,
        #[source]
        source: anyhow::Error,
    },

    /// A direct pin was requested for an identifier that is pinned recursively.
    #[error("{cid} already pinned recursively")]
    Conflict { cid: Cid },

    /// The pin record store failed.
    #[error("pin store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl PinError {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        PinError::InvalidInput(msg.into())
    }
}

pub type PinResult<T> = std::result::Result<T, PinError>;
