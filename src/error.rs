use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error taxonomy of the processing core.
///
/// Dereference misses are deliberately *not* errors; the store returns
/// `Ok(None)` and call sites decide. `NotFound` is reserved for operations
/// whose contract promises an existing object or a non-empty page.
#[derive(Debug, Error)]
pub enum Error {
    /// Client sent an activity without fields the protocol mandates.
    #[error("missing required properties: {}", .0.join(", "))]
    MissingProperties(Vec<String>),
    /// Requester is not allowed to perform this mutation.
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Structural invariant violation, e.g. a collection whose items field
    /// is a literal instead of a node.
    #[error("invalid object: {0}")]
    InvalidObject(String),
    #[error("storage error")]
    Storage(#[from] fjall::Error),
    #[error("record codec error")]
    Codec(#[from] postcard::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
