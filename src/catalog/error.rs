use thiserror::Error;

/// Failures at the catalog boundary. The cascade controller collapses all of
/// these into an empty list.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Upstream refused the credentials (HTTP 401/403).
    #[error("auth_rejected: HTTP {0}")]
    AuthRejected(u16),

    /// Any other non-success status.
    #[error("catalog request failed: HTTP {0}")]
    Status(u16),

    /// The body did not contain a recognizable list.
    #[error("catalog decode failed: {0}")]
    Decode(String),

    /// A parent id was empty.
    #[error("empty parent id for {0} listing")]
    EmptyId(&'static str),

    /// A parent id cannot be placed into a URL path.
    #[error("invalid parent id: {0:?}")]
    InvalidId(String),
}
