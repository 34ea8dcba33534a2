//! Error type shared by the store client, the query cache and the browser.

/// Errors surfaced by blog operations.
///
/// `Clone` because a failed fetch is broadcast to every subscriber of its key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  /// A client-side precondition failed; the request never left the process
  #[error("{0}")]
  Validation(String),

  /// Transport failure or non-success HTTP status
  #[error("Network error: {0}")]
  Network(String),

  /// The store has no blog with this id (HTTP 404)
  #[error("Blog not found: {id}")]
  NotFound { id: String },

  /// The response body did not have the expected shape
  #[error("Failed to decode response: {0}")]
  Decode(String),
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Error::NotFound { .. })
  }
}

pub type Result<T> = std::result::Result<T, Error>;
