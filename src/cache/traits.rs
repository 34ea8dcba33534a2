//! Core traits and types for the query cache.

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Error;

/// Logical identity of a fetchable resource.
///
/// Two equal keys share one cache entry and at most one in-flight fetch.
pub trait QueryKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {
  /// Human-readable description for logs (e.g., "all blogs", "blog 42")
  fn description(&self) -> String;
}

/// Where a query is in its fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
  /// No result yet for the current cycle
  Pending,
  /// Last fetch succeeded
  Success,
  /// Last fetch failed
  Error,
}

/// Snapshot of a cache entry as seen by subscribers.
#[derive(Debug, Clone)]
pub struct QueryEntry<V> {
  pub status: QueryStatus,
  /// Last successful value, kept while a refetch runs or after it fails
  pub data: Option<V>,
  pub error: Option<Error>,
  /// A fetch for this key is in flight
  pub is_fetching: bool,
  /// When the last fetch settled
  pub updated_at: Option<DateTime<Utc>>,
}

impl<V> QueryEntry<V> {
  pub(crate) fn pending() -> Self {
    Self {
      status: QueryStatus::Pending,
      data: None,
      error: None,
      is_fetching: false,
      updated_at: None,
    }
  }

  pub fn is_pending(&self) -> bool {
    self.status == QueryStatus::Pending
  }

  pub fn is_success(&self) -> bool {
    self.status == QueryStatus::Success
  }

  pub fn is_error(&self) -> bool {
    self.status == QueryStatus::Error
  }

  /// Success or error: the current cycle has a result
  pub fn is_settled(&self) -> bool {
    !self.is_pending()
  }

  pub fn data(&self) -> Option<&V> {
    self.data.as_ref()
  }

  pub fn error(&self) -> Option<&Error> {
    self.error.as_ref()
  }
}
