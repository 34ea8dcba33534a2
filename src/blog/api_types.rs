//! Serde types for request bodies sent to the store.
//!
//! Response bodies decode straight into the domain `Blog`, so only the
//! create payload needs its own shape.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::types::NewBlog;

/// `POST /blogs` body: the author's fields plus the creation timestamp
#[derive(Debug, Serialize)]
pub struct ApiCreateBlog<'a> {
  #[serde(flatten)]
  pub blog: &'a NewBlog,
  pub date: String,
}

impl<'a> ApiCreateBlog<'a> {
  /// Stamp the blog with `now` in the same form as JavaScript's `toISOString`
  pub fn stamped(blog: &'a NewBlog, now: DateTime<Utc>) -> Self {
    Self {
      blog,
      date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
  }
}
