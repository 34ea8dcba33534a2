//! Query keys and cached values for blog data.

use std::sync::Arc;

use crate::cache::{QueryCache, QueryKey};

use super::types::Blog;

/// Query key types for the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlogQuery {
  /// Every blog, as listed by the store
  AllBlogs,
  /// A single blog by id
  Blog { id: String },
}

impl BlogQuery {
  pub fn blog(id: impl Into<String>) -> Self {
    Self::Blog { id: id.into() }
  }
}

impl QueryKey for BlogQuery {
  fn description(&self) -> String {
    match self {
      Self::AllBlogs => "all blogs".to_string(),
      Self::Blog { id } => format!("blog {}", id),
    }
  }
}

/// Value cached under a `BlogQuery`. Shared so snapshots stay cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlogData {
  List(Arc<Vec<Blog>>),
  One(Arc<Blog>),
}

impl BlogData {
  pub fn as_list(&self) -> Option<&[Blog]> {
    match self {
      Self::List(blogs) => Some(blogs.as_slice()),
      Self::One(_) => None,
    }
  }

  pub fn as_blog(&self) -> Option<&Blog> {
    match self {
      Self::One(blog) => Some(blog),
      Self::List(_) => None,
    }
  }
}

/// The cache instance the application shares between its views
pub type BlogCache = QueryCache<BlogQuery, BlogData>;
