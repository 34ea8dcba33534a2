//! Blog records and the record store they live in.

pub mod api_types;
pub mod cache;
pub mod client;
pub mod display;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{BlogCache, BlogData, BlogQuery};
pub use client::{BlogStore, HttpBlogStore};
pub use display::{format_date, read_minutes, DateStyle};
pub use types::{Blog, BlogForm, NewBlog};
