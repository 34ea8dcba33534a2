//! Data-sync core of a blog browser: an HTTP record store client, a
//! synchronized query cache and the view state built on top of them.

pub mod blog;
pub mod browser;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
