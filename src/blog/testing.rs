//! In-memory record store for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::client::BlogStore;
use super::types::{Blog, NewBlog};
use crate::error::{Error, Result};

pub fn blog(id: &str, title: &str, category: &[&str]) -> Blog {
  Blog {
    id: id.to_string(),
    title: title.to_string(),
    category: category.iter().map(|c| c.to_string()).collect(),
    description: format!("About {}", title),
    content: "c".to_string(),
    date: "2024-01-01T00:00:00Z".to_string(),
    cover_image: String::new(),
  }
}

/// Store double with call counters, failure injection and a gate that holds
/// `list_blogs` until released.
#[derive(Default)]
pub struct FakeStore {
  blogs: Mutex<Vec<Blog>>,
  list_error: Mutex<Option<Error>>,
  create_error: Mutex<Option<Error>>,
  list_gate: Mutex<Option<Arc<Notify>>>,
  pub list_calls: AtomicUsize,
  pub get_calls: AtomicUsize,
  pub create_calls: AtomicUsize,
}

impl FakeStore {
  pub fn with_blogs(blogs: Vec<Blog>) -> Arc<Self> {
    Arc::new(Self {
      blogs: Mutex::new(blogs),
      ..Default::default()
    })
  }

  pub fn fail_lists(&self, error: Error) {
    *self.list_error.lock().unwrap() = Some(error);
  }

  pub fn fail_creates(&self, error: Error) {
    *self.create_error.lock().unwrap() = Some(error);
  }

  /// Stop injecting failures
  pub fn recover(&self) {
    self.list_error.lock().unwrap().take();
    self.create_error.lock().unwrap().take();
  }

  /// Hold every following `list_blogs` call until `release_lists`
  pub fn hold_lists(&self) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    *self.list_gate.lock().unwrap() = Some(gate.clone());
    gate
  }

  pub fn release_lists(&self) {
    if let Some(gate) = self.list_gate.lock().unwrap().take() {
      gate.notify_waiters();
    }
  }

  pub fn calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
      + self.get_calls.load(Ordering::SeqCst)
      + self.create_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl BlogStore for FakeStore {
  async fn list_blogs(&self) -> Result<Vec<Blog>> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    let gate = self.list_gate.lock().unwrap().clone();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    if let Some(error) = self.list_error.lock().unwrap().clone() {
      return Err(error);
    }
    Ok(self.blogs.lock().unwrap().clone())
  }

  async fn get_blog(&self, id: &str) -> Result<Blog> {
    self.get_calls.fetch_add(1, Ordering::SeqCst);
    self
      .blogs
      .lock()
      .unwrap()
      .iter()
      .find(|b| b.id == id)
      .cloned()
      .ok_or_else(|| Error::NotFound { id: id.to_string() })
  }

  async fn create_blog(&self, blog: &NewBlog) -> Result<Blog> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(error) = self.create_error.lock().unwrap().clone() {
      return Err(error);
    }

    let mut blogs = self.blogs.lock().unwrap();
    let created = Blog {
      id: format!("new-{}", blogs.len() + 1),
      title: blog.title.clone(),
      category: blog.category.clone(),
      description: blog.description.clone(),
      content: blog.content.clone(),
      date: "2024-06-01T12:00:00.000Z".to_string(),
      cover_image: blog.cover_image.clone(),
    };
    blogs.push(created.clone());
    Ok(created)
  }
}
