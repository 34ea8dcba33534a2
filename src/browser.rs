//! Selection, search and navigation state on top of the blog cache.
//!
//! `BlogBrowser` keeps the list view, the detail view and the create flow
//! consistent: both views read from the shared cache, and a successful
//! create invalidates the list so every observer refetches it.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::blog::{Blog, BlogCache, BlogData, BlogForm, BlogQuery, BlogStore};
use crate::cache::{QueryStatus, Subscription};
use crate::error::{Error, Result};

type BlogSubscription = Subscription<BlogQuery, BlogData>;

/// What the list pane should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
  Loading,
  Failed(Error),
  /// Nothing to show; `searching` tells "no match" apart from "no blogs"
  Empty { searching: bool },
  Ready(Vec<Blog>),
}

/// What the detail pane should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailView {
  Unselected,
  Loading,
  /// The store has no blog with the selected id
  NotFound,
  Failed(Error),
  Ready(Blog),
}

pub struct BlogBrowser {
  store: Arc<dyn BlogStore>,
  cache: BlogCache,
  /// The list is always on screen, so it is subscribed for the browser's lifetime
  blogs: BlogSubscription,
  detail: Option<BlogSubscription>,
  selected_id: Option<String>,
  search_query: String,
  detail_focused: bool,
}

impl BlogBrowser {
  /// Create a browser over `cache` and start loading the list.
  ///
  /// Must be called within a tokio runtime.
  pub fn new(store: Arc<dyn BlogStore>, cache: BlogCache) -> Self {
    let blogs = subscribe_blogs(&cache, &store);

    Self {
      store,
      cache,
      blogs,
      detail: None,
      selected_id: None,
      search_query: String::new(),
      detail_focused: false,
    }
  }

  pub fn cache(&self) -> &BlogCache {
    &self.cache
  }

  pub fn search_query(&self) -> &str {
    &self.search_query
  }

  /// Update the free-text filter. The cache is not touched.
  pub fn set_search_query(&mut self, query: impl Into<String>) {
    self.search_query = query.into();
  }

  pub fn selected_id(&self) -> Option<&str> {
    self.selected_id.as_deref()
  }

  pub fn is_detail_focused(&self) -> bool {
    self.detail_focused
  }

  /// Blogs matching the search query, in store order
  pub fn filtered_blogs(&self) -> Vec<Blog> {
    let entry = self.blogs.current();
    entry
      .data()
      .and_then(BlogData::as_list)
      .map(|blogs| {
        blogs
          .iter()
          .filter(|blog| blog.matches(&self.search_query))
          .cloned()
          .collect()
      })
      .unwrap_or_default()
  }

  pub fn list_view(&self) -> ListView {
    let entry = self.blogs.current();
    if let (QueryStatus::Error, Some(error)) = (entry.status, entry.error()) {
      return ListView::Failed(error.clone());
    }
    if entry.data().is_none() {
      return ListView::Loading;
    }

    let blogs = self.filtered_blogs();
    if blogs.is_empty() {
      ListView::Empty {
        searching: !self.search_query.is_empty(),
      }
    } else {
      ListView::Ready(blogs)
    }
  }

  /// Whether a fetch for the list or the selected blog is running
  pub fn is_fetching(&self) -> bool {
    self.blogs.current().is_fetching
      || self
        .detail
        .as_ref()
        .map(|d| d.current().is_fetching)
        .unwrap_or(false)
  }

  /// Select a blog and show its detail view.
  ///
  /// The detail key is fetched only if the cache has nothing usable for it.
  pub fn select_blog(&mut self, id: &str) {
    let same = self.selected_id.as_deref() == Some(id) && self.detail.is_some();
    if !same {
      debug!(id, "Selecting blog");
      // Subscribe before releasing the previous key
      let detail = subscribe_blog(&self.cache, &self.store, id);
      self.detail = Some(detail);
      self.selected_id = Some(id.to_string());
    }
    self.detail_focused = true;
  }

  /// Leave the detail view and clear the selection
  pub fn back_to_list(&mut self) {
    self.detail_focused = false;
    self.selected_id = None;
    self.detail = None;
  }

  pub fn detail_view(&self) -> DetailView {
    let Some(detail) = &self.detail else {
      return DetailView::Unselected;
    };

    let entry = detail.current();
    if let (QueryStatus::Error, Some(error)) = (entry.status, entry.error()) {
      return if error.is_not_found() {
        DetailView::NotFound
      } else {
        DetailView::Failed(error.clone())
      };
    }
    match entry.data().and_then(BlogData::as_blog) {
      Some(blog) => DetailView::Ready(blog.clone()),
      None => DetailView::Loading,
    }
  }

  /// Validate and create a blog, then select it.
  ///
  /// Validation failures never reach the store. On any failure selection and
  /// cache are left untouched.
  pub async fn create_blog(&mut self, form: &BlogForm) -> Result<String> {
    let id = self.publisher().publish(form).await?;
    self.select_blog(&id);
    Ok(id)
  }

  /// Handle for creating blogs from a spawned task, so the caller keeps
  /// handling input while the request runs. Select the returned id with
  /// `select_blog` once it arrives.
  pub fn publisher(&self) -> Publisher {
    Publisher {
      store: Arc::clone(&self.store),
      cache: self.cache.clone(),
    }
  }

  /// Refetch the list and the selected blog, clearing sticky errors
  pub fn refresh(&mut self) {
    self.cache.invalidate(&BlogQuery::AllBlogs);
    if let Some(id) = &self.selected_id {
      self.cache.invalidate(&BlogQuery::blog(id.as_str()));
    }
  }

  /// Wait until the list or the selected blog changes
  pub async fn changed(&mut self) {
    match &mut self.detail {
      Some(detail) => {
        tokio::select! {
          _ = self.blogs.changed() => {}
          _ = detail.changed() => {}
        }
      }
      None => {
        self.blogs.changed().await;
      }
    }
  }
}

/// Create half of `BlogBrowser::create_blog`, detached from the browser
#[derive(Clone)]
pub struct Publisher {
  store: Arc<dyn BlogStore>,
  cache: BlogCache,
}

impl Publisher {
  /// Validate and create a blog, then invalidate the list. Returns the new id.
  pub async fn publish(&self, form: &BlogForm) -> Result<String> {
    let new_blog = form.validate()?;
    let created = self.store.create_blog(&new_blog).await.map_err(|e| {
      warn!(error = %e, "Failed to create blog");
      e
    })?;

    info!(id = %created.id, title = %created.title, "Blog created");
    self.cache.invalidate(&BlogQuery::AllBlogs);
    Ok(created.id)
  }
}

fn subscribe_blogs(cache: &BlogCache, store: &Arc<dyn BlogStore>) -> BlogSubscription {
  let store = Arc::clone(store);
  cache.subscribe(BlogQuery::AllBlogs, move || {
    let store = Arc::clone(&store);
    async move {
      let blogs = store.list_blogs().await?;
      Ok::<_, Error>(BlogData::List(Arc::new(blogs)))
    }
  })
}

fn subscribe_blog(cache: &BlogCache, store: &Arc<dyn BlogStore>, id: &str) -> BlogSubscription {
  let store = Arc::clone(store);
  let id = id.to_string();
  cache.subscribe(BlogQuery::blog(id.as_str()), move || {
    let store = Arc::clone(&store);
    let id = id.clone();
    async move {
      let blog = store.get_blog(&id).await?;
      Ok::<_, Error>(BlogData::One(Arc::new(blog)))
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blog::testing::{blog, FakeStore};
  use std::sync::atomic::Ordering;
  use std::time::Duration;

  fn browser(store: &Arc<FakeStore>) -> BlogBrowser {
    BlogBrowser::new(store.clone(), BlogCache::new())
  }

  async fn loaded(store: &Arc<FakeStore>) -> BlogBrowser {
    let mut browser = browser(store);
    browser.blogs.settled().await;
    browser
  }

  fn form(title: &str, category: &str) -> BlogForm {
    BlogForm {
      title: title.to_string(),
      category: category.to_string(),
      description: "desc".to_string(),
      content: "some words here".to_string(),
      cover_image: String::new(),
    }
  }

  #[tokio::test]
  async fn test_list_loads_once_for_concurrent_views() {
    let seeded = Blog {
      id: "1".to_string(),
      title: "A".to_string(),
      category: vec!["TECH".to_string()],
      description: "d".to_string(),
      content: "c".to_string(),
      date: "2024-01-01T00:00:00Z".to_string(),
      cover_image: String::new(),
    };
    let store = FakeStore::with_blogs(vec![seeded.clone()]);
    let cache = BlogCache::new();

    let mut first = BlogBrowser::new(store.clone(), cache.clone());
    let mut second = BlogBrowser::new(store.clone(), cache.clone());
    assert_eq!(first.list_view(), ListView::Loading);

    let a = first.blogs.settled().await;
    let b = second.blogs.settled().await;
    assert!(a.is_success());
    assert_eq!(a.data, b.data);
    assert_eq!(first.list_view(), ListView::Ready(vec![seeded.clone()]));
    assert_eq!(second.list_view(), ListView::Ready(vec![seeded]));
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_search_filters_in_store_order() {
    let store = FakeStore::with_blogs(vec![
      blog("1", "Rust in Production", &["TECH"]),
      blog("2", "Saving Money", &["FINANCE"]),
      blog("3", "Trusting the Process", &["LIFE"]),
    ]);
    let mut browser = loaded(&store).await;

    let ids = |b: &BlogBrowser| -> Vec<String> {
      b.filtered_blogs().into_iter().map(|b| b.id).collect()
    };
    assert_eq!(ids(&browser), vec!["1", "2", "3"]);

    browser.set_search_query("RUST");
    assert_eq!(ids(&browser), vec!["1", "3"]);

    browser.set_search_query("finance");
    assert_eq!(ids(&browser), vec!["2"]);

    browser.set_search_query("about saving");
    assert_eq!(ids(&browser), vec!["2"]);

    browser.set_search_query("");
    assert_eq!(ids(&browser), vec!["1", "2", "3"]);
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_empty_views() {
    let store = FakeStore::with_blogs(Vec::new());
    let mut browser = loaded(&store).await;
    assert_eq!(browser.list_view(), ListView::Empty { searching: false });

    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"])]);
    browser = loaded(&store).await;
    browser.set_search_query("zzz");
    assert_eq!(browser.list_view(), ListView::Empty { searching: true });
  }

  #[tokio::test]
  async fn test_list_error_is_reported_and_refresh_recovers() {
    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"])]);
    store.fail_lists(Error::Network("connection refused".to_string()));
    let mut browser = loaded(&store).await;
    assert_eq!(
      browser.list_view(),
      ListView::Failed(Error::Network("connection refused".to_string()))
    );

    store.recover();
    browser.refresh();
    browser.blogs.settled().await;
    assert!(matches!(browser.list_view(), ListView::Ready(blogs) if blogs.len() == 1));
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_select_blog_fetches_detail_once() {
    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"]), blog("2", "B", &["X"])]);
    let mut browser = loaded(&store).await;
    assert_eq!(browser.detail_view(), DetailView::Unselected);

    browser.select_blog("1");
    assert_eq!(browser.selected_id(), Some("1"));
    assert!(browser.is_detail_focused());
    assert_eq!(browser.detail_view(), DetailView::Loading);

    browser.select_blog("1");
    browser.detail.as_mut().unwrap().settled().await;
    assert_eq!(browser.detail_view(), DetailView::Ready(blog("1", "A", &["TECH"])));
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 1);

    browser.select_blog("2");
    browser.detail.as_mut().unwrap().settled().await;
    browser.select_blog("1");
    assert_eq!(browser.detail_view(), DetailView::Ready(blog("1", "A", &["TECH"])));
    assert_eq!(store.get_calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_missing_blog_shows_not_found() {
    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"])]);
    let mut browser = loaded(&store).await;

    browser.select_blog("missing");
    let entry = browser.detail.as_mut().unwrap().settled().await;
    assert!(entry.is_error());
    assert_eq!(browser.detail_view(), DetailView::NotFound);
    assert!(matches!(browser.list_view(), ListView::Ready(_)));
  }

  #[tokio::test]
  async fn test_back_to_list_releases_detail() {
    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"])]);
    let mut browser = BlogBrowser::new(
      store.clone(),
      BlogCache::new().with_gc_time(Duration::ZERO),
    );
    browser.select_blog("1");
    assert_eq!(browser.cache().subscriber_count(&BlogQuery::blog("1")), 1);

    browser.back_to_list();
    assert_eq!(browser.selected_id(), None);
    assert!(!browser.is_detail_focused());
    assert_eq!(browser.detail_view(), DetailView::Unselected);
    assert!(!browser.cache().contains(&BlogQuery::blog("1")));
  }

  #[tokio::test]
  async fn test_create_invalidates_list_and_selects_new_blog() {
    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"])]);
    let mut browser = loaded(&store).await;

    let id = browser
      .create_blog(&form("Fresh Post", "news, tech"))
      .await
      .unwrap();
    assert_eq!(id, "new-2");
    assert_eq!(browser.selected_id(), Some("new-2"));
    assert!(browser.is_detail_focused());

    let entry = browser.blogs.settled().await;
    let blogs = entry.data().and_then(BlogData::as_list).unwrap();
    assert_eq!(blogs.len(), 2);
    assert_eq!(blogs[1].category, vec!["news", "tech"]);
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);

    // A later subscriber sees the refetched list without another call
    let other = BlogBrowser::new(store.clone(), browser.cache().clone());
    assert_eq!(other.filtered_blogs().len(), 2);
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);

    browser.detail.as_mut().unwrap().settled().await;
    assert!(matches!(browser.detail_view(), DetailView::Ready(b) if b.title == "Fresh Post"));
  }

  #[tokio::test]
  async fn test_create_validation_never_reaches_store() {
    let store = FakeStore::with_blogs(Vec::new());
    let mut browser = loaded(&store).await;
    browser.select_blog("1");
    browser.detail.as_mut().unwrap().settled().await;
    let calls_before = store.calls();

    let err = browser.create_blog(&form("", "x")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = browser.create_blog(&form("Title", " , ")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.calls(), calls_before);
    assert_eq!(browser.selected_id(), Some("1"));
  }

  #[tokio::test]
  async fn test_create_failure_leaves_state_alone() {
    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"])]);
    store.fail_creates(Error::Network("500 Internal Server Error".to_string()));
    let mut browser = loaded(&store).await;
    browser.set_search_query("a");

    let err = browser.create_blog(&form("T", "x")).await.unwrap_err();
    assert_eq!(err, Error::Network("500 Internal Server Error".to_string()));
    assert_eq!(browser.selected_id(), None);
    assert!(!browser.is_detail_focused());
    assert_eq!(browser.search_query(), "a");

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 1);
    assert!(browser.blogs.current().is_success());
  }

  #[tokio::test]
  async fn test_publisher_runs_on_a_spawned_task() {
    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"])]);
    let mut browser = loaded(&store).await;
    browser.select_blog("1");

    let publisher = browser.publisher();
    let task = tokio::spawn(async move { publisher.publish(&form("Later", "misc")).await });
    let id = task.await.unwrap().unwrap();
    assert_eq!(id, "new-2");

    // Selection is the caller's call; the list refetch already started
    assert_eq!(browser.selected_id(), Some("1"));
    let entry = browser.blogs.settled().await;
    assert_eq!(entry.data().and_then(BlogData::as_list).unwrap().len(), 2);
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);

    browser.select_blog(&id);
    assert_eq!(browser.selected_id(), Some("new-2"));
  }

  #[tokio::test]
  async fn test_stale_list_shown_while_refetching() {
    let store = FakeStore::with_blogs(vec![blog("1", "A", &["TECH"])]);
    let mut browser = loaded(&store).await;

    store.hold_lists();
    browser.refresh();
    assert!(browser.is_fetching());
    assert!(matches!(browser.list_view(), ListView::Ready(blogs) if blogs.len() == 1));

    tokio::time::sleep(Duration::from_millis(10)).await;
    store.release_lists();
    browser.changed().await;
    browser.blogs.settled().await;
    assert!(!browser.is_fetching());
  }
}
