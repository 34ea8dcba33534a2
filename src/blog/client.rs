use async_trait::async_trait;
use chrono::Utc;
use color_eyre::eyre::eyre;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use crate::blog::api_types::ApiCreateBlog;
use crate::blog::types::{Blog, NewBlog};
use crate::config::StoreConfig;
use crate::error::{Error, Result};

/// Operations available against the remote record store.
#[async_trait]
pub trait BlogStore: Send + Sync {
  /// Fetch every blog, in store order
  async fn list_blogs(&self) -> Result<Vec<Blog>>;

  /// Fetch a single blog by id
  async fn get_blog(&self, id: &str) -> Result<Blog>;

  /// Create a blog. Not idempotent: every call creates a new record.
  async fn create_blog(&self, blog: &NewBlog) -> Result<Blog>;
}

/// Record store client speaking plain HTTP/JSON
#[derive(Clone)]
pub struct HttpBlogStore {
  client: reqwest::Client,
  base_url: Url,
}

impl HttpBlogStore {
  pub fn new(config: &StoreConfig) -> color_eyre::Result<Self> {
    let base_url = Url::parse(&config.url)
      .map_err(|e| eyre!("Invalid store URL {}: {}", config.url, e))?;
    if base_url.cannot_be_a_base() {
      return Err(eyre!("Invalid store URL {}: not a base URL", config.url));
    }

    let client = reqwest::Client::builder()
      .timeout(config.timeout())
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Build `{base}/seg/...`, keeping any path prefix of the base URL
  fn endpoint(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| Error::Network(format!("Invalid store URL: {}", self.base_url)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  /// Send a request; `lookup_id` turns a 404 into `NotFound` for single-blog reads
  async fn send(
    &self,
    request: reqwest::RequestBuilder,
    lookup_id: Option<&str>,
  ) -> Result<reqwest::Response> {
    let response = request
      .send()
      .await
      .map_err(|e| Error::Network(e.to_string()))?;

    let status = response.status();
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, lookup_id) {
      return Err(Error::NotFound { id: id.to_string() });
    }
    if !status.is_success() {
      return Err(Error::Network(format!(
        "{} returned {}",
        response.url(),
        status
      )));
    }
    Ok(response)
  }
}

/// Read the body as text first so transport and shape errors stay distinct
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
  let text = response
    .text()
    .await
    .map_err(|e| Error::Network(e.to_string()))?;
  serde_json::from_str(&text).map_err(|e| Error::Decode(e.to_string()))
}

fn ensure_id(blog: Blog) -> Result<Blog> {
  if blog.id.is_empty() {
    return Err(Error::Decode("blog without an id".to_string()));
  }
  Ok(blog)
}

#[async_trait]
impl BlogStore for HttpBlogStore {
  #[instrument(level = "debug", skip(self))]
  async fn list_blogs(&self) -> Result<Vec<Blog>> {
    let url = self.endpoint(&["blogs"])?;
    let response = self.send(self.client.get(url), None).await?;
    let blogs: Vec<Blog> = read_json(response).await?;
    debug!(count = blogs.len(), "Fetched blogs");

    blogs.into_iter().map(ensure_id).collect()
  }

  #[instrument(level = "debug", skip(self))]
  async fn get_blog(&self, id: &str) -> Result<Blog> {
    let url = self.endpoint(&["blogs", id])?;
    let response = self.send(self.client.get(url), Some(id)).await?;

    ensure_id(read_json(response).await?)
  }

  #[instrument(level = "debug", skip(self, blog), fields(title = %blog.title))]
  async fn create_blog(&self, blog: &NewBlog) -> Result<Blog> {
    let url = self.endpoint(&["blogs"])?;
    let body = ApiCreateBlog::stamped(blog, Utc::now());
    let response = self.send(self.client.post(url).json(&body), None).await?;
    let created = ensure_id(read_json(response).await?)?;
    info!(id = %created.id, "Created blog");

    Ok(created)
  }
}
