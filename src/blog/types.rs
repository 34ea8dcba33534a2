use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

const VALIDATION_MESSAGE: &str = "Title and at least one category are required";

/// A blog post as stored by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
  #[serde(deserialize_with = "deserialize_id")]
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub category: Vec<String>,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub content: String,
  #[serde(default)]
  pub date: String,
  #[serde(default)]
  pub cover_image: String,
}

/// json-server hands out numeric ids for collections seeded with numbers
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum RawId {
    Text(String),
    Number(u64),
  }

  Ok(match RawId::deserialize(deserializer)? {
    RawId::Text(s) => s,
    RawId::Number(n) => n.to_string(),
  })
}

impl Blog {
  /// Case-insensitive substring match against title, description and categories.
  ///
  /// An empty query matches everything.
  pub fn matches(&self, query: &str) -> bool {
    if query.is_empty() {
      return true;
    }
    let query = query.to_lowercase();
    self.title.to_lowercase().contains(&query)
      || self.description.to_lowercase().contains(&query)
      || self
        .category
        .iter()
        .any(|cat| cat.to_lowercase().contains(&query))
  }
}

/// Fields supplied by the author; `id` and `date` are assigned at creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
  pub title: String,
  pub category: Vec<String>,
  pub description: String,
  pub content: String,
  pub cover_image: String,
}

/// Raw create-form data, categories still comma separated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogForm {
  pub title: String,
  pub category: String,
  pub description: String,
  pub content: String,
  pub cover_image: String,
}

impl BlogForm {
  /// Split the raw category field on commas, dropping blank tokens
  pub fn categories(&self) -> Vec<String> {
    self
      .category
      .split(',')
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .map(String::from)
      .collect()
  }

  /// Check the form and turn it into a create request.
  pub fn validate(&self) -> Result<NewBlog> {
    let category = self.categories();
    if self.title.is_empty() || category.is_empty() {
      return Err(Error::Validation(VALIDATION_MESSAGE.to_string()));
    }

    Ok(NewBlog {
      title: self.title.clone(),
      category,
      description: self.description.clone(),
      content: self.content.clone(),
      cover_image: self.cover_image.clone(),
    })
  }
}
