use futures::stream::{self, Stream};
use std::sync::Weak;
use tokio::sync::watch;

use super::layer::Shared;
use super::traits::{QueryEntry, QueryKey};

/// A registered interest in one cache key.
///
/// Dropping the subscription releases it; the entry is evicted once the last
/// subscriber is gone and the cache's gc time has passed.
pub struct Subscription<K, V>
where
  K: QueryKey,
  V: Send + Sync + 'static,
{
  key: K,
  rx: watch::Receiver<QueryEntry<V>>,
  shared: Weak<Shared<K, V>>,
}

impl<K, V> Subscription<K, V>
where
  K: QueryKey,
  V: Clone + Send + Sync + 'static,
{
  pub(super) fn new(key: K, rx: watch::Receiver<QueryEntry<V>>, shared: Weak<Shared<K, V>>) -> Self {
    Self { key, rx, shared }
  }

  pub fn key(&self) -> &K {
    &self.key
  }

  /// Current entry, without marking it as seen
  pub fn current(&self) -> QueryEntry<V> {
    self.rx.borrow().clone()
  }

  /// Current entry, marking it as seen for `changed`
  pub fn latest(&mut self) -> QueryEntry<V> {
    self.rx.borrow_and_update().clone()
  }

  /// Whether the entry changed since it was last seen
  pub fn has_changed(&self) -> bool {
    self.rx.has_changed().unwrap_or(false)
  }

  /// Wait for the next change. Returns false once the cache is gone.
  pub async fn changed(&mut self) -> bool {
    self.rx.changed().await.is_ok()
  }

  /// Wait until the current fetch cycle has a result
  pub async fn settled(&mut self) -> QueryEntry<V> {
    if let Ok(entry) = self.rx.wait_for(QueryEntry::is_settled).await {
      return entry.clone();
    }
    self.rx.borrow().clone()
  }

  /// Stream of entries: the current one, then one per change.
  ///
  /// The stream owns the subscription and releases it when dropped.
  pub fn updates(self) -> impl Stream<Item = QueryEntry<V>> + Send {
    stream::unfold((self, true), |(mut sub, first)| async move {
      if !first && !sub.changed().await {
        return None;
      }
      let entry = sub.latest();
      Some((entry, (sub, false)))
    })
  }
}

impl<K, V> Drop for Subscription<K, V>
where
  K: QueryKey,
  V: Send + Sync + 'static,
{
  fn drop(&mut self) {
    if let Some(shared) = self.shared.upgrade() {
      shared.release(&self.key);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{QueryCache, QueryStatus};
  use crate::error::Error;
  use futures::StreamExt;
  use std::time::Duration;

  #[derive(Debug, Clone, PartialEq, Eq, Hash)]
  struct Key;

  impl QueryKey for Key {
    fn description(&self) -> String {
      "key".to_string()
    }
  }

  #[tokio::test]
  async fn test_updates_are_monotonic() {
    let cache: QueryCache<Key, u32> = QueryCache::new();
    let sub = cache.subscribe(Key, || async {
      tokio::time::sleep(Duration::from_millis(5)).await;
      Ok::<_, Error>(7)
    });

    let statuses: Vec<QueryStatus> = sub
      .updates()
      .take(2)
      .map(|entry| entry.status)
      .collect()
      .await;
    assert_eq!(statuses, vec![QueryStatus::Pending, QueryStatus::Success]);
  }

  #[tokio::test]
  async fn test_settled_returns_error_entry() {
    let cache: QueryCache<Key, u32> = QueryCache::new();
    let mut sub = cache.subscribe(Key, || async {
      Err::<u32, _>(Error::Decode("bad".to_string()))
    });

    let entry = sub.settled().await;
    assert!(entry.is_error());
    assert!(entry.data.is_none());
    assert!(!entry.is_fetching);
    assert!(entry.updated_at.is_some());
  }

  #[tokio::test]
  async fn test_dropping_stream_releases_subscription() {
    let cache: QueryCache<Key, u32> = QueryCache::new().with_gc_time(Duration::ZERO);
    let sub = cache.subscribe(Key, || async { Ok::<_, Error>(1) });
    assert_eq!(cache.subscriber_count(&Key), 1);

    let mut updates = Box::pin(sub.updates());
    assert!(updates.next().await.is_some());
    drop(updates);
    assert!(!cache.contains(&Key));
  }
}
