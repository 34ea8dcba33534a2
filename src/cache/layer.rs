//! Query cache that deduplicates fetches and broadcasts results per key.

use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::subscription::Subscription;
use super::traits::{QueryEntry, QueryKey, QueryStatus};
use crate::error::Result;

/// A boxed future that resolves to a fetched value
type BoxFuture<V> = Pin<Box<dyn Future<Output = Result<V>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<V> = Arc<dyn Fn() -> BoxFuture<V> + Send + Sync>;

/// Bookkeeping for one key. Subscribers only ever see the `QueryEntry`.
struct Slot<V> {
  tx: watch::Sender<QueryEntry<V>>,
  fetcher: FetcherFn<V>,
  subscribers: usize,
  /// Fetch cycle the entry is waiting on; older results are discarded
  epoch: u64,
  /// Bumped on every subscribe so a scheduled eviction can tell it was revived
  generation: u64,
  invalidated: bool,
  fetched_at: Option<Instant>,
}

impl<V> Slot<V> {
  fn new(fetcher: FetcherFn<V>) -> Self {
    let (tx, _rx) = watch::channel(QueryEntry::pending());
    Self {
      tx,
      fetcher,
      subscribers: 0,
      epoch: 0,
      generation: 0,
      invalidated: false,
      fetched_at: None,
    }
  }
}

/// How a fetch treats the entry it refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refresh {
  /// Start a new cycle: status goes back to pending, data is kept
  Restart,
  /// Stale-while-revalidate: status and data stay as they are
  Background,
}

pub(super) struct Shared<K, V> {
  slots: Mutex<HashMap<K, Slot<V>>>,
  next_epoch: AtomicU64,
  stale_time: Duration,
  gc_time: Duration,
}

/// Process-wide cache of query results keyed by `K`.
///
/// - At most one fetch per key is in flight; concurrent subscribers share it
/// - Every subscriber of a key observes the same entry through a watch channel
/// - Results stay sticky until invalidated or evicted; there is no retry
/// - Entries without subscribers are evicted after `gc_time`
///
/// Fetches are spawned on the current tokio runtime, so `subscribe` and
/// `invalidate` must be called from within one.
pub struct QueryCache<K, V> {
  shared: Arc<Shared<K, V>>,
}

impl<K, V> QueryCache<K, V>
where
  K: QueryKey,
  V: Clone + Send + Sync + 'static,
{
  /// Create a cache with a one minute stale time and a five minute gc time.
  pub fn new() -> Self {
    Self::build(Duration::from_secs(60), Duration::from_secs(300))
  }

  fn build(stale_time: Duration, gc_time: Duration) -> Self {
    Self {
      shared: Arc::new(Shared {
        slots: Mutex::new(HashMap::new()),
        next_epoch: AtomicU64::new(1),
        stale_time,
        gc_time,
      }),
    }
  }

  /// Set how long a successful result counts as fresh.
  ///
  /// Builder method: entries of the cache it is called on are discarded.
  pub fn with_stale_time(self, stale_time: Duration) -> Self {
    Self::build(stale_time, self.shared.gc_time)
  }

  /// Set how long an entry without subscribers is kept.
  ///
  /// Builder method: entries of the cache it is called on are discarded.
  pub fn with_gc_time(self, gc_time: Duration) -> Self {
    Self::build(self.shared.stale_time, gc_time)
  }

  /// Register interest in `key`.
  ///
  /// Creates the entry and spawns `fetcher` when the key is unknown,
  /// invalidated, or holds a successful result older than the stale time.
  /// A pending or failed entry never triggers a fetch from here. The most
  /// recent `fetcher` is kept for later refetches.
  ///
  /// `fetcher` runs while the cache lock is held; it must only build the
  /// future, not call back into the cache.
  pub fn subscribe<F, Fut>(&self, key: K, fetcher: F) -> Subscription<K, V>
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V>> + Send + 'static,
  {
    let fetcher: FetcherFn<V> = Arc::new(move || Box::pin(fetcher()));

    let mut slots = self.shared.lock();
    let slot = slots.entry(key.clone()).or_insert_with(|| {
      debug!(query = %key.description(), "Creating cache entry");
      Slot::new(fetcher.clone())
    });
    slot.fetcher = fetcher;
    slot.subscribers += 1;
    slot.generation += 1;

    if let Some(refresh) = self.shared.refresh_needed(slot) {
      self.shared.start_fetch(&key, slot, refresh);
    }
    let rx = slot.tx.subscribe();
    drop(slots);

    Subscription::new(key, rx, Arc::downgrade(&self.shared))
  }

  /// Give up a subscription. Same as dropping it.
  pub fn unsubscribe(&self, subscription: Subscription<K, V>) {
    drop(subscription);
  }

  /// Mark `key` as no longer authoritative.
  ///
  /// With active subscribers a new fetch starts right away and any fetch
  /// already in flight is superseded. Otherwise the next subscribe refetches.
  pub fn invalidate(&self, key: &K) {
    let mut slots = self.shared.lock();
    let Some(slot) = slots.get_mut(key) else {
      return;
    };

    slot.invalidated = true;
    debug!(
      query = %key.description(),
      subscribers = slot.subscribers,
      "Invalidated cache entry"
    );
    if slot.subscribers > 0 {
      self.shared.start_fetch(key, slot, Refresh::Restart);
    }
  }

  /// Current entry for `key`, if cached
  pub fn get(&self, key: &K) -> Option<QueryEntry<V>> {
    self
      .shared
      .lock()
      .get(key)
      .map(|slot| slot.tx.borrow().clone())
  }

  pub fn contains(&self, key: &K) -> bool {
    self.shared.lock().contains_key(key)
  }

  pub fn subscriber_count(&self, key: &K) -> usize {
    self
      .shared
      .lock()
      .get(key)
      .map(|slot| slot.subscribers)
      .unwrap_or(0)
  }

  pub fn stale_time(&self) -> Duration {
    self.shared.stale_time
  }

  pub fn gc_time(&self) -> Duration {
    self.shared.gc_time
  }
}

impl<K, V> Default for QueryCache<K, V>
where
  K: QueryKey,
  V: Clone + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> Clone for QueryCache<K, V> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<K, V> Shared<K, V>
where
  K: QueryKey,
  V: Send + Sync + 'static,
{
  fn lock(&self) -> MutexGuard<'_, HashMap<K, Slot<V>>> {
    // Critical sections never panic halfway through an update
    self.slots.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn refresh_needed(&self, slot: &Slot<V>) -> Option<Refresh> {
    // An invalidation outranks a fetch still running from the previous epoch
    if slot.invalidated {
      return Some(Refresh::Restart);
    }
    let entry = slot.tx.borrow();
    if entry.is_fetching {
      return None;
    }
    if entry.is_pending() {
      return Some(Refresh::Restart);
    }
    let stale = slot
      .fetched_at
      .map(|at| at.elapsed() >= self.stale_time)
      .unwrap_or(true);
    if entry.is_success() && stale {
      return Some(Refresh::Background);
    }
    None
  }

  /// Spawn the slot's fetcher for a new epoch.
  ///
  /// The task only keeps a weak handle so a dropped cache discards late results.
  fn start_fetch(self: &Arc<Self>, key: &K, slot: &mut Slot<V>, refresh: Refresh) {
    let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
    slot.epoch = epoch;
    slot.invalidated = false;
    slot.tx.send_modify(|entry| {
      entry.is_fetching = true;
      if refresh == Refresh::Restart {
        entry.status = QueryStatus::Pending;
        entry.error = None;
      }
    });
    debug!(query = %key.description(), epoch, ?refresh, "Fetching");

    let future = (slot.fetcher)();
    let shared: Weak<Self> = Arc::downgrade(self);
    let key = key.clone();
    tokio::spawn(async move {
      let result = future.await;
      match shared.upgrade() {
        Some(shared) => shared.complete(&key, epoch, result),
        None => debug!(query = %key.description(), "Cache dropped, discarding result"),
      }
    });
  }

  fn complete(&self, key: &K, epoch: u64, result: Result<V>) {
    let mut slots = self.lock();
    let Some(slot) = slots.get_mut(key) else {
      debug!(query = %key.description(), "Entry evicted, discarding result");
      return;
    };
    if slot.epoch != epoch {
      debug!(
        query = %key.description(),
        epoch,
        current = slot.epoch,
        "Superseded fetch, discarding result"
      );
      return;
    }

    slot.fetched_at = Some(Instant::now());
    slot.tx.send_modify(|entry| {
      entry.is_fetching = false;
      entry.updated_at = Some(Utc::now());
      match result {
        Ok(value) => {
          entry.status = QueryStatus::Success;
          entry.data = Some(value);
          entry.error = None;
        }
        Err(e) => {
          warn!(query = %key.description(), error = %e, "Fetch failed");
          entry.status = QueryStatus::Error;
          entry.error = Some(e);
        }
      }
    });
  }

  /// Drop one subscriber of `key`, scheduling eviction when none remain
  pub(super) fn release(self: &Arc<Self>, key: &K) {
    let mut slots = self.lock();
    let Some(slot) = slots.get_mut(key) else {
      return;
    };
    slot.subscribers = slot.subscribers.saturating_sub(1);
    if slot.subscribers > 0 {
      return;
    }

    let generation = slot.generation;
    let handle = match tokio::runtime::Handle::try_current() {
      Ok(handle) if !self.gc_time.is_zero() => handle,
      _ => {
        slots.remove(key);
        debug!(query = %key.description(), "Evicted cache entry");
        return;
      }
    };

    let shared = Arc::downgrade(self);
    let key = key.clone();
    let gc_time = self.gc_time;
    handle.spawn(async move {
      tokio::time::sleep(gc_time).await;
      if let Some(shared) = shared.upgrade() {
        shared.evict_if_idle(&key, generation);
      }
    });
  }

  fn evict_if_idle(&self, key: &K, generation: u64) {
    let mut slots = self.lock();
    let idle = slots
      .get(key)
      .map(|slot| slot.subscribers == 0 && slot.generation == generation)
      .unwrap_or(false);
    if idle {
      slots.remove(key);
      debug!(query = %key.description(), "Evicted cache entry");
    }
  }
}
