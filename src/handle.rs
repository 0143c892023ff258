//! Shared, auto-saving access to one scheduler and its store.
//!
//! Every mutation runs together with its save under a single lock, so a
//! save never interleaves with another change to the same collection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{Clock, SystemClock};
use crate::domain::{ItemKind, ReviewItem};
use crate::error::{LogOnError, Result, StoreError};
use crate::srs::{ReviewOutcome, Scheduler};
use crate::store::{DurableStore, MemoryStore};

struct Inner<C> {
  scheduler: Scheduler<C>,
  store: Box<dyn DurableStore + Send>,
  key: String,
}

impl<C: Clock> Inner<C> {
  fn persist(&mut self) -> Result<()> {
    self.scheduler.save_to(self.store.as_mut(), &self.key)
  }
}

pub struct SchedulerHandle<C = SystemClock> {
  inner: Arc<Mutex<Inner<C>>>,
}

impl<C> Clone for SchedulerHandle<C> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<C: Clock> SchedulerHandle<C> {
  /// Load the collection stored under `key` and take ownership of both.
  pub fn open(
    mut scheduler: Scheduler<C>,
    store: Box<dyn DurableStore + Send>,
    key: impl Into<String>,
  ) -> Result<Self> {
    let key = key.into();
    scheduler.load_from(store.as_ref(), &key)?;
    Ok(Self::from_parts(scheduler, store, key))
  }

  /// Like [`SchedulerHandle::open`], but a store that cannot be opened or
  /// read is replaced by an in-memory one with a warning. Changes then last
  /// only as long as the handle. Malformed stored data is still an error.
  pub fn open_or_in_memory(
    mut scheduler: Scheduler<C>,
    store: std::result::Result<Box<dyn DurableStore + Send>, StoreError>,
    key: impl Into<String>,
  ) -> Result<Self> {
    let key = key.into();
    let opened = store
      .and_then(|store| store.get(&key).map(|raw| (store, raw)))
      .log_warn("Review storage unavailable, keeping reviews in memory");

    let (store, raw) = match opened {
      Some(opened) => opened,
      None => (Box::new(MemoryStore::new()) as Box<dyn DurableStore + Send>, None),
    };
    if let Some(raw) = raw {
      scheduler.load(&raw)?;
    }
    Ok(Self::from_parts(scheduler, store, key))
  }

  fn from_parts(scheduler: Scheduler<C>, store: Box<dyn DurableStore + Send>, key: String) -> Self {
    Self {
      inner: Arc::new(Mutex::new(Inner {
        scheduler,
        store,
        key,
      })),
    }
  }

  fn try_lock(&self) -> std::result::Result<MutexGuard<'_, Inner<C>>, StoreError> {
    self.inner.lock().map_err(|_: PoisonError<_>| {
      tracing::error!("Scheduler mutex poisoned - a thread panicked while holding the lock");
      StoreError::Lock("scheduler")
    })
  }

  /// Create an item and save. If the save fails the item is not kept.
  pub fn create_item(
    &self,
    id: impl Into<String>,
    kind: ItemKind,
    content: impl Into<String>,
  ) -> Result<ReviewItem> {
    let mut inner = self.try_lock()?;
    let item = inner.scheduler.create_item(id, kind, content)?.clone();
    if let Err(e) = inner.persist() {
      inner.scheduler.discard(&item.id);
      return Err(e);
    }
    Ok(item)
  }

  /// Review an item and save. If the save fails the item keeps its prior state.
  pub fn review(&self, id: &str, quality: u8) -> Result<ReviewOutcome> {
    let mut inner = self.try_lock()?;
    let before = inner.scheduler.get(id).cloned();
    let outcome = inner.scheduler.review(id, quality)?;
    if let Err(e) = inner.persist() {
      if let Some(item) = before {
        inner.scheduler.restore(item);
      }
      return Err(e);
    }
    Ok(outcome)
  }

  /// Read-only access to the scheduler
  pub fn read<R>(&self, f: impl FnOnce(&Scheduler<C>) -> R) -> Result<R> {
    let inner = self.try_lock()?;
    Ok(f(&inner.scheduler))
  }

  /// Replace the collection from raw JSON and save it under the handle's key
  pub fn import(&self, raw: &str) -> Result<usize> {
    let mut inner = self.try_lock()?;
    let previous = inner.scheduler.save()?;
    inner.scheduler.load(raw)?;
    if let Err(e) = inner.persist() {
      inner.scheduler.load(&previous)?;
      return Err(e);
    }
    Ok(inner.scheduler.len())
  }

  pub fn export(&self) -> Result<String> {
    self.try_lock()?.scheduler.save()
  }

  pub fn save(&self) -> Result<()> {
    self.try_lock()?.persist()
  }
}
