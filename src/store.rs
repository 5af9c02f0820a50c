//! Entity Store
//!
//! Ordered, id-keyed collection for one resource kind; the single source of
//! truth the UI renders from. Reads are public. Writes are crate-private so
//! only the mutation controller changes contents.
//!
//! Every write stamps the touched entry with a fresh revision. Controllers
//! remember the revision their optimistic write produced and roll back only
//! if nobody has written the entity since. A restore puts the snapshot's own
//! revision back, so an older pending write still recognises the state it
//! produced.

use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::domain::{Entity, EntityId, Placement};
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct Entry<T> {
    entity: T,
    revision: u64,
}

#[derive(Debug)]
struct Inner<T> {
    entries: Vec<Entry<T>>,
    last_revision: u64,
}

impl<T: Entity> Inner<T> {
    fn position(&self, id: EntityId) -> Option<usize> {
        self.entries.iter().position(|e| e.entity.id() == id)
    }

    fn bump(&mut self) -> u64 {
        self.last_revision += 1;
        self.last_revision
    }
}

/// State of one entity captured before an optimistic write
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot<T> {
    pub id: EntityId,
    /// Index the entity held, or the store length if it was absent
    pub position: usize,
    /// Ids of the entries on either side, used to re-insert after removals
    pub prev: Option<EntityId>,
    pub next: Option<EntityId>,
    /// `None` when the entity did not exist yet (create)
    pub entity: Option<T>,
    /// Revision the entry carried when captured
    pub revision: u64,
}

#[derive(Debug)]
pub struct EntityStore<T: Entity> {
    inner: Mutex<Inner<T>>,
    changes: watch::Sender<u64>,
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                last_revision: 0,
            }),
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, revision: u64) {
        self.changes.send_replace(revision);
    }

    // ========================
    // Reads
    // ========================

    /// All entities in display order
    pub fn list(&self) -> Vec<T> {
        self.lock().entries.iter().map(|e| e.entity.clone()).collect()
    }

    pub fn get(&self, id: EntityId) -> Option<T> {
        let inner = self.lock();
        inner.position(id).map(|pos| inner.entries[pos].entity.clone())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.lock().position(id).is_some()
    }

    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.lock().position(id)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Store-wide revision; grows on every write
    pub fn revision(&self) -> u64 {
        self.lock().last_revision
    }

    /// Revision of one entity's last write
    pub fn revision_of(&self, id: EntityId) -> Option<u64> {
        let inner = self.lock();
        inner.position(id).map(|pos| inner.entries[pos].revision)
    }

    /// Receiver that wakes on every change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    // ========================
    // Writes
    // ========================

    /// Append; returns the entry's revision
    pub(crate) fn insert(&self, entity: T) -> Result<u64, StoreError> {
        let len = self.len();
        self.insert_at(len, entity)
    }

    /// Insert at `index` (clamped to the length)
    pub(crate) fn insert_at(&self, index: usize, entity: T) -> Result<u64, StoreError> {
        let revision = {
            let mut inner = self.lock();
            let id = entity.id();
            if inner.position(id).is_some() {
                return Err(StoreError::DuplicateId(id));
            }
            let revision = inner.bump();
            let index = index.min(inner.entries.len());
            inner.entries.insert(index, Entry { entity, revision });
            revision
        };
        self.notify(revision);
        Ok(revision)
    }

    /// Insert where the kind's placement puts new entities
    pub(crate) fn insert_placed(&self, entity: T) -> Result<u64, StoreError> {
        match T::PLACEMENT {
            Placement::Front => self.insert_at(0, entity),
            Placement::Back => self.insert(entity),
        }
    }

    /// Swap the entity with `id` for `entity`, keeping its position.
    /// The new entity may carry a different id (temporary -> server id).
    pub(crate) fn replace(&self, id: EntityId, entity: T) -> Result<u64, StoreError> {
        let revision = {
            let mut inner = self.lock();
            let pos = inner.position(id).ok_or(StoreError::Missing(id))?;
            let new_id = entity.id();
            if new_id != id && inner.position(new_id).is_some() {
                return Err(StoreError::DuplicateId(new_id));
            }
            let revision = inner.bump();
            inner.entries[pos] = Entry { entity, revision };
            revision
        };
        self.notify(revision);
        Ok(revision)
    }

    /// Apply `f` to the entity in place
    pub(crate) fn modify(&self, id: EntityId, f: impl FnOnce(&mut T)) -> Result<u64, StoreError> {
        let revision = {
            let mut inner = self.lock();
            let pos = inner.position(id).ok_or(StoreError::Missing(id))?;
            let mut entity = inner.entries[pos].entity.clone();
            f(&mut entity);
            if entity.id() != id {
                return Err(StoreError::DuplicateId(entity.id()));
            }
            let revision = inner.bump();
            inner.entries[pos] = Entry { entity, revision };
            revision
        };
        self.notify(revision);
        Ok(revision)
    }

    /// Remove and return the entity with its former position
    pub(crate) fn remove(&self, id: EntityId) -> Result<(usize, T), StoreError> {
        let (revision, removed) = {
            let mut inner = self.lock();
            let pos = inner.position(id).ok_or(StoreError::Missing(id))?;
            let entry = inner.entries.remove(pos);
            (inner.bump(), (pos, entry.entity))
        };
        self.notify(revision);
        Ok(removed)
    }

    /// Replace all contents, e.g. from a list fetch. Later duplicates are dropped.
    pub(crate) fn load(&self, entities: Vec<T>) {
        let revision = {
            let mut inner = self.lock();
            inner.entries.clear();
            for entity in entities {
                let id = entity.id();
                if inner.position(id).is_some() {
                    log::warn!("dropping duplicate {} #{} from list response", T::KIND, id);
                    continue;
                }
                let revision = inner.bump();
                inner.entries.push(Entry { entity, revision });
            }
            inner.bump()
        };
        self.notify(revision);
    }

    /// Reorder in place; stable
    pub(crate) fn sort_by(&self, mut compare: impl FnMut(&T, &T) -> Ordering) {
        let revision = {
            let mut inner = self.lock();
            inner.entries.sort_by(|a, b| compare(&a.entity, &b.entity));
            inner.bump()
        };
        self.notify(revision);
    }

    // ========================
    // Snapshots
    // ========================

    /// Capture one entity (or its absence) before an optimistic write
    pub(crate) fn snapshot(&self, id: EntityId) -> EntitySnapshot<T> {
        let inner = self.lock();
        match inner.position(id) {
            Some(pos) => EntitySnapshot {
                id,
                position: pos,
                prev: pos.checked_sub(1).map(|p| inner.entries[p].entity.id()),
                next: inner.entries.get(pos + 1).map(|e| e.entity.id()),
                entity: Some(inner.entries[pos].entity.clone()),
                revision: inner.entries[pos].revision,
            },
            None => EntitySnapshot {
                id,
                position: inner.entries.len(),
                prev: None,
                next: None,
                entity: None,
                revision: 0,
            },
        }
    }

    /// Put `snapshot` back, provided the entity is still in the state our
    /// optimistic write left it: `expected` is that write's revision, or
    /// `None` if the write removed the entity.
    ///
    /// Returns false (and changes nothing) when a later write got there first.
    pub(crate) fn restore(&self, snapshot: EntitySnapshot<T>, expected: Option<u64>) -> bool {
        let revision = {
            let mut inner = self.lock();
            let current = inner.position(snapshot.id);
            let current_revision = current.map(|pos| inner.entries[pos].revision);
            if current_revision != expected {
                return false;
            }
            let revision = inner.bump();
            let EntitySnapshot { position, prev, next, entity, revision: captured, .. } = snapshot;
            match (current, entity) {
                (Some(pos), Some(entity)) => {
                    inner.entries[pos] = Entry { entity, revision: captured };
                }
                (Some(pos), None) => {
                    inner.entries.remove(pos);
                }
                (None, Some(entity)) => {
                    // Neighbours first; other entries may have moved meanwhile
                    let index = prev
                        .and_then(|p| inner.position(p))
                        .map(|p| p + 1)
                        .or_else(|| next.and_then(|n| inner.position(n)))
                        .unwrap_or(position)
                        .min(inner.entries.len());
                    inner.entries.insert(index, Entry { entity, revision: captured });
                }
                (None, None) => {}
            }
            revision
        };
        self.notify(revision);
        true
    }
}
