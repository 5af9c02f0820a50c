//! Mutation Controller
//!
//! Runs create, update and delete for one resource kind, optimistic-first:
//!
//! 1. validate the input (failures never touch the store),
//! 2. apply the expected result to the store and snapshot what it replaced,
//! 3. send the request,
//! 4. commit the server's canonical entity, or restore the snapshot.
//!
//! Every reconciliation checks that the entity is still in the store, so a
//! response for something the user has since deleted is dropped.
//!
//! Several writes may be pending on one entity. When an older one fails
//! after a newer one has written, its rollback is skipped and its snapshot
//! is handed on: if the newer write fails too, it restores that older
//! snapshot instead of its own, which still holds the rejected patch.

mod ids;


use chrono::Utc;
use log::{debug, error, warn};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{is_temporary_id, Draft, Entity, EntityId, Patch, Placement};
use crate::error::{GatewayError, MutationError, StoreError, ValidationError};
use crate::gateway::{Request, RequestGateway};
use crate::normalize::decode_list;
use crate::resource::Resource;
use crate::store::{EntitySnapshot, EntityStore};

pub use ids::TempIdAllocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// Idle -> Pending -> Committed | RolledBack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    Pending,
    Committed,
    RolledBack,
}

/// Tracks one mutation's phase and logs each transition
#[derive(Debug)]
struct MutationTrace {
    kind: MutationKind,
    entity: &'static str,
    id: EntityId,
    phase: MutationPhase,
}

impl MutationTrace {
    fn start<E: Entity>(kind: MutationKind, id: EntityId) -> Self {
        Self {
            kind,
            entity: E::KIND.as_str(),
            id,
            phase: MutationPhase::Idle,
        }
    }

    fn advance(&mut self, next: MutationPhase) {
        debug!(
            "[MUTATION] {:?} {} #{}: {:?} -> {:?}",
            self.kind, self.entity, self.id, self.phase, next
        );
        self.phase = next;
    }
}

/// Counts requests in flight for `is_loading`
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Writes pending on one entity, and the snapshot a skipped rollback
/// left for them
struct Lineage<E> {
    pending: usize,
    base: Option<EntitySnapshot<E>>,
}

type Lineages<E> = Mutex<HashMap<EntityId, Lineage<E>>>;

fn lock_lineages<E>(lineages: &Lineages<E>) -> MutexGuard<'_, HashMap<EntityId, Lineage<E>>> {
    lineages.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registers a pending update/delete on one entity until dropped
struct PendingWrite<'a, E> {
    lineages: &'a Lineages<E>,
    id: EntityId,
}

impl<'a, E> PendingWrite<'a, E> {
    fn enter(lineages: &'a Lineages<E>, id: EntityId) -> Self {
        lock_lineages(lineages)
            .entry(id)
            .or_insert(Lineage { pending: 0, base: None })
            .pending += 1;
        Self { lineages, id }
    }
}

impl<E> Drop for PendingWrite<'_, E> {
    fn drop(&mut self) {
        let mut lineages = lock_lineages(self.lineages);
        if let Some(lineage) = lineages.get_mut(&self.id) {
            lineage.pending = lineage.pending.saturating_sub(1);
            if lineage.pending == 0 {
                lineages.remove(&self.id);
            }
        }
    }
}

/// Optimistic create/update/delete for one resource kind
pub struct MutationController<E: Resource> {
    store: Arc<EntityStore<E>>,
    gateway: Arc<dyn RequestGateway>,
    ids: Arc<TempIdAllocator>,
    in_flight: AtomicUsize,
    last_error: Mutex<Option<MutationError>>,
    lineages: Lineages<E>,
}

impl<E: Resource> MutationController<E> {
    pub fn new(
        store: Arc<EntityStore<E>>,
        gateway: Arc<dyn RequestGateway>,
        ids: Arc<TempIdAllocator>,
    ) -> Self {
        Self {
            store,
            gateway,
            ids,
            in_flight: AtomicUsize::new(0),
            last_error: Mutex::new(None),
            lineages: Mutex::new(HashMap::new()),
        }
    }

    /// Read handle to the store
    pub fn store(&self) -> &Arc<EntityStore<E>> {
        &self.store
    }

    pub fn entities(&self) -> Vec<E> {
        self.store.list()
    }

    pub fn get(&self, id: EntityId) -> Option<E> {
        self.store.get(id)
    }

    /// Reorder the store, e.g. deadlines by due date
    pub fn sort_by(&self, compare: impl FnMut(&E, &E) -> std::cmp::Ordering) {
        self.store.sort_by(compare);
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn last_error(&self) -> Option<MutationError> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }

    fn set_error(&self, err: Option<MutationError>) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = err;
    }

    /// Record and hand back a failure
    fn fail<T>(&self, err: MutationError) -> Result<T, MutationError> {
        match &err {
            MutationError::MalformedResponse(detail) => {
                error!("[MUTATION] {} response malformed: {}", E::KIND, detail)
            }
            MutationError::Validation(e) => debug!("[MUTATION] {} rejected before apply: {}", E::KIND, e),
            other => warn!("[MUTATION] {} failed: {}", E::KIND, other),
        }
        self.set_error(Some(err.clone()));
        Err(err)
    }

    /// Update and delete only target entities the backend knows about
    fn check_persisted(&self, id: EntityId) -> Result<(), ValidationError> {
        if is_temporary_id(id) && self.store.contains(id) {
            return Err(ValidationError::NotPersisted { kind: E::KIND, id });
        }
        if !self.store.contains(id) {
            return Err(ValidationError::NotFound { kind: E::KIND, id });
        }
        Ok(())
    }

    /// Restore the oldest unconfirmed state: an inherited snapshot if an
    /// earlier write failed under us, else our own
    fn rollback(&self, trace: &mut MutationTrace, snapshot: EntitySnapshot<E>, expected: Option<u64>) {
        let id = trace.id;
        let inherited = lock_lineages(&self.lineages)
            .get_mut(&id)
            .and_then(|lineage| lineage.base.take());
        let snapshot = inherited.unwrap_or(snapshot);
        if !self.store.restore(snapshot.clone(), expected) {
            let mut lineages = lock_lineages(&self.lineages);
            match lineages.get_mut(&id) {
                Some(lineage) if lineage.pending > 1 => {
                    debug!(
                        "[MUTATION] {} #{} written again while pending, handing rollback on",
                        E::KIND, id
                    );
                    lineage.base.get_or_insert(snapshot);
                }
                _ => debug!(
                    "[MUTATION] {} #{} changed by a later write, keeping it",
                    E::KIND, id
                ),
            }
        }
        trace.advance(MutationPhase::RolledBack);
    }

    /// The server confirmed a state; older snapshots no longer apply
    fn settle(&self, id: EntityId) {
        if let Some(lineage) = lock_lineages(&self.lineages).get_mut(&id) {
            lineage.base = None;
        }
    }

    /// Decode a create/update/get response into a persisted entity
    fn canonical(payload: &Value) -> Result<E, MutationError> {
        if !payload.is_object() {
            return Err(MutationError::MalformedResponse(format!(
                "expected a {} object",
                E::KIND
            )));
        }
        let entity = E::from_wire(payload);
        if entity.id() <= 0 {
            return Err(MutationError::MalformedResponse(format!(
                "{} response has no id",
                E::KIND
            )));
        }
        Ok(entity)
    }

    /// Put a server entity where `slot` is. If the server id is already
    /// present (a list load raced the create), that copy wins the slot.
    fn commit_replace(&self, slot: EntityId, entity: E) -> Result<(), StoreError> {
        let id = entity.id();
        match self.store.replace(slot, entity.clone()) {
            Err(StoreError::DuplicateId(_)) => {
                self.store.remove(slot)?;
                self.store.replace(id, entity).map(|_| ())
            }
            other => other.map(|_| ()),
        }
    }

    // ========================
    // Mutations
    // ========================

    /// Create an entity. The optimistic copy appears with a temporary id and
    /// is replaced in place by the server's entity.
    pub async fn create(&self, draft: E::Draft) -> Result<E, MutationError> {
        if let Err(e) = draft.validate() {
            return self.fail(e.into());
        }

        let temp_id = self.ids.allocate();
        let mut trace = MutationTrace::start::<E>(MutationKind::Create, temp_id);
        let optimistic = draft.to_optimistic(temp_id, Utc::now());
        let snapshot = self.store.snapshot(temp_id);
        let revision = match self.store.insert_placed(optimistic) {
            Ok(rev) => rev,
            Err(e) => return self.fail(e.into()),
        };
        trace.advance(MutationPhase::Pending);

        let response = {
            let _loading = InFlight::enter(&self.in_flight);
            self.gateway.send(E::create_request(&draft)).await
        };

        let entity = match response
            .map_err(MutationError::from)
            .and_then(|payload| Self::canonical(&payload))
        {
            Ok(entity) => entity,
            Err(err) => {
                self.rollback(&mut trace, snapshot, Some(revision));
                return self.fail(err);
            }
        };

        if self.store.contains(temp_id) {
            if let Err(e) = self.commit_replace(temp_id, entity.clone()) {
                return self.fail(e.into());
            }
        } else {
            debug!(
                "[MUTATION] {} #{} left the store before its create resolved",
                E::KIND, temp_id
            );
        }
        trace.id = entity.id();
        trace.advance(MutationPhase::Committed);
        self.clear_error();
        Ok(entity)
    }

    /// Patch an entity in place, then reconcile with the server's copy
    pub async fn update(&self, id: EntityId, patch: E::Patch) -> Result<E, MutationError> {
        if let Err(e) = patch.validate().and_then(|_| self.check_persisted(id)) {
            return self.fail(e.into());
        }

        let mut trace = MutationTrace::start::<E>(MutationKind::Update, id);
        let snapshot = self.store.snapshot(id);
        let now = Utc::now();
        let revision = match self.store.modify(id, |entity| patch.apply(entity, now)) {
            Ok(rev) => rev,
            Err(e) => return self.fail(e.into()),
        };
        let _write = PendingWrite::enter(&self.lineages, id);
        let Some(optimistic) = self.store.get(id) else {
            return self.fail(StoreError::Missing(id).into());
        };
        trace.advance(MutationPhase::Pending);

        let response = {
            let _loading = InFlight::enter(&self.in_flight);
            self.gateway.send(E::update_request(id, &patch)).await
        };

        let payload = match response {
            Ok(payload) => payload,
            Err(err) => {
                self.rollback(&mut trace, snapshot, Some(revision));
                return self.fail(err.into());
            }
        };

        // No body: the optimistic copy stands
        if payload.is_null() {
            self.settle(id);
            trace.advance(MutationPhase::Committed);
            self.clear_error();
            return Ok(optimistic);
        }

        let entity = match Self::canonical(&payload) {
            Ok(entity) if entity.id() == id => entity,
            Ok(entity) => {
                self.rollback(&mut trace, snapshot, Some(revision));
                return self.fail(MutationError::MalformedResponse(format!(
                    "update of {} #{} answered with #{}",
                    E::KIND,
                    id,
                    entity.id()
                )));
            }
            Err(err) => {
                self.rollback(&mut trace, snapshot, Some(revision));
                return self.fail(err);
            }
        };

        if self.store.contains(id) {
            if let Err(e) = self.store.replace(id, entity.clone()) {
                return self.fail(e.into());
            }
        } else {
            debug!("[MUTATION] {} #{} deleted while its update was pending", E::KIND, id);
        }
        self.settle(id);
        trace.advance(MutationPhase::Committed);
        self.clear_error();
        Ok(entity)
    }

    /// Remove an entity immediately; it comes back if the server refuses
    pub async fn remove(&self, id: EntityId) -> Result<(), MutationError> {
        if let Err(e) = self.check_persisted(id) {
            return self.fail(e.into());
        }

        let mut trace = MutationTrace::start::<E>(MutationKind::Delete, id);
        let snapshot = self.store.snapshot(id);
        if let Err(e) = self.store.remove(id) {
            return self.fail(e.into());
        }
        let _write = PendingWrite::enter(&self.lineages, id);
        trace.advance(MutationPhase::Pending);

        let response = {
            let _loading = InFlight::enter(&self.in_flight);
            self.gateway.send(E::delete_request(id)).await
        };

        match response {
            Ok(_) => {
                self.settle(id);
                trace.advance(MutationPhase::Committed);
                self.clear_error();
                Ok(())
            }
            Err(err) => {
                self.rollback(&mut trace, snapshot, None);
                self.fail(err.into())
            }
        }
    }

    // ========================
    // Fetches
    // ========================

    /// Replace the store with the server's list. Entities whose create is
    /// still pending are kept.
    pub async fn load(&self) -> Result<usize, MutationError> {
        let response = {
            let _loading = InFlight::enter(&self.in_flight);
            self.gateway.send(E::list_request()).await
        };
        let payload = match response {
            Ok(payload) => payload,
            Err(err) => return self.fail(err.into()),
        };
        if !payload.is_array() && !payload.is_object() && !payload.is_null() {
            return self.fail(
                GatewayError::MalformedResponse(format!("{} list is not an array", E::KIND)).into(),
            );
        }

        let fetched: Vec<E> = decode_list::<E>(&payload)
            .into_iter()
            .filter(|e| e.id() > 0)
            .collect();
        let count = fetched.len();
        let pending: Vec<E> = self
            .store
            .list()
            .into_iter()
            .filter(|e| is_temporary_id(e.id()))
            .collect();
        let merged: Vec<E> = match E::PLACEMENT {
            Placement::Front => pending.into_iter().chain(fetched).collect(),
            Placement::Back => fetched.into_iter().chain(pending).collect(),
        };
        self.store.load(merged);
        debug!("[MUTATION] loaded {} {} entities", count, E::KIND);
        self.clear_error();
        Ok(count)
    }

    /// Re-fetch one entity and reconcile it into the store. Kinds without a
    /// get route are looked up in a fresh list.
    pub async fn refresh(&self, id: EntityId) -> Result<E, MutationError> {
        if is_temporary_id(id) {
            return self.fail(ValidationError::NotPersisted { kind: E::KIND, id }.into());
        }
        let fetched = match E::get_request(id) {
            Some(request) => self.fetch_one(request).await,
            None => self.fetch_from_list(id).await,
        };
        let entity = match fetched {
            Ok(entity) if entity.id() == id => entity,
            Ok(entity) => {
                return self.fail(MutationError::MalformedResponse(format!(
                    "get of {} #{} answered with #{}",
                    E::KIND,
                    id,
                    entity.id()
                )))
            }
            Err(err) => return self.fail(err),
        };
        let written = if self.store.contains(id) {
            self.store.replace(id, entity.clone())
        } else {
            self.store.insert_placed(entity.clone())
        };
        if let Err(e) = written {
            return self.fail(e.into());
        }
        self.clear_error();
        Ok(entity)
    }

    async fn fetch_one(&self, request: Request) -> Result<E, MutationError> {
        let _loading = InFlight::enter(&self.in_flight);
        let payload = self.gateway.send(request).await?;
        Self::canonical(&payload)
    }

    async fn fetch_from_list(&self, id: EntityId) -> Result<E, MutationError> {
        let payload = {
            let _loading = InFlight::enter(&self.in_flight);
            self.gateway.send(E::list_request()).await?
        };
        decode_list::<E>(&payload)
            .into_iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| MutationError::ServerRejected {
                status: 404,
                message: format!("{} not found", E::KIND),
            })
    }
}
