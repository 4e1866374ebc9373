//! Marker store: the single authority for marker CRUD.
//!
//! # Responsibility
//! - Own the committed in-memory snapshot of the marker collection.
//! - Be the only writer of the persisted marker slot.
//! - Publish change events after each committed mutation.
//!
//! # Invariants
//! - Mutations are serialized by one async mutex held from read to commit.
//! - The snapshot changes only after the full collection was persisted.
//! - Every mutation rewrites the whole slot; there are no partial writes.
//! - A mutation never runs against a snapshot that was not loaded first.

use super::error::{ReadError, StoreError, StoreResult};
use super::ids::{next_marker_id, system_clock_millis};
use crate::model::collection::{decode_markers, encode_markers};
use crate::model::marker::{normalize_text_fields, Coordinate, Marker, MarkerId};
use crate::storage::KeyValueStore;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex};

/// Slot key the marker collection is stored under.
pub const DEFAULT_SLOT_KEY: &str = "markers";

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Millisecond clock used for id allocation.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Marker store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Adapter slot holding the serialized collection.
    pub slot_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

/// Change notification published after a mutation is durably committed.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerEvent {
    /// Snapshot was replaced from storage.
    Reloaded { count: usize },
    Created(Marker),
    Updated(Marker),
    Deleted(MarkerId),
    Cleared,
}

#[derive(Debug, Default)]
struct Snapshot {
    markers: Vec<Marker>,
    loaded: bool,
    last_issued_id: Option<MarkerId>,
}

/// Marker CRUD facade over a persistence adapter.
pub struct MarkerStore<S: KeyValueStore> {
    storage: S,
    config: StoreConfig,
    clock: Clock,
    state: Mutex<Snapshot>,
    events: broadcast::Sender<MarkerEvent>,
}

impl<S: KeyValueStore> MarkerStore<S> {
    /// Creates a store over `storage` using the default `"markers"` slot.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, StoreConfig::default())
    }

    pub fn with_config(storage: S, config: StoreConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            config,
            clock: Arc::new(system_clock_millis),
            state: Mutex::new(Snapshot::default()),
            events,
        }
    }

    /// Replaces the id clock. Intended for deterministic tests.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Subscribes to committed change events.
    ///
    /// Slow receivers may observe `RecvError::Lagged`; they should reload.
    pub fn subscribe(&self) -> broadcast::Receiver<MarkerEvent> {
        self.events.subscribe()
    }

    /// Reads the persisted collection and makes it the current snapshot.
    ///
    /// # Errors
    /// - `StorageRead(Backend)` when the adapter fails; snapshot unchanged.
    /// - `StorageRead(Malformed)` when the payload is not a valid collection.
    ///   The snapshot is then reset to empty so callers can proceed, and the
    ///   next mutation overwrites the unreadable payload.
    pub async fn load(&self) -> StoreResult<Vec<Marker>> {
        let mut state = self.state.lock().await;
        self.reload_locked(&mut state).await?;
        Ok(state.markers.clone())
    }

    /// Creates a marker from editor input and persists the collection.
    ///
    /// # Errors
    /// - `Validation` for blank title/description or a non-finite coordinate.
    /// - `StorageRead` when the implicit first load fails.
    /// - `IdsExhausted` when `i64::MAX` is already in use.
    /// - `StorageWrite` / `Codec` when persisting fails; nothing is committed.
    pub async fn create(
        &self,
        coordinate: Coordinate,
        title: &str,
        description: &str,
    ) -> StoreResult<Marker> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let Some(id) = next_marker_id(
            (self.clock)(),
            state.last_issued_id,
            state.markers.iter().map(|marker| marker.id),
        ) else {
            error!("event=marker_create module=store status=error error_code=ids_exhausted");
            return Err(StoreError::IdsExhausted);
        };
        let marker = Marker::from_input(id, coordinate, title, description)?;

        let mut next = state.markers.clone();
        next.push(marker.clone());
        self.persist(&next, "marker_create").await?;

        state.markers = next;
        state.last_issued_id = Some(id);
        info!(
            "event=marker_create module=store status=ok marker_id={id} count={}",
            state.markers.len()
        );
        self.publish(MarkerEvent::Created(marker.clone()));
        Ok(marker)
    }

    /// Replaces title and description of one marker.
    ///
    /// `id` and `coordinate` are never changed.
    ///
    /// # Errors
    /// - `NotFound` when no marker has `id`.
    /// - `Validation` under the same rules as `create`.
    /// - `StorageWrite` / `Codec` when persisting fails; nothing is committed.
    pub async fn update(
        &self,
        id: MarkerId,
        title: &str,
        description: &str,
    ) -> StoreResult<Marker> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let index = position_of(&state.markers, id).ok_or(StoreError::NotFound(id))?;
        let (title, description) = normalize_text_fields(title, description)?;

        let mut next = state.markers.clone();
        next[index].title = title;
        next[index].description = description;
        let updated = next[index].clone();
        self.persist(&next, "marker_update").await?;

        state.markers = next;
        info!("event=marker_update module=store status=ok marker_id={id}");
        self.publish(MarkerEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// Removes one marker and returns the remaining collection.
    ///
    /// Deleting an unknown id is a no-op: nothing is written and the
    /// unchanged collection is returned.
    pub async fn delete(&self, id: MarkerId) -> StoreResult<Vec<Marker>> {
        let mut state = self.state.lock().await;
        self.ensure_loaded(&mut state).await?;

        let Some(index) = position_of(&state.markers, id) else {
            debug!("event=marker_delete module=store status=skipped reason=not_found marker_id={id}");
            return Ok(state.markers.clone());
        };

        let mut next = state.markers.clone();
        next.remove(index);
        self.persist(&next, "marker_delete").await?;

        state.markers = next;
        info!(
            "event=marker_delete module=store status=ok marker_id={id} count={}",
            state.markers.len()
        );
        self.publish(MarkerEvent::Deleted(id));
        Ok(state.markers.clone())
    }

    /// Deletes the persisted slot and empties the snapshot. Irreversible.
    pub async fn clear(&self) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let started_at = Instant::now();

        if let Err(err) = self.storage.delete(&self.config.slot_key).await {
            error!(
                "event=markers_clear module=store status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(StoreError::StorageWrite(err));
        }

        let removed = state.markers.len();
        state.markers.clear();
        state.loaded = true;
        info!(
            "event=markers_clear module=store status=ok removed={removed} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        self.publish(MarkerEvent::Cleared);
        Ok(())
    }

    /// Looks a marker up in the current snapshot without touching storage.
    pub async fn find(&self, id: MarkerId) -> Option<Marker> {
        let state = self.state.lock().await;
        state.markers.iter().find(|marker| marker.id == id).cloned()
    }

    /// Returns a copy of the current snapshot without touching storage.
    pub async fn markers(&self) -> Vec<Marker> {
        self.state.lock().await.markers.clone()
    }

    async fn ensure_loaded(&self, state: &mut Snapshot) -> StoreResult<()> {
        if state.loaded {
            return Ok(());
        }
        self.reload_locked(state).await
    }

    async fn reload_locked(&self, state: &mut Snapshot) -> StoreResult<()> {
        let started_at = Instant::now();

        let payload = match self.storage.get(&self.config.slot_key).await {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    "event=markers_load module=store status=error error_code=backend duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(StoreError::StorageRead(ReadError::Backend(err)));
            }
        };

        let decoded = match payload {
            Some(bytes) => decode_markers(&bytes),
            None => Ok(Vec::new()),
        };

        state.loaded = true;
        match decoded {
            Ok(markers) => {
                state.markers = markers;
                info!(
                    "event=markers_load module=store status=ok count={} duration_ms={}",
                    state.markers.len(),
                    started_at.elapsed().as_millis()
                );
                self.publish(MarkerEvent::Reloaded {
                    count: state.markers.len(),
                });
                Ok(())
            }
            Err(err) => {
                state.markers.clear();
                warn!(
                    "event=markers_load module=store status=error error_code=malformed_payload duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                self.publish(MarkerEvent::Reloaded { count: 0 });
                Err(StoreError::StorageRead(ReadError::Malformed(err)))
            }
        }
    }

    async fn persist(&self, markers: &[Marker], event: &'static str) -> StoreResult<()> {
        let started_at = Instant::now();
        let bytes = encode_markers(markers).map_err(|err| {
            error!("event={event} module=store status=error error_code=encode_failed error={err}");
            StoreError::Codec(err)
        })?;
        let byte_len = bytes.len();

        self.storage
            .set(&self.config.slot_key, bytes)
            .await
            .map_err(|err| {
                error!(
                    "event={event} module=store status=error error_code=write_failed duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                StoreError::StorageWrite(err)
            })?;

        debug!(
            "event={event} module=store status=persisted bytes={byte_len} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn publish(&self, event: MarkerEvent) {
        // No receivers is the normal case for pull-only editors.
        let _ = self.events.send(event);
    }
}

fn position_of(markers: &[Marker], id: MarkerId) -> Option<usize> {
    markers.iter().position(|marker| marker.id == id)
}
