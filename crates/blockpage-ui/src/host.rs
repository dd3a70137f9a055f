//! Dynamic block host
//!
//! The host owns every live block of the current page in an arena keyed by
//! [`BlockId`]. It loads pages from a [`LayoutStore`], creates blocks through
//! the [`BlockRegistry`] and persists geometry changes.
//!
//! Store calls run as Tokio tasks; their results come back over a channel and
//! are applied by [`BlockHost::poll_responses`] or [`BlockHost::next_response`]
//! on the owner's side. A list response only applies if it belongs to the
//! latest [`BlockHost::load_page`] call. Other responses check that their
//! block is still live.
//!
//! Methods that issue store calls must run inside a Tokio runtime.

use crate::blocks::Block;
use crate::registry::{BlockRegistry, RegistryError};
use blockpage_control::{LayoutStore, StoreError, StoreOperation};
use blockpage_core::{
    BlockId, BlockLayoutRecord, CoreError, DeveloperMode, Geometry, HitZone, IVec2, Surface,
    SurfaceEvent, SurfaceEventKind, SurfaceLinks,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Host errors
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Unknown block type '{0}'")]
    UnknownBlockType(String),

    #[error("No live block with id '{0}'")]
    MissingTarget(BlockId),

    #[error("No block selected")]
    NoTarget,

    #[error("Invalid block geometry: {0}")]
    Geometry(#[from] CoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Things the host reports to its owner
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A list response was applied
    PageLoaded { page: String, count: usize },
    /// A record named a type the registry does not know
    BlockSkipped { id: BlockId, component_type: String },
    /// A block removed itself after the route changed
    BlockDeactivated(BlockId),
    /// A block asked to navigate
    NavigationRequested(String),
    /// A store call failed. For create/update/delete the local state has
    /// already changed and now differs from the stored state.
    PersistFailed {
        id: Option<BlockId>,
        operation: StoreOperation,
        message: String,
    },
    /// A menu intent could not be carried out
    IntentRejected(String),
}

/// Geometry and size defaults for a host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostOptions {
    /// Container the blocks are positioned in
    pub container: IVec2,
    /// Window size relative sizes are measured against
    pub viewport: IVec2,
    /// Where newly added blocks appear
    pub default_position: IVec2,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            container: IVec2::new(1920, 1080),
            viewport: IVec2::new(1920, 1080),
            default_position: IVec2::new(10, 10),
        }
    }
}

/// Completed store call
#[derive(Debug)]
enum StoreResponse {
    Listed {
        generation: u64,
        page: String,
        result: Result<Vec<BlockLayoutRecord>, StoreError>,
    },
    Created {
        id: BlockId,
        result: Result<BlockLayoutRecord, StoreError>,
    },
    Updated {
        id: BlockId,
        result: Result<BlockLayoutRecord, StoreError>,
    },
    Deleted {
        id: BlockId,
        result: Result<(), StoreError>,
    },
}

/// Work held back until a create resolves
#[derive(Debug, Default)]
struct PendingCreate {
    deleted: bool,
    dirty: Option<BlockLayoutRecord>,
}

/// One live block
#[derive(Debug)]
pub struct BlockInstance {
    record: BlockLayoutRecord,
    surface: Surface,
    block: Box<dyn Block>,
    order: u64,
}

impl BlockInstance {
    pub fn id(&self) -> &BlockId {
        &self.record.uuid
    }

    /// Registry tag
    pub fn kind(&self) -> &str {
        &self.record.component_type
    }

    pub fn page_path(&self) -> &str {
        &self.record.page_path
    }

    /// Current geometry (may differ from the last persisted one mid-gesture)
    pub fn geometry(&self) -> Geometry {
        self.surface.geometry()
    }

    /// Layout record reflecting the current geometry
    pub fn record(&self) -> BlockLayoutRecord {
        let mut record = self.record.clone();
        record.set_geometry(self.surface.geometry());
        record
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn block(&self) -> &dyn Block {
        self.block.as_ref()
    }

    fn destroy(&mut self) {
        self.block.detach();
        self.surface.teardown();
    }
}

/// Owner of the live blocks of one page
pub struct BlockHost<S: LayoutStore> {
    store: Arc<S>,
    registry: BlockRegistry,
    dev_mode: DeveloperMode,
    route: watch::Receiver<String>,
    options: HostOptions,

    active_page: Option<String>,
    generation: u64,
    loading: bool,

    instances: HashMap<BlockId, BlockInstance>,
    next_order: u64,

    surface_tx: Sender<SurfaceEvent>,
    surface_rx: Receiver<SurfaceEvent>,
    response_tx: mpsc::UnboundedSender<StoreResponse>,
    response_rx: mpsc::UnboundedReceiver<StoreResponse>,
    in_flight: usize,

    pending_creates: HashMap<BlockId, PendingCreate>,
    events: Vec<HostEvent>,
}

impl<S: LayoutStore> BlockHost<S> {
    /// Create a host. Surfaces follow `dev_mode` and deactivate when `route`
    /// leaves their page.
    pub fn new(
        store: Arc<S>,
        registry: BlockRegistry,
        dev_mode: DeveloperMode,
        route: watch::Receiver<String>,
        options: HostOptions,
    ) -> Self {
        let (surface_tx, surface_rx) = unbounded();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        Self {
            store,
            registry,
            dev_mode,
            route,
            options,
            active_page: None,
            generation: 0,
            loading: false,
            instances: HashMap::new(),
            next_order: 0,
            surface_tx,
            surface_rx,
            response_tx,
            response_rx,
            in_flight: 0,
            pending_creates: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn options(&self) -> HostOptions {
        self.options
    }

    /// Page of the latest load
    pub fn active_page(&self) -> Option<&str> {
        self.active_page.as_deref()
    }

    /// True until the latest load's response is applied
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Store calls whose responses have not been applied yet
    pub fn pending_requests(&self) -> usize {
        self.in_flight
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.instances.contains_key(id)
    }

    pub fn instance(&self, id: &BlockId) -> Option<&BlockInstance> {
        self.instances.get(id)
    }

    /// Live blocks, bottom to top
    pub fn instances(&self) -> Vec<&BlockInstance> {
        let mut live: Vec<_> = self.instances.values().collect();
        live.sort_by_key(|inst| inst.order);
        live
    }

    /// Ids of the live blocks, bottom to top
    pub fn ids(&self) -> Vec<BlockId> {
        self.instances().into_iter().map(|i| i.id().clone()).collect()
    }

    /// Take the events reported since the last call
    pub fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Topmost live block under `point`, with the zone that was hit
    pub fn block_at(&self, point: IVec2) -> Option<(BlockId, HitZone)> {
        self.instances
            .values()
            .filter(|inst| inst.surface.is_active())
            .filter_map(|inst| {
                inst.surface
                    .hit_zone(point)
                    .map(|zone| (inst.order, inst.id(), zone))
            })
            .max_by_key(|(order, _, _)| *order)
            .map(|(_, id, zone)| (id.clone(), zone))
    }

    /// Replace the live set with the blocks stored for `page`.
    ///
    /// Any earlier load still in flight is superseded; its response is dropped.
    pub fn load_page(&mut self, page: &str) {
        // Commits made before navigating still get persisted
        self.flush_surface_events();
        self.clear();

        self.generation += 1;
        self.active_page = Some(page.to_string());
        self.loading = true;
        info!("Loading page {} (load #{})", page, self.generation);

        let generation = self.generation;
        let page = page.to_string();
        let store = Arc::clone(&self.store);
        self.spawn_request(async move {
            let result = store.list_by_page_path(&page).await;
            StoreResponse::Listed {
                generation,
                page,
                result,
            }
        });
    }

    /// Add a new block of type `kind` to `page` and persist it.
    ///
    /// The block is live immediately; a failed create leaves it in place and
    /// reports [`HostEvent::PersistFailed`].
    pub fn add_block(&mut self, kind: &str, page: &str) -> Result<BlockId, HostError> {
        let spec = self
            .registry
            .get(kind)
            .ok_or_else(|| HostError::UnknownBlockType(kind.to_string()))?;

        let id = BlockId::generate();
        let geometry = Geometry {
            position: self.options.default_position,
            size: spec.default_size,
        };
        let record = BlockLayoutRecord::new(id.clone(), page, kind, geometry);
        self.spawn_instance(record.clone())?;
        self.pending_creates.insert(id.clone(), PendingCreate::default());
        info!("Added {} '{}' on {}", kind, id, page);

        let store = Arc::clone(&self.store);
        let create_id = id.clone();
        self.spawn_request(async move {
            StoreResponse::Created {
                id: create_id,
                result: store.create(record).await,
            }
        });
        Ok(id)
    }

    /// Remove a live block and delete its record
    pub fn delete_block(&mut self, id: &BlockId) -> Result<(), HostError> {
        let mut instance = self
            .instances
            .remove(id)
            .ok_or_else(|| HostError::MissingTarget(id.clone()))?;
        instance.destroy();
        info!("Deleted block '{}'", id);

        if let Some(pending) = self.pending_creates.get_mut(id) {
            debug!("Create of '{}' still in flight, deferring delete", id);
            pending.deleted = true;
            pending.dirty = None;
            return Ok(());
        }
        self.spawn_delete(id.clone());
        Ok(())
    }

    /// Move/resize a live block programmatically and persist the result
    pub fn set_block_geometry(&mut self, id: &BlockId, geometry: Geometry) -> Result<(), HostError> {
        geometry.validate()?;
        let instance = self
            .instances
            .get_mut(id)
            .ok_or_else(|| HostError::MissingTarget(id.clone()))?;
        instance.surface.apply_geometry(geometry);
        let record = instance.record();
        self.persist_update(record);
        Ok(())
    }

    /// Update the viewport of every live block
    pub fn set_viewport(&mut self, viewport: IVec2) {
        self.options.viewport = viewport;
        for instance in self.instances.values_mut() {
            instance.surface.set_viewport(viewport);
            instance.block.update();
        }
    }

    /// Pointer pressed: start a gesture on the topmost block under `point`
    pub fn pointer_down(&mut self, point: IVec2) -> Option<BlockId> {
        let (id, zone) = self.block_at(point)?;
        let instance = self.instances.get_mut(&id)?;
        instance.surface.pointer_down(point, zone).then_some(id)
    }

    /// Pointer moved (document level): every block with a gesture follows
    pub fn pointer_move(&mut self, point: IVec2) -> bool {
        let mut changed = false;
        for instance in self.instances.values_mut() {
            if instance.surface.pointer_move(point) {
                instance.block.update();
                changed = true;
            }
        }
        changed
    }

    /// Pointer released (document level): end every gesture and persist
    pub fn pointer_up(&mut self) {
        for instance in self.instances.values_mut() {
            instance.surface.pointer_up();
        }
        self.process_surface_events();
    }

    /// Plain click at `point`. Returns the redirect target, if any.
    pub fn click(&mut self, point: IVec2) -> Option<String> {
        let (id, _) = self.block_at(point)?;
        let target = self.instances.get_mut(&id)?.surface.click();
        self.process_surface_events();
        target
    }

    /// Sync surfaces with mode and route, then act on their signals
    pub fn process_surface_events(&mut self) {
        for instance in self.instances.values_mut() {
            instance.surface.sync();
            instance.block.update();
        }
        self.flush_surface_events();
    }

    fn flush_surface_events(&mut self) {
        while let Ok(SurfaceEvent { id, kind }) = self.surface_rx.try_recv() {
            match kind {
                SurfaceEventKind::GeometryCommitted(geometry) => {
                    let Some(instance) = self.instances.get(&id) else {
                        debug!("Dropping commit from removed block '{}'", id);
                        continue;
                    };
                    let mut record = instance.record();
                    record.set_geometry(geometry);
                    self.persist_update(record);
                }
                SurfaceEventKind::Deactivated => {
                    if let Some(mut instance) = self.instances.remove(&id) {
                        instance.destroy();
                        debug!("Block '{}' left the live set", id);
                        self.events.push(HostEvent::BlockDeactivated(id));
                    }
                }
                SurfaceEventKind::NavigationRequested(target) => {
                    self.events.push(HostEvent::NavigationRequested(target));
                }
            }
        }
    }

    /// Apply every store response that has arrived. Returns how many.
    pub fn poll_responses(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(response) = self.response_rx.try_recv() {
            self.apply_response(response);
            applied += 1;
        }
        applied
    }

    /// Wait for the next store response and apply it.
    ///
    /// Returns false immediately when nothing is in flight.
    pub async fn next_response(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.response_rx.recv().await {
            Some(response) => {
                self.apply_response(response);
                self.process_surface_events();
                true
            }
            None => false,
        }
    }

    /// Wait until every store call, including follow-ups, has been applied
    pub async fn settle(&mut self) {
        while self.next_response().await {}
    }

    /// Drop every live block
    pub fn clear(&mut self) {
        for (_, mut instance) in self.instances.drain() {
            instance.destroy();
        }
    }

    fn spawn_instance(&mut self, record: BlockLayoutRecord) -> Result<(), HostError> {
        let spec = self
            .registry
            .get(&record.component_type)
            .ok_or_else(|| HostError::UnknownBlockType(record.component_type.clone()))?;

        let links = SurfaceLinks {
            dev_mode: Some(self.dev_mode.watch()),
            route: Some(self.route.clone()),
            events: Some(self.surface_tx.clone()),
        };
        let config = spec.surface_config(record.geometry(), &record.page_path);
        let mut surface = Surface::new(record.uuid.clone(), config, self.options.container, links)?;
        // Stored pixels are authoritative; lengths only round-trip exactly below 2^24
        surface.apply_geometry(record.geometry());
        surface.set_viewport(self.options.viewport);

        let mut block = spec.instantiate();
        block.attach(&mut surface);

        let order = self.next_order;
        self.next_order += 1;
        self.instances.insert(
            record.uuid.clone(),
            BlockInstance {
                record,
                surface,
                block,
                order,
            },
        );
        Ok(())
    }

    fn persist_update(&mut self, record: BlockLayoutRecord) {
        if let Some(pending) = self.pending_creates.get_mut(&record.uuid) {
            debug!("Create of '{}' still in flight, deferring update", record.uuid);
            pending.dirty = Some(record);
            return;
        }
        self.spawn_update(record);
    }

    fn spawn_update(&mut self, record: BlockLayoutRecord) {
        let store = Arc::clone(&self.store);
        let id = record.uuid.clone();
        self.spawn_request(async move {
            StoreResponse::Updated {
                id,
                result: store.update_by_uuid(record).await,
            }
        });
    }

    fn spawn_delete(&mut self, id: BlockId) {
        let store = Arc::clone(&self.store);
        self.spawn_request(async move {
            let result = store.delete_by_uuid(&id).await;
            StoreResponse::Deleted { id, result }
        });
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: Future<Output = StoreResponse> + Send + 'static,
    {
        let tx = self.response_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            // The host may be gone by now
            let _ = tx.send(request.await);
        });
    }

    fn apply_response(&mut self, response: StoreResponse) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match response {
            StoreResponse::Listed {
                generation,
                page,
                result,
            } => {
                if generation != self.generation {
                    debug!(
                        "Dropping stale list of {} (load #{}, current #{})",
                        page, generation, self.generation
                    );
                    return;
                }
                self.loading = false;
                match result {
                    Ok(records) => self.populate(page, records),
                    Err(e) => {
                        warn!("Failed to load page {}: {}", page, e);
                        self.report_failure(None, StoreOperation::List, &e);
                    }
                }
            }
            StoreResponse::Created { id, result } => {
                let pending = self.pending_creates.remove(&id).unwrap_or_default();
                match result {
                    Ok(_) => {
                        debug!("Create of '{}' stored", id);
                        if pending.deleted {
                            self.spawn_delete(id);
                        } else if let Some(record) = pending.dirty {
                            let record = self
                                .instances
                                .get(&id)
                                .map(BlockInstance::record)
                                .unwrap_or(record);
                            self.spawn_update(record);
                        }
                    }
                    Err(e) => {
                        if pending.deleted {
                            // Nothing was stored and the block is gone; no divergence
                            debug!("Create of deleted block '{}' failed: {}", id, e);
                        } else {
                            warn!("Create of '{}' failed, block kept locally: {}", id, e);
                            self.report_failure(Some(id), StoreOperation::Create, &e);
                        }
                    }
                }
            }
            StoreResponse::Updated { id, result } => match result {
                Ok(_) if self.instances.contains_key(&id) => debug!("Update of '{}' stored", id),
                Ok(_) => debug!("Update of '{}' stored after it left the live set", id),
                Err(e) => {
                    warn!("Update of '{}' failed: {}", id, e);
                    self.report_failure(Some(id), StoreOperation::Update, &e);
                }
            },
            StoreResponse::Deleted { id, result } => match result {
                Ok(()) => debug!("Delete of '{}' stored", id),
                Err(e) => {
                    warn!("Delete of '{}' failed: {}", id, e);
                    self.report_failure(Some(id), StoreOperation::Delete, &e);
                }
            },
        }
    }

    fn populate(&mut self, page: String, records: Vec<BlockLayoutRecord>) {
        let mut count = 0;
        for record in records {
            if record.page_path != page {
                warn!(
                    "Skipping '{}': listed for {} but bound to {}",
                    record.uuid, page, record.page_path
                );
                continue;
            }
            if self.instances.contains_key(&record.uuid) {
                warn!("Skipping duplicate block '{}'", record.uuid);
                continue;
            }

            let id = record.uuid.clone();
            let component_type = record.component_type.clone();
            match self.spawn_instance(record) {
                Ok(()) => count += 1,
                Err(HostError::UnknownBlockType(_)) => {
                    warn!("Skipping '{}': unknown block type '{}'", id, component_type);
                    self.events.push(HostEvent::BlockSkipped { id, component_type });
                }
                Err(e) => warn!("Skipping '{}': {}", id, e),
            }
        }
        info!("Loaded {} block(s) on {}", count, page);
        self.events.push(HostEvent::PageLoaded { page, count });
    }

    fn report_failure(&mut self, id: Option<BlockId>, operation: StoreOperation, error: &StoreError) {
        self.events.push(HostEvent::PersistFailed {
            id,
            operation,
            message: error.to_string(),
        });
    }
}

impl<S: LayoutStore> Drop for BlockHost<S> {
    fn drop(&mut self) {
        self.clear();
    }
}
