//! Positionable surface: the drag/resize state machine behind every block
//!
//! A [`Surface`] owns the geometry of one block and turns pointer input into
//! position and size changes. Gestures only start while developer mode is on,
//! and switching developer mode off aborts a gesture in progress.
//!
//! ```text
//!            pointer-down (body)            pointer-up / mode off
//!   Idle ───────────────────────▶ Dragging ─────────────────────────▶ Idle
//!     │   pointer-down (handle)             pointer-up / mode off
//!     └─────────────────────────▶ Resizing ─────────────────────────▶ Idle
//! ```
//!
//! Signals leave the surface through channels handed in via [`SurfaceLinks`];
//! [`Surface::teardown`] drops every one of them.

use crate::dev_mode::DeveloperModeWatch;
use crate::geometry::{Geometry, Length, RelativeSize, SizeObservation};
use crate::record::BlockId;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, trace};

/// Edge length of the square resize handle in the bottom-right corner
pub const RESIZE_HANDLE_SIZE: i32 = 12;

/// Which part of a surface a pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    /// Anywhere except the resize handle
    Body,
    /// The bottom-right resize handle
    ResizeHandle,
}

/// Initial inputs of a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Initial left offset
    pub left: Length,
    /// Initial top offset
    pub top: Length,
    /// Initial width
    pub width: Length,
    /// Initial height
    pub height: Length,
    /// Width floor for resize gestures
    pub min_width: Length,
    /// Height floor for resize gestures
    pub min_height: Length,
    /// Whether the body can be dragged
    pub draggable: bool,
    /// Whether the handle can resize
    pub resizable: bool,
    /// Navigation target for plain clicks outside developer mode (empty = none)
    #[serde(default)]
    pub redirect_url: String,
    /// Page this surface belongs to
    pub page_path: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            left: Length::Percent(0.0),
            top: Length::Percent(0.0),
            width: Length::Px(200.0),
            height: Length::Px(150.0),
            min_width: Length::Px(50.0),
            min_height: Length::Px(50.0),
            draggable: true,
            resizable: true,
            redirect_url: String::new(),
            page_path: "/home".to_string(),
        }
    }
}

impl SurfaceConfig {
    /// Config placing the surface at an absolute geometry on a page
    pub fn at(geometry: Geometry, page_path: impl Into<String>) -> Self {
        Self {
            left: Length::Px(geometry.x() as f32),
            top: Length::Px(geometry.y() as f32),
            width: Length::Px(geometry.width() as f32),
            height: Length::Px(geometry.height() as f32),
            page_path: page_path.into(),
            ..Default::default()
        }
    }

    /// Set the minimum size
    pub fn with_min_size(mut self, min_width: Length, min_height: Length) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    /// Set the drag/resize capabilities
    pub fn with_capabilities(mut self, draggable: bool, resizable: bool) -> Self {
        self.draggable = draggable;
        self.resizable = resizable;
        self
    }

    /// Set the click redirect target
    pub fn with_redirect(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = url.into();
        self
    }
}

/// Channels a surface talks through
#[derive(Debug, Default)]
pub struct SurfaceLinks {
    /// Developer-mode subscription (gestures never start without it)
    pub dev_mode: Option<DeveloperModeWatch>,
    /// Active route subscription, used for self-deactivation
    pub route: Option<watch::Receiver<String>>,
    /// Outgoing signal channel
    pub events: Option<Sender<SurfaceEvent>>,
}

/// Signal emitted by a surface
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEvent {
    /// Emitting surface
    pub id: BlockId,
    /// What happened
    pub kind: SurfaceEventKind,
}

/// Kinds of surface signals
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEventKind {
    /// A drag or resize ended with changed geometry
    GeometryCommitted(Geometry),
    /// The active route no longer matches the surface's page
    Deactivated,
    /// A click asked to navigate elsewhere
    NavigationRequested(String),
}

/// Pointer gesture state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    /// No gesture
    #[default]
    Idle,
    /// Moving the surface
    Dragging {
        /// Pointer position at gesture start
        origin: IVec2,
        /// Surface position at gesture start
        start: IVec2,
    },
    /// Resizing the surface
    Resizing {
        /// Pointer position at gesture start
        origin: IVec2,
        /// Surface size at gesture start
        start: IVec2,
    },
}

/// A draggable, resizable rectangle bound to one block
#[derive(Debug)]
pub struct Surface {
    id: BlockId,
    config: SurfaceConfig,
    geometry: Geometry,
    min_size: IVec2,
    container: IVec2,
    viewport: IVec2,
    relative_size: RelativeSize,
    gesture: GestureState,
    gesture_start: Geometry,
    developer_mode: bool,
    dev_mode: Option<DeveloperModeWatch>,
    route: Option<watch::Receiver<String>>,
    events: Option<Sender<SurfaceEvent>>,
    size_watchers: Vec<Sender<SizeObservation>>,
    deactivated: bool,
    torn_down: bool,
}

impl Surface {
    /// Create a surface and resolve its initial geometry against `container`.
    ///
    /// The viewport starts out equal to the container; see [`Surface::set_viewport`].
    pub fn new(
        id: BlockId,
        config: SurfaceConfig,
        container: IVec2,
        links: SurfaceLinks,
    ) -> Result<Self> {
        let SurfaceLinks {
            mut dev_mode,
            mut route,
            events,
        } = links;

        let developer_mode = dev_mode.as_mut().map_or(false, |watch| {
            watch.poll_change();
            watch.is_on()
        });
        if let Some(route) = route.as_mut() {
            route.borrow_and_update();
        }

        let mut surface = Self {
            id,
            geometry: Geometry::default(),
            min_size: IVec2::ZERO,
            container,
            viewport: container,
            relative_size: RelativeSize::default(),
            gesture: GestureState::Idle,
            gesture_start: Geometry::default(),
            developer_mode,
            dev_mode,
            route,
            events,
            size_watchers: Vec::new(),
            deactivated: false,
            torn_down: false,
            config,
        };
        surface.apply_config(surface.config.clone())?;
        Ok(surface)
    }

    /// Block identifier
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// Page this surface is bound to
    pub fn page_path(&self) -> &str {
        &self.config.page_path
    }

    /// Current inputs
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Current geometry
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Resolved minimum size
    pub fn min_size(&self) -> IVec2 {
        self.min_size
    }

    /// Current gesture
    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// True while dragging
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, GestureState::Dragging { .. })
    }

    /// True while resizing
    pub fn is_resizing(&self) -> bool {
        matches!(self.gesture, GestureState::Resizing { .. })
    }

    /// Last observed developer-mode value
    pub fn developer_mode(&self) -> bool {
        self.developer_mode
    }

    /// Container size relative to the viewport
    pub fn relative_size(&self) -> RelativeSize {
        self.relative_size
    }

    /// False once deactivated or torn down
    pub fn is_active(&self) -> bool {
        !self.deactivated && !self.torn_down
    }

    /// Re-apply inputs: resolve lengths against the container and set geometry.
    pub fn apply_config(&mut self, config: SurfaceConfig) -> Result<()> {
        let geometry = Geometry::new(
            config.left.resolve(self.container.x),
            config.top.resolve(self.container.y),
            config.width.resolve(self.container.x),
            config.height.resolve(self.container.y),
        );
        geometry.validate()?;
        self.min_size = IVec2::new(
            config.min_width.resolve(self.container.x),
            config.min_height.resolve(self.container.y),
        );
        self.config = config;
        self.apply_geometry(geometry);
        Ok(())
    }

    /// Set position and size directly
    pub fn apply_geometry(&mut self, geometry: Geometry) {
        let size_changed = geometry.size != self.geometry.size;
        self.geometry = geometry;
        if size_changed {
            self.observe_size(false);
        }
    }

    /// Update the viewport and recompute the relative size
    pub fn set_viewport(&mut self, viewport: IVec2) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.observe_size(true);
        }
    }

    /// Record a size imposed by external layout and recompute the relative size
    pub fn observe_rendered_size(&mut self, size: IVec2) {
        if size != self.geometry.size {
            self.geometry.size = size;
            self.observe_size(false);
        }
    }

    /// Current size observation
    pub fn size_observation(&self) -> SizeObservation {
        SizeObservation {
            relative: self.relative_size,
            viewport: self.viewport,
        }
    }

    /// Subscribe to size observations; the current value is sent immediately
    pub fn subscribe_size(&mut self) -> Receiver<SizeObservation> {
        let (tx, rx) = unbounded();
        let _ = tx.send(self.size_observation());
        if !self.torn_down {
            self.size_watchers.push(tx);
        }
        rx
    }

    /// Number of live size subscribers
    pub fn size_watcher_count(&self) -> usize {
        self.size_watchers.len()
    }

    /// Which zone of the surface a point falls in, if any
    pub fn hit_zone(&self, point: IVec2) -> Option<HitZone> {
        if !self.geometry.contains(point) {
            return None;
        }
        let max = self.geometry.max();
        let handle = self.geometry.size.min(IVec2::splat(RESIZE_HANDLE_SIZE));
        if point.x >= max.x - handle.x && point.y >= max.y - handle.y {
            Some(HitZone::ResizeHandle)
        } else {
            Some(HitZone::Body)
        }
    }

    /// Pull pending developer-mode and route changes.
    ///
    /// Any developer-mode change aborts the current gesture: a gesture only runs
    /// while the flag is on, so a change means it went off at least once. A
    /// route that no longer matches the bound page deactivates the surface.
    pub fn sync(&mut self) {
        if self.torn_down {
            return;
        }

        if let Some(on) = self.dev_mode.as_mut().and_then(|w| w.poll_change()) {
            self.developer_mode = on;
            if self.gesture != GestureState::Idle {
                debug!("Developer mode flipped, aborting gesture on {}", self.id);
                self.finish_gesture();
            }
        }

        let route_changed = self
            .route
            .as_mut()
            .map_or(false, |route| route.has_changed().unwrap_or(false));
        if route_changed {
            let current = self
                .route
                .as_mut()
                .map(|route| route.borrow_and_update().clone())
                .unwrap_or_default();
            if current != self.config.page_path && !self.deactivated {
                debug!(
                    "Route {} does not match {} for {}, deactivating",
                    current, self.config.page_path, self.id
                );
                self.deactivated = true;
                self.finish_gesture();
                self.emit(SurfaceEventKind::Deactivated);
            }
        }
    }

    /// Pointer pressed over `zone` at `point`. Returns true if a gesture started.
    pub fn pointer_down(&mut self, point: IVec2, zone: HitZone) -> bool {
        self.sync();
        if !self.is_active() || !self.developer_mode || self.gesture != GestureState::Idle {
            return false;
        }

        match zone {
            HitZone::Body if self.config.draggable => {
                self.gesture = GestureState::Dragging {
                    origin: point,
                    start: self.geometry.position,
                };
            }
            HitZone::ResizeHandle if self.config.resizable => {
                self.gesture = GestureState::Resizing {
                    origin: point,
                    start: self.geometry.size,
                };
            }
            _ => return false,
        }
        self.gesture_start = self.geometry;
        debug!("Gesture started on {}: {:?}", self.id, self.gesture);
        true
    }

    /// Pointer moved to `point`. Returns true if the geometry changed.
    pub fn pointer_move(&mut self, point: IVec2) -> bool {
        self.sync();
        if !self.developer_mode {
            return false;
        }

        match self.gesture {
            GestureState::Idle => false,
            GestureState::Dragging { origin, start } => {
                let position = start.saturating_add(point.saturating_sub(origin));
                if position == self.geometry.position {
                    return false;
                }
                trace!("Dragging {} to {:?}", self.id, position);
                self.geometry.position = position;
                true
            }
            GestureState::Resizing { origin, start } => {
                let candidate = start.saturating_add(point.saturating_sub(origin));
                let mut size = self.geometry.size;
                if candidate.x > self.min_size.x {
                    size.x = candidate.x;
                }
                if candidate.y > self.min_size.y {
                    size.y = candidate.y;
                }
                if size == self.geometry.size {
                    return false;
                }
                trace!("Resizing {} to {:?}", self.id, size);
                self.geometry.size = size;
                self.observe_size(false);
                true
            }
        }
    }

    /// Pointer released. Returns the committed geometry if a gesture changed it.
    pub fn pointer_up(&mut self) -> Option<Geometry> {
        self.sync();
        if self.gesture == GestureState::Idle {
            return None;
        }
        self.finish_gesture()
    }

    /// Plain click. Returns the redirect target if navigation was requested.
    pub fn click(&mut self) -> Option<String> {
        self.sync();
        if !self.is_active() || self.developer_mode {
            return None;
        }
        let target = self.config.redirect_url.trim();
        if target.is_empty() {
            return None;
        }
        let target = target.to_string();
        debug!("Redirect from {} to {}", self.id, target);
        self.emit(SurfaceEventKind::NavigationRequested(target.clone()));
        Some(target)
    }

    /// Release every subscription and sender held by this surface
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.gesture = GestureState::Idle;
        self.dev_mode = None;
        self.route = None;
        self.events = None;
        self.size_watchers.clear();
        self.torn_down = true;
        trace!("Surface {} torn down", self.id);
    }

    fn finish_gesture(&mut self) -> Option<Geometry> {
        self.gesture = GestureState::Idle;
        if self.geometry == self.gesture_start {
            return None;
        }
        self.gesture_start = self.geometry;
        debug!("Geometry committed for {}: {}", self.id, self.geometry);
        self.emit(SurfaceEventKind::GeometryCommitted(self.geometry));
        Some(self.geometry)
    }

    fn observe_size(&mut self, viewport_changed: bool) {
        let relative = RelativeSize::of(self.geometry.size, self.viewport);
        if relative == self.relative_size && !viewport_changed {
            return;
        }
        self.relative_size = relative;
        let observation = self.size_observation();
        self.size_watchers.retain(|tx| tx.send(observation).is_ok());
    }

    fn emit(&self, kind: SurfaceEventKind) {
        if let Some(tx) = &self.events {
            if tx
                .send(SurfaceEvent {
                    id: self.id.clone(),
                    kind,
                })
                .is_err()
            {
                trace!("Surface {} has no listener", self.id);
            }
        }
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.teardown();
    }
}
