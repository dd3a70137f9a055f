//! Editor session
//!
//! Wires the route, developer mode, context menu and block host together.
//! Input arrives as [`EditorAction`]s; each one is applied and then the
//! session is pumped so that menu intents, redirects and store responses take
//! effect.

use crate::config::EditorConfig;
use crate::coordinator::{MenuIntent, ModeCoordinator};
use crate::host::{BlockHost, HostError, HostEvent};
use crate::registry::BlockRegistry;
use crate::EditorAction;
use blockpage_control::LayoutStore;
use blockpage_core::{BlockId, DeveloperMode, IVec2};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// One editing session over a layout store
pub struct Editor<S: LayoutStore> {
    host: BlockHost<S>,
    coordinator: ModeCoordinator,
    intents: Receiver<MenuIntent>,
    route: watch::Sender<String>,
}

impl<S: LayoutStore> Editor<S> {
    /// Create a session. Nothing is loaded until [`Editor::navigate`].
    pub fn new(store: Arc<S>, registry: BlockRegistry, config: &EditorConfig) -> Self {
        let dev_mode = DeveloperMode::new(config.developer_mode);
        let (route, route_rx) = watch::channel(String::new());
        let (coordinator, intents) = ModeCoordinator::new(dev_mode.clone(), registry.kinds());
        let host = BlockHost::new(store, registry, dev_mode, route_rx, config.host_options());
        Self {
            host,
            coordinator,
            intents,
            route,
        }
    }

    pub fn host(&self) -> &BlockHost<S> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut BlockHost<S> {
        &mut self.host
    }

    pub fn coordinator(&self) -> &ModeCoordinator {
        &self.coordinator
    }

    /// Active route
    pub fn current_route(&self) -> String {
        self.route.borrow().clone()
    }

    /// Publish `path` as the active route and load its blocks
    pub fn navigate(&mut self, path: &str) {
        info!("Navigating to {}", path);
        self.route.send_replace(path.to_string());
        self.host.load_page(path);
    }

    /// Apply one input and pump. Returns the host events it produced.
    pub fn apply(&mut self, action: EditorAction) -> Vec<HostEvent> {
        match action {
            EditorAction::Navigate { path } => self.navigate(&path),
            EditorAction::ToggleDeveloperMode => {
                self.coordinator.toggle_developer_mode();
            }
            EditorAction::SetDeveloperMode { on } => self.coordinator.set_developer_mode(on),
            EditorAction::PointerDown { at } => {
                self.coordinator.document_click();
                self.host.pointer_down(at);
            }
            EditorAction::PointerMove { at } => {
                self.host.pointer_move(at);
            }
            EditorAction::PointerUp => self.host.pointer_up(),
            EditorAction::Click { at } => {
                self.coordinator.document_click();
                self.host.click(at);
            }
            EditorAction::ContextMenu { at } => self.right_click(at),
            EditorAction::MenuAdd { kind } => {
                self.coordinator.choose_add(&kind);
            }
            EditorAction::MenuDelete => {
                self.coordinator.choose_delete();
            }
            EditorAction::DocumentClick => self.coordinator.document_click(),
            EditorAction::ResizeViewport { size } => self.host.set_viewport(size),
        }
        self.pump()
    }

    /// Right-click at `at`: opens the menu targeting the block under the cursor
    pub fn right_click(&mut self, at: IVec2) {
        let target = self.host.block_at(at).map(|(id, _)| id);
        self.coordinator.right_click(at, target);
    }

    /// Carry out menu intents, apply arrived store responses and follow
    /// redirects. Returns the host events since the last pump.
    pub fn pump(&mut self) -> Vec<HostEvent> {
        self.host.process_surface_events();
        self.host.poll_responses();

        let mut rejected = Vec::new();
        while let Ok(intent) = self.intents.try_recv() {
            if let Err(e) = self.handle_intent(intent) {
                warn!("Menu action failed: {}", e);
                rejected.push(HostEvent::IntentRejected(e.to_string()));
            }
        }

        let mut events = self.host.drain_events();
        let redirect = events.iter().rev().find_map(|event| match event {
            HostEvent::NavigationRequested(target) => Some(target.clone()),
            _ => None,
        });
        if let Some(target) = redirect {
            self.navigate(&target);
            events.extend(self.host.drain_events());
        }
        events.extend(rejected);
        events
    }

    /// Wait for every outstanding store call and pump after each one
    pub async fn settle(&mut self) -> Vec<HostEvent> {
        let mut events = self.pump();
        while self.host.next_response().await {
            events.extend(self.pump());
        }
        events
    }

    fn handle_intent(&mut self, intent: MenuIntent) -> Result<Option<BlockId>, HostError> {
        match intent {
            MenuIntent::AddRequested(kind) => {
                let page = self.current_route();
                self.host.add_block(&kind, &page).map(Some)
            }
            MenuIntent::DeleteRequested(Some(id)) => self.host.delete_block(&id).map(|_| None),
            MenuIntent::DeleteRequested(None) => Err(HostError::NoTarget),
        }
    }
}
