//! Developer mode and the editing context menu
//!
//! The [`ModeCoordinator`] owns the process-wide [`DeveloperMode`] flag and
//! the [`ContextMenu`]. Menu choices leave as [`MenuIntent`]s on a channel;
//! the editor forwards them to the block host.

use blockpage_core::{BlockId, DeveloperMode, DeveloperModeWatch, IVec2};
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

/// Request raised from the context menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuIntent {
    /// Add a block of this type to the current page
    AddRequested(String),
    /// Delete the block the menu was opened on (if any)
    DeleteRequested(Option<BlockId>),
}

/// Right-click menu listing the available block types
#[derive(Debug)]
pub struct ContextMenu {
    open: bool,
    position: IVec2,
    target: Option<BlockId>,
    available: Vec<String>,
    intents: Sender<MenuIntent>,
}

impl ContextMenu {
    /// Menu offering `available` block types. Returns the intent receiver.
    pub fn new(available: Vec<String>) -> (Self, Receiver<MenuIntent>) {
        let (intents, rx) = unbounded();
        (
            Self {
                open: false,
                position: IVec2::ZERO,
                target: None,
                available,
                intents,
            },
            rx,
        )
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Cursor position captured on open
    pub fn position(&self) -> IVec2 {
        self.position
    }

    /// Block under the cursor when the menu opened
    pub fn target(&self) -> Option<&BlockId> {
        self.target.as_ref()
    }

    /// Block types shown in the menu
    pub fn available_components(&self) -> &[String] {
        &self.available
    }

    /// Open at `position`, remembering the block under the cursor
    pub fn open_at(&mut self, position: IVec2, target: Option<BlockId>) {
        debug!("Context menu at {:?} (target {:?})", position, target);
        self.open = true;
        self.position = position;
        self.target = target;
    }

    /// Pick "add <kind>". Returns false if the menu is closed or the type is not offered.
    pub fn choose_add(&mut self, kind: &str) -> bool {
        if !self.open || !self.available.iter().any(|k| k == kind) {
            return false;
        }
        self.emit(MenuIntent::AddRequested(kind.to_string()));
        self.close();
        true
    }

    /// Pick "delete". Returns false if the menu is closed.
    pub fn choose_delete(&mut self) -> bool {
        if !self.open {
            return false;
        }
        let target = self.target.take();
        self.emit(MenuIntent::DeleteRequested(target));
        self.close();
        true
    }

    /// Any click elsewhere in the document dismisses the menu
    pub fn document_click(&mut self) {
        if self.open {
            self.close();
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.target = None;
    }

    fn emit(&self, intent: MenuIntent) {
        if self.intents.send(intent).is_err() {
            debug!("No one listens to menu intents");
        }
    }
}

/// Developer-mode flag plus the context menu it gates
#[derive(Debug)]
pub struct ModeCoordinator {
    dev_mode: DeveloperMode,
    menu: ContextMenu,
}

impl ModeCoordinator {
    /// Coordinator offering `available` block types in its menu
    pub fn new(dev_mode: DeveloperMode, available: Vec<String>) -> (Self, Receiver<MenuIntent>) {
        let (menu, intents) = ContextMenu::new(available);
        (Self { dev_mode, menu }, intents)
    }

    /// Shared flag handle
    pub fn developer_mode(&self) -> &DeveloperMode {
        &self.dev_mode
    }

    pub fn is_developer_mode(&self) -> bool {
        self.dev_mode.get()
    }

    pub fn set_developer_mode(&mut self, on: bool) {
        self.dev_mode.set(on);
        if !on {
            self.menu.document_click();
        }
    }

    /// Flip developer mode; returns the new value
    pub fn toggle_developer_mode(&mut self) -> bool {
        let on = self.dev_mode.toggle();
        if !on {
            self.menu.document_click();
        }
        on
    }

    pub fn subscribe(&self) -> DeveloperModeWatch {
        self.dev_mode.watch()
    }

    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    /// Right-click. Only opens the menu in developer mode.
    pub fn right_click(&mut self, position: IVec2, target: Option<BlockId>) -> bool {
        if !self.dev_mode.get() {
            return false;
        }
        self.menu.open_at(position, target);
        true
    }

    pub fn choose_add(&mut self, kind: &str) -> bool {
        self.menu.choose_add(kind)
    }

    pub fn choose_delete(&mut self) -> bool {
        self.menu.choose_delete()
    }

    pub fn document_click(&mut self) {
        self.menu.document_click();
    }
}
