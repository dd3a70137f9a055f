//! BlockPage UI - Headless Page Editor
//!
//! This crate drives the editing side of BlockPage, including:
//! - Block registry and the built-in block catalog
//! - The dynamic block host (page loading, add/delete, persistence)
//! - Developer mode and the context menu
//! - The editor session tying them together
//! - User configuration

#![warn(missing_docs)]

#[allow(missing_docs)]
pub mod blocks;
pub mod config;
#[allow(missing_docs)]
pub mod coordinator;
#[allow(missing_docs)]
pub mod editor;
#[allow(missing_docs)]
pub mod host;
#[allow(missing_docs)]
pub mod registry;

pub use blocks::{Block, CupModel, CupPreview, Interactable};
pub use config::EditorConfig;
pub use coordinator::{ContextMenu, MenuIntent, ModeCoordinator};
pub use editor::Editor;
pub use host::{BlockHost, BlockInstance, HostError, HostEvent, HostOptions};
pub use registry::{BlockFactory, BlockRegistry, BlockSpec, RegistryError};

use blockpage_core::IVec2;
use serde::{Deserialize, Serialize};

/// Input the editor understands
///
/// Serialized with an `action` tag so sessions can be scripted as JSON, e.g.
/// `{"action": "pointer_down", "at": [20, 20]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorAction {
    // Navigation
    /// Go to a page
    Navigate {
        /// Page path
        path: String,
    },

    // Mode
    /// Flip developer mode
    ToggleDeveloperMode,
    /// Set developer mode
    SetDeveloperMode {
        /// New value
        on: bool,
    },

    // Pointer
    /// Pointer pressed
    PointerDown {
        /// Position in container pixels
        at: IVec2,
    },
    /// Pointer moved
    PointerMove {
        /// Position in container pixels
        at: IVec2,
    },
    /// Pointer released
    PointerUp,
    /// Plain click
    Click {
        /// Position in container pixels
        at: IVec2,
    },
    /// Click outside any menu
    DocumentClick,

    // Context menu
    /// Right-click
    ContextMenu {
        /// Position in container pixels
        at: IVec2,
    },
    /// Menu entry "add <kind>"
    MenuAdd {
        /// Block type
        kind: String,
    },
    /// Menu entry "delete"
    MenuDelete,

    // Window
    /// Window resized
    ResizeViewport {
        /// New viewport size
        size: IVec2,
    },
}
