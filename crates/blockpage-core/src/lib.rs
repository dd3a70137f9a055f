//! BlockPage Core - Layout Model and Interaction State
//!
//! This crate contains the headless core of the BlockPage editor, including:
//! - Layout records exchanged with the persistence backend
//! - Geometry primitives and CSS-like length parsing
//! - The positionable surface (drag/resize state machine)
//! - The shared developer-mode flag
//! - Logging configuration

#![warn(missing_docs)]

pub use glam::{IVec2, Vec2};
use thiserror::Error;

pub mod dev_mode;
pub mod geometry;
pub mod logging;
pub mod record;
pub mod surface;

// --- Re-exports grouped by category ---

// Layout data
pub use geometry::{Geometry, Length, RelativeSize, SizeObservation};
pub use record::{BlockId, BlockLayoutRecord};

// Interaction
pub use dev_mode::{DeveloperMode, DeveloperModeWatch};
pub use surface::{
    GestureState, HitZone, Surface, SurfaceConfig, SurfaceEvent, SurfaceEventKind, SurfaceLinks,
    RESIZE_HANDLE_SIZE,
};

// Logging
pub use logging::LogConfig;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Invalid geometry configuration
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A length string could not be parsed
    #[error("Invalid length '{0}': expected a pixel value (\"200px\", \"200\") or a percentage (\"25%\")")]
    InvalidLength(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
