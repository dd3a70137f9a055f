//! Cup model preview block
//!
//! Rendering is out of scope here; the block tracks which model it shows and
//! the canvas size the renderer should use. The canvas follows the surface's
//! viewport-relative size, so it scales with the window.

use super::Block;
use blockpage_core::{SizeObservation, Surface, Vec2};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Registry tag
pub const KIND: &str = "cup_preview";

/// A 3D cup model reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupModel {
    /// Model identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Wavefront OBJ location
    pub model_url: String,
    /// Material library location
    pub mtl_url: String,
}

impl Default for CupModel {
    fn default() -> Self {
        Self {
            id: "cup1".to_string(),
            name: "Classic Mug".to_string(),
            model_url: "assets/models/Mug.obj".to_string(),
            mtl_url: "assets/models/Mug.mtl".to_string(),
        }
    }
}

/// Block previewing a cup model in a canvas sized to its surface
#[derive(Debug, Default)]
pub struct CupPreview {
    model: CupModel,
    sizes: Option<Receiver<SizeObservation>>,
    canvas_size: Vec2,
}

impl CupPreview {
    /// Preview of the default mug
    pub fn new() -> Self {
        Self::default()
    }

    /// Preview of a specific model
    pub fn with_model(model: CupModel) -> Self {
        Self {
            model,
            ..Default::default()
        }
    }

    /// Model being shown
    pub fn model(&self) -> &CupModel {
        &self.model
    }

    /// Canvas size in pixels
    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    /// True while subscribed to a surface
    pub fn is_attached(&self) -> bool {
        self.sizes.is_some()
    }
}

impl Block for CupPreview {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn attach(&mut self, surface: &mut Surface) {
        self.sizes = Some(surface.subscribe_size());
        self.update();
    }

    fn update(&mut self) {
        let Some(sizes) = &self.sizes else {
            return;
        };
        // Only the newest observation matters
        if let Some(latest) = sizes.try_iter().last() {
            self.canvas_size = latest.pixels();
            trace!(
                "Canvas for {} resized to {}x{}",
                self.model.name,
                self.canvas_size.x,
                self.canvas_size.y
            );
        }
    }

    fn detach(&mut self) {
        self.sizes = None;
    }
}
