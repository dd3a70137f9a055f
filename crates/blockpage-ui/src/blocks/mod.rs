//! Concrete block implementations
//!
//! A block is the content a [`Surface`] carries around. The host creates one
//! through the registry, attaches it to its surface and calls
//! [`Block::update`] whenever it pumps surface events.

pub mod cup_preview;
pub mod interactable;

pub use cup_preview::{CupModel, CupPreview};
pub use interactable::Interactable;

use blockpage_core::Surface;
use std::fmt;

/// Content hosted inside a positionable surface
pub trait Block: Send + fmt::Debug {
    /// Registry tag of this block type
    fn kind(&self) -> &'static str;

    /// Called once after the surface is created and positioned
    fn attach(&mut self, surface: &mut Surface) {
        let _ = surface;
    }

    /// Pull pending signals (size observations etc.)
    fn update(&mut self) {}

    /// Called when the instance leaves the live set; drop every subscription here
    fn detach(&mut self) {}
}
