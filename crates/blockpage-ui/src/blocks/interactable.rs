//! Plain positionable block without content

use super::Block;

/// Registry tag
pub const KIND: &str = "interactable";

/// A bare surface; useful as a placeholder or layout guide
#[derive(Debug, Default, Clone, Copy)]
pub struct Interactable;

impl Block for Interactable {
    fn kind(&self) -> &'static str {
        KIND
    }
}
