//! Block type registry
//!
//! Maps the `componentType` tag of a layout record to a factory for the
//! matching [`Block`] plus the surface defaults new instances start with.

use crate::blocks::{cup_preview, interactable, Block, CupPreview, Interactable};
use blockpage_core::{Geometry, IVec2, Length, SurfaceConfig};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Factory producing a fresh block
pub type BlockFactory = Arc<dyn Fn() -> Box<dyn Block> + Send + Sync>;

/// Registration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Block type tag must not be empty")]
    EmptyKind,

    #[error("Block type '{0}' is already registered")]
    DuplicateKind(String),
}

/// Everything needed to create a block of one type
#[derive(Clone)]
pub struct BlockSpec {
    /// Registry tag (the record's `componentType`)
    pub kind: String,
    /// Size of newly added blocks
    pub default_size: IVec2,
    /// Resize floor
    pub min_size: IVec2,
    /// Body drags the block
    pub draggable: bool,
    /// Handle resizes the block
    pub resizable: bool,
    /// Click target outside developer mode
    pub redirect_url: String,
    factory: BlockFactory,
}

impl BlockSpec {
    /// Spec with the stock surface defaults (200x150, min 50x50)
    pub fn new<F>(kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Block> + Send + Sync + 'static,
    {
        Self {
            kind: kind.into(),
            default_size: IVec2::new(200, 150),
            min_size: IVec2::new(50, 50),
            draggable: true,
            resizable: true,
            redirect_url: String::new(),
            factory: Arc::new(factory),
        }
    }

    pub fn with_default_size(mut self, size: IVec2) -> Self {
        self.default_size = size;
        self
    }

    pub fn with_min_size(mut self, size: IVec2) -> Self {
        self.min_size = size;
        self
    }

    pub fn with_capabilities(mut self, draggable: bool, resizable: bool) -> Self {
        self.draggable = draggable;
        self.resizable = resizable;
        self
    }

    pub fn with_redirect(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = url.into();
        self
    }

    /// Create a new block of this type
    pub fn instantiate(&self) -> Box<dyn Block> {
        (self.factory)()
    }

    /// Surface inputs for a block of this type at `geometry` on `page_path`
    pub fn surface_config(&self, geometry: Geometry, page_path: &str) -> SurfaceConfig {
        SurfaceConfig::at(geometry, page_path)
            .with_min_size(
                Length::Px(self.min_size.x as f32),
                Length::Px(self.min_size.y as f32),
            )
            .with_capabilities(self.draggable, self.resizable)
            .with_redirect(self.redirect_url.clone())
    }
}

impl fmt::Debug for BlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockSpec")
            .field("kind", &self.kind)
            .field("default_size", &self.default_size)
            .field("min_size", &self.min_size)
            .field("draggable", &self.draggable)
            .field("resizable", &self.resizable)
            .field("redirect_url", &self.redirect_url)
            .finish_non_exhaustive()
    }
}

/// Tag → block factory lookup, ordered by tag
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    specs: BTreeMap<String, BlockSpec>,
}

impl BlockRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in catalog (`cup_preview`, `interactable`)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for spec in [
            BlockSpec::new(cup_preview::KIND, || Box::new(CupPreview::new())),
            BlockSpec::new(interactable::KIND, || Box::new(Interactable)),
        ] {
            // Built-in tags are distinct and non-empty
            let _ = registry.register(spec);
        }
        registry
    }

    /// Add a block type. Empty and already-registered tags are rejected.
    pub fn register(&mut self, spec: BlockSpec) -> Result<(), RegistryError> {
        if spec.kind.trim().is_empty() {
            return Err(RegistryError::EmptyKind);
        }
        if self.specs.contains_key(&spec.kind) {
            return Err(RegistryError::DuplicateKind(spec.kind));
        }
        tracing::debug!("Registered block type '{}'", spec.kind);
        self.specs.insert(spec.kind.clone(), spec);
        Ok(())
    }

    /// Look up a block type
    pub fn get(&self, kind: &str) -> Option<&BlockSpec> {
        self.specs.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.specs.contains_key(kind)
    }

    /// Registered tags in sorted order
    pub fn kinds(&self) -> Vec<String> {
        self.specs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
