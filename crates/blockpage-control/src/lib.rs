//! BlockPage Control - Layout Persistence
//!
//! This crate connects the editor to the layout persistence service:
//! - **Store**: the [`LayoutStore`] seam and its HTTP client implementation
//! - **Web**: an in-memory reference backend speaking the same REST contract
//!   (requires the `http-api` feature)
//!
//! ## Feature Flags
//!
//! - `http-api`: Enable the reference backend (requires `axum`, `tower-http`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blockpage_control::{HttpLayoutStore, LayoutStore};
//!
//! # async fn run() -> blockpage_control::Result<()> {
//! let store = HttpLayoutStore::new("http://localhost:8080")?;
//! let records = store.list_by_page_path("/home").await?;
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

/// Error types
pub mod error;
/// Layout store seam and HTTP client
pub mod store;

#[cfg(feature = "http-api")]
/// Reference layout backend
pub mod web;

// Re-exports
pub use error::{Result, StoreError};
pub use store::{HttpLayoutStore, LayoutStore, StoreOperation, DEFAULT_BASE_URL};

#[cfg(feature = "http-api")]
pub use web::{LayoutServer, LayoutServerConfig};
