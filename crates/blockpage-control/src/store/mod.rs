//! Layout store seam
//!
//! [`LayoutStore`] is the stateless request/response façade the block host
//! persists through. [`HttpLayoutStore`] talks to the REST service; tests and
//! embedders can provide their own implementation.

mod client;

pub use client::{HttpLayoutStore, DEFAULT_BASE_URL};

use crate::Result;
use blockpage_core::{BlockId, BlockLayoutRecord};
use std::fmt;
use std::future::Future;

/// Persistence operations for block layout records.
///
/// Every call is a single request with no retry and no caching.
pub trait LayoutStore: Send + Sync + 'static {
    /// Store a new record; returns the stored record
    fn create(
        &self,
        record: BlockLayoutRecord,
    ) -> impl Future<Output = Result<BlockLayoutRecord>> + Send;

    /// Replace the record with the same uuid; returns the stored record
    fn update_by_uuid(
        &self,
        record: BlockLayoutRecord,
    ) -> impl Future<Output = Result<BlockLayoutRecord>> + Send;

    /// All records of a page
    fn list_by_page_path(
        &self,
        page_path: &str,
    ) -> impl Future<Output = Result<Vec<BlockLayoutRecord>>> + Send;

    /// Delete the record with this uuid
    fn delete_by_uuid(&self, uuid: &BlockId) -> impl Future<Output = Result<()>> + Send;
}

/// Names the store operations, for logging and error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Create,
    Update,
    List,
    Delete,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::List => write!(f, "list"),
            Self::Delete => write!(f, "delete"),
        }
    }
}
