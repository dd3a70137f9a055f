//! Reference layout backend
//!
//! An in-memory implementation of the layout persistence REST contract, used
//! for local development (`blockpage serve`) and as the peer of the HTTP
//! client in tests.
//!
//! ## Endpoints
//!
//! - `POST   /create-page-component` - store a record (empty uuid → generated)
//! - `PUT    /update-page-component-by-uuid` - replace a record
//! - `GET    /page-components/by-url?pagePath=...` - records of a page
//! - `DELETE /page-component/by-uuid/:uuid` - remove a record

pub mod routes;
pub mod server;

pub use routes::{build_router, LayoutDb};
pub use server::{LayoutServer, LayoutServerConfig};
