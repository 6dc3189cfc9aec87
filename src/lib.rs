//! Library Catalog
//!
//! Authors and books kept in SQLite, served over HTTP, with book covers
//! looked up by ISBN from a remote volumes service.

pub mod api;
pub mod core;
pub mod cover;
pub mod db;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::{CatalogService, Config};
pub use cover::CoverLookup;
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
