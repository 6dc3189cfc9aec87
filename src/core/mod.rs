//! Core business logic module
//!
//! This module provides the core application layer including:
//! - Catalog service and input validation
//! - Book listing pipeline
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system

pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod services;

pub use config::Config;
pub use error::{CatalogError, ErrorResponse, Result};
pub use listing::{SortBy, ViewEntry};
pub use logging::Logger;
pub use services::CatalogService;
