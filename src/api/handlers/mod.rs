pub mod authors;
pub mod books;

pub use authors::*;
pub use books::*;

use crate::core::services::CatalogService;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

/// Query string appended to form redirects
pub(crate) fn redirect_target(path: &str, message: &str) -> String {
    format!("{}?message={}", path, message)
}
