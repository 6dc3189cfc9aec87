//! HTTP API module
//!
//! This module provides the HTTP server and endpoints including:
//! - JSON API for books and authors
//! - HTML form endpoints with redirect responses
//! - Trace ID middleware and error formatting

pub mod server;
pub mod routes;
pub mod middleware;
pub mod handlers;
pub mod models;

pub use server::ApiServer;
pub use middleware::{current_trace_id, trace_id_middleware, TRACE_ID_HEADER};
