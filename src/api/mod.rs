//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for the monitor endpoints
//! - **[`models`]**: Request/response data structures

pub mod handlers;
pub mod models;
