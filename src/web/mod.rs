//! HTTP boundary for flock.
//!
//! A thin JSON API over the playlist pipeline: query validation, error
//! rendering, per-client rate limiting and request tracing.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
