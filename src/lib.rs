// Library crate for the job board API
// This file exposes the public API for integration tests

pub mod app;
pub mod applications;
pub mod config;
pub mod db;
pub mod extractors;
pub mod jobs;
pub mod object_id;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use config::{AppConfig, Environment};
pub use object_id::ObjectId;
pub use shared::{AppError, AppState};
