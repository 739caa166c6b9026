// Public API - what other modules can use
pub use handlers::{create_job, delete_job, get_job, list_jobs, list_my_jobs, replace_job, search_jobs};
pub use models::{Buyer, Job, JobDocument};
pub use service::JobService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
