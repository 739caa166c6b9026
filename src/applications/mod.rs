// Public API - what other modules can use
pub use handlers::{list_applications, submit_application};
pub use models::{Application, ApplicationDocument, ApplicationFilter};
pub use service::ApplicationService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
mod types;
