use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

use crate::applications::repository::{
    ApplicationRepository, InMemoryApplicationRepository, PostgresApplicationRepository,
};
use crate::config::AppConfig;
use crate::jobs::repository::{InMemoryJobRepository, JobRepository, PostgresJobRepository};
use crate::object_id::{InvalidObjectId, ObjectId};
use crate::session::{CookiePolicy, TokenConfig};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub job_repository: Arc<dyn JobRepository + Send + Sync>,
    pub application_repository: Arc<dyn ApplicationRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub cookie_policy: CookiePolicy,
}

impl AppState {
    pub fn new(
        job_repository: Arc<dyn JobRepository + Send + Sync>,
        application_repository: Arc<dyn ApplicationRepository + Send + Sync>,
        config: &AppConfig,
    ) -> Self {
        Self {
            job_repository,
            application_repository,
            token_config: TokenConfig::from_config(config),
            cookie_policy: CookiePolicy::new(config.environment),
        }
    }

    /// State backed by the in-memory store. Data is lost on restart.
    pub fn in_memory(config: &AppConfig) -> Self {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let applications = Arc::new(InMemoryApplicationRepository::new(Arc::clone(&jobs)));
        Self::new(jobs, applications, config)
    }

    /// State backed by Postgres. Both repositories share the one pool.
    pub fn postgres(pool: PgPool, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(PostgresJobRepository::new(pool.clone())),
            Arc::new(PostgresApplicationRepository::new(pool)),
            config,
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl From<InvalidObjectId> for AppError {
    fn from(err: InvalidObjectId) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::JwtError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Token error: {}", msg),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Acknowledgement for a single-document insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: ObjectId,
}

impl InsertAck {
    pub fn new(inserted_id: ObjectId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Acknowledgement for a single-document delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Acknowledgement for a single-document update or upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<ObjectId>,
}

impl UpdateAck {
    /// An existing document matched; `modified` is false when nothing changed.
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    /// No document matched and a new one was created under `id`.
    pub fn upserted(id: ObjectId) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        }
    }
}
