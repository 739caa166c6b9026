use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{Job, JobDocument},
    service::{JobService, INVALID_SEARCH_MESSAGE},
    types::SearchQuery,
};
use crate::extractors::ValidatedJson;
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState, DeleteAck, InsertAck, UpdateAck};

fn service(state: &AppState) -> JobService {
    JobService::new(Arc::clone(&state.job_repository))
}

/// HTTP handler for posting a job
///
/// POST /AddJobs
/// The posting's buyer must be the signed-in user
#[instrument(name = "create_job", skip(state, claims, document))]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    ValidatedJson(document): ValidatedJson<JobDocument>,
) -> Result<Json<InsertAck>, AppError> {
    claims.ensure_owner(document.owner_email())?;

    let ack = service(&state).create_job(document).await?;
    Ok(Json(ack))
}

/// HTTP handler for listing all jobs
///
/// GET /AddJobs
#[instrument(name = "list_jobs", skip(state))]
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = service(&state).list_jobs().await?;
    info!(job_count = jobs.len(), "Jobs listed successfully");
    Ok(Json(jobs))
}

/// GET /AddJobs/:id
#[instrument(name = "get_job", skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    let job = service(&state).get_job(&id).await?;
    Ok(Json(job))
}

/// HTTP handler for the signed-in user's own postings
///
/// GET /MyJob/:email
#[instrument(name = "list_my_jobs", skip(state, claims))]
pub async fn list_my_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Job>>, AppError> {
    claims.ensure_owner(&email)?;

    let jobs = service(&state).list_jobs_by_owner(&email).await?;
    info!(job_count = jobs.len(), "Owner jobs listed successfully");
    Ok(Json(jobs))
}

/// DELETE /MyJobId/:id
#[instrument(name = "delete_job", skip(state, claims))]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, AppError> {
    let ack = service(&state)
        .delete_owned_job(&id, &claims.email)
        .await?;
    Ok(Json(ack))
}

/// PUT /MyJobId/:id
#[instrument(name = "replace_job", skip(state, claims, document))]
pub async fn replace_job(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
    ValidatedJson(document): ValidatedJson<JobDocument>,
) -> Result<Json<UpdateAck>, AppError> {
    let ack = service(&state)
        .replace_owned_job(&id, document, &claims.email)
        .await?;
    Ok(Json(ack))
}

/// HTTP handler for title search
///
/// GET /SearchJobs?search=term
#[instrument(name = "search_jobs", skip(state, query))]
pub async fn search_jobs(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Job>>, AppError> {
    let Query(query) =
        query.map_err(|_| AppError::BadRequest(INVALID_SEARCH_MESSAGE.to_string()))?;

    let jobs = service(&state).search_jobs(query.search.as_deref()).await?;
    info!(job_count = jobs.len(), "Search completed");
    Ok(Json(jobs))
}
