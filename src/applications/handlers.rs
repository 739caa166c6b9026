use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::{Application, ApplicationDocument},
    service::ApplicationService,
    types::ApplicationQuery,
};
use crate::extractors::ValidatedJson;
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState, InsertAck};

fn service(state: &AppState) -> ApplicationService {
    ApplicationService::new(Arc::clone(&state.application_repository))
}

/// HTTP handler for applying to a job
///
/// POST /AppliedJobs
/// The applicant email must be the signed-in user
#[instrument(name = "submit_application", skip(state, claims, document))]
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    ValidatedJson(document): ValidatedJson<ApplicationDocument>,
) -> Result<Json<InsertAck>, AppError> {
    claims.ensure_owner(&document.email)?;

    let ack = service(&state).submit_application(document).await?;
    Ok(Json(ack))
}

/// HTTP handler for the signed-in user's applications
///
/// GET /AppliedJobs?filter=category&user=email
/// `user` defaults to the session email and may not name anyone else
#[instrument(name = "list_applications", skip(state, claims, query))]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    query: Result<Query<ApplicationQuery>, QueryRejection>,
) -> Result<Json<Vec<Application>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut filter = query.into_filter();

    // Listings are always scoped to the signed-in applicant
    match filter.email.as_deref() {
        Some(user) => claims.ensure_owner(user)?,
        None => filter.email = Some(claims.email.clone()),
    }

    let applications = service(&state).list_applications(&filter).await?;
    info!(
        application_count = applications.len(),
        "Applications listed successfully"
    );
    Ok(Json(applications))
}
