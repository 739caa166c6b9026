use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::applications;
use crate::config::AppConfig;
use crate::jobs;
use crate::session;
use crate::shared::AppState;

async fn root() -> &'static str {
    "Hello World!"
}

/// Builds the full HTTP surface. Owner-scoped routes sit behind the session guard.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let guarded = Router::new()
        .route("/AddJobs", post(jobs::create_job))
        .route(
            "/AppliedJobs",
            get(applications::list_applications).post(applications::submit_application),
        )
        .route("/MyJob/:email", get(jobs::list_my_jobs))
        .route(
            "/MyJobId/:id",
            axum::routing::delete(jobs::delete_job).put(jobs::replace_job),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::jwt_auth,
        ));

    Router::new()
        .route("/", get(root))
        .route("/jwt", post(session::issue_token))
        .route("/logout", get(session::logout))
        .route("/AddJobs", get(jobs::list_jobs))
        .route("/AddJobs/:id", get(jobs::get_job))
        .route("/SearchJobs", get(jobs::search_jobs))
        .merge(guarded)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
