use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument, warn};

use super::cookie::TOKEN_COOKIE;
use crate::shared::{AppError, AppState};

/// JWT authentication middleware - validates the `token` cookie and adds SessionClaims to request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), session::jwt_auth))
/// Handlers can then extract Extension(claims): Extension<SessionClaims>.
#[instrument(skip(state, jar, req, next))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    info!(
        "JWT authentication middleware triggered for request {}",
        req.uri()
    );

    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            warn!("Missing session cookie in request");
            AppError::Unauthorized("unAuthorized access denied".to_string())
        })?;

    let claims = state.token_config.validate_token(&token).map_err(|e| {
        warn!("JWT authentication failed: {}", e);
        AppError::Unauthorized("unAuthorized access denied".to_string())
    })?;

    info!(email = %claims.email, "Authentication successful, adding claims to request");

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
