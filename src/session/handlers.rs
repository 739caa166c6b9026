use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument};

use super::types::{LoginRequest, SuccessResponse};
use crate::extractors::ValidatedJson;
use crate::shared::{AppError, AppState};

/// HTTP handler for issuing a session cookie
///
/// POST /jwt
/// Signs the posted identity and sets it as the `token` cookie
#[instrument(name = "issue_token", skip(state, jar, login), fields(email = %login.email))]
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(login): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<SuccessResponse>), AppError> {
    let token = state.token_config.create_token(&login)?;
    let jar = jar.add(state.cookie_policy.session_cookie(token));

    info!("Session token issued");

    Ok((jar, Json(SuccessResponse::ok())))
}

/// HTTP handler for clearing the session cookie
///
/// GET /logout
#[instrument(name = "logout", skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    info!("Clearing session cookie");
    let jar = jar.add(state.cookie_policy.removal_cookie());
    (jar, Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment};
    use crate::shared::test_utils::{body_json, AppStateBuilder};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/jwt", post(issue_token))
            .route("/logout", get(logout))
            .with_state(state)
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/jwt")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn set_cookie(response: &axum::response::Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .expect("Set-Cookie header")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_issue_token_sets_http_only_cookie() {
        let state = AppStateBuilder::new().build();
        let token_config = state.token_config.clone();

        let response = app(state)
            .oneshot(login_request(r#"{"email": "ada@example.com", "name": "Ada"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));

        let token = cookie
            .trim_start_matches("token=")
            .split(';')
            .next()
            .unwrap();
        let claims = token_config.validate_token(token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.profile["name"], "Ada");

        assert_eq!(body_json(response).await, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_issue_token_in_production_is_cross_site_secure() {
        let config = AppConfig {
            environment: Environment::Production,
            ..AppConfig::default()
        };
        let state = AppStateBuilder::new().with_config(config).build();

        let response = app(state)
            .oneshot(login_request(r#"{"email": "ada@example.com"}"#))
            .await
            .unwrap();

        let cookie = set_cookie(&response);
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_issue_token_rejects_invalid_email() {
        let response = app(AppStateBuilder::new().build())
            .oneshot(login_request(r#"{"email": "nope"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_issue_token_rejects_missing_email() {
        let response = app(AppStateBuilder::new().build())
            .oneshot(login_request(r#"{"name": "Ada"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_expires_cookie() {
        let request = Request::builder()
            .uri("/logout")
            .header(header::COOKIE, "token=whatever")
            .body(Body::empty())
            .unwrap();

        let response = app(AppStateBuilder::new().build())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = set_cookie(&response);
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));

        assert_eq!(body_json(response).await, json!({ "success": true }));
    }
}
