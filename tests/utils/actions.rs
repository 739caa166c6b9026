use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a request through the full router and collect the JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Sign in through `POST /jwt` and return the `Cookie` header value
    pub async fn login(&self, email: &str) -> String {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/jwt")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "email": email }).to_string()))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap();
        set_cookie
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Post a job as `owner` and return its id
    pub async fn post_job(&self, cookie: &str, title: &str, owner: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/AddJobs",
                Some(cookie),
                Some(json!({
                    "job_title": title,
                    "job_category": "Engineering",
                    "buyer": { "email": owner },
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "post_job failed: {body}");
        body["insertedId"].as_str().unwrap().to_string()
    }

    /// Apply to `job_id` as `email`
    pub async fn apply(
        &self,
        cookie: &str,
        job_id: &str,
        email: &str,
        category: &str,
    ) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/AppliedJobs",
            Some(cookie),
            Some(json!({
                "JobId": job_id,
                "email": email,
                "job_category": category,
            })),
        )
        .await
    }

    pub async fn get_job(&self, job_id: &str) -> (StatusCode, Value) {
        self.send(Method::GET, &format!("/AddJobs/{}", job_id), None, None)
            .await
    }
}
