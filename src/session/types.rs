use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::shared::AppError;

/// Claim names owned by the token issuer; client-supplied values are dropped.
pub(super) const RESERVED_CLAIMS: [&str; 3] = ["email", "exp", "iat"];

/// Identity payload posted to `/jwt`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    /// Any further identity fields (display name, photo URL, ...)
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

/// JWT claims structure containing session information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

impl SessionClaims {
    /// Rejects with 403 unless the session belongs to `owner_email`.
    pub fn ensure_owner(&self, owner_email: &str) -> Result<(), AppError> {
        if self.email == owner_email {
            Ok(())
        } else {
            Err(AppError::Forbidden("Forbidden access denied".to_string()))
        }
    }
}

/// Body returned by the session endpoints
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_claims_serialization() {
        let mut profile = Map::new();
        profile.insert("name".to_string(), json!("Ada"));
        let claims = SessionClaims {
            email: "ada@example.com".to_string(),
            profile,
            exp: 1234567890,
            iat: 1234567800,
        };

        // Profile fields sit at the top level of the claims object
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["name"], "Ada");
        assert_eq!(value["email"], "ada@example.com");

        let deserialized: SessionClaims = serde_json::from_value(value).unwrap();
        assert_eq!(deserialized, claims);
    }

    #[test]
    fn test_login_request_validation() {
        let valid: LoginRequest =
            serde_json::from_value(json!({ "email": "a@x.com", "name": "A" })).unwrap();
        assert!(valid.validate().is_ok());
        assert_eq!(valid.profile["name"], "A");

        let invalid: LoginRequest =
            serde_json::from_value(json!({ "email": "not-an-email" })).unwrap();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_ensure_owner() {
        let claims = SessionClaims {
            email: "a@x.com".to_string(),
            profile: Map::new(),
            exp: 0,
            iat: 0,
        };

        assert!(claims.ensure_owner("a@x.com").is_ok());
        assert!(matches!(
            claims.ensure_owner("b@y.com"),
            Err(AppError::Forbidden(_))
        ));
    }
}
