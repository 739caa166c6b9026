use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::{LoginRequest, SessionClaims, RESERVED_CLAIMS};
use crate::config::AppConfig;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiration_days: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, expiration_days: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_days,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.secret_key.clone(), config.session_expiration_days)
    }

    /// Signs the login payload into a session token
    #[instrument(skip(self, login), fields(email = %login.email))]
    pub fn create_token(&self, login: &LoginRequest) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = Duration::try_days(self.expiration_days)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                debug!(
                    expiration_days = self.expiration_days,
                    "Token expiry out of range"
                );
                AppError::JwtError("Token expiry out of range".to_string())
            })?
            .timestamp() as usize;

        debug!(
            expiration_days = self.expiration_days,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let mut profile = login.profile.clone();
        for claim in RESERVED_CLAIMS {
            profile.remove(claim);
        }

        let claims = SessionClaims {
            email: login.email.clone(),
            profile,
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates a JWT token and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        debug!("Decoding and validating JWT token");

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                email = %data.claims.email,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
