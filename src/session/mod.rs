// Public API - what other modules can use
pub use cookie::{CookiePolicy, TOKEN_COOKIE};
pub use handlers::{issue_token, logout};
pub use middleware::jwt_auth;
pub use token::TokenConfig;
pub use types::{LoginRequest, SessionClaims, SuccessResponse};

// Internal modules
mod cookie;
mod handlers;
mod middleware;
mod token;
mod types;
