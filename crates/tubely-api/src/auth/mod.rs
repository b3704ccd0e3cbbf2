//! Bearer-token authentication for the upload routes

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{JwtService, TOKEN_ISSUER};
pub use middleware::{auth_middleware, get_bearer_token, AuthState};
pub use models::{AuthUser, JwtClaims};
