use chrono::Duration;
use tubely_api::auth::JwtService;
use uuid::Uuid;

/// Secret shared by the test server and the tokens minted here.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Bearer token for `user_id`, valid for an hour.
pub fn token_for(user_id: Uuid) -> String {
    JwtService::new(TEST_JWT_SECRET)
        .issue(user_id, Duration::hours(1))
        .expect("Failed to sign test token")
}

/// `Authorization` header value for `user_id`.
pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}
