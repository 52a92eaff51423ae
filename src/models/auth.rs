use serde::{Deserialize, Serialize};

/// Role claim carried by every admin token.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Claims embedded in the admin JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// Extracted from a validated JWT — available via the Axum extractor.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
}
