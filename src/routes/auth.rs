use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::ApiError;
use crate::middleware::rate_limit::check_rate_limit;
use crate::models::auth::{LoginRequest, LoginResponse};
use crate::services::auth::AuthService;
use crate::AppState;

/// Best-effort client key for the login throttle: the first hop of
/// X-Forwarded-For when running behind the reverse proxy, else a shared
/// bucket.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".into())
}

/// POST /admin/login — exchange the shared admin password for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Rate limit: 5 attempts per 15 min per client
    let rate_key = format!("rate:admin-login:{}", client_key(&headers));
    check_rate_limit(state.cache.connection(), &rate_key, 5, 900).await?;

    let response = AuthService::login(&state.config, &body.password)?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_key_takes_the_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_key(&headers), "203.0.113.9");
    }

    #[test]
    fn client_key_falls_back_to_a_shared_bucket() {
        assert_eq!(client_key(&HeaderMap::new()), "unknown");
    }
}
