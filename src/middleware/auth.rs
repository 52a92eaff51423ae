use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::error::ApiError;
use crate::models::auth::{AdminUser, Claims, ADMIN_ROLE};

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Auth("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Auth("Invalid Authorization header format".into()))?;

        let secret = parts
            .extensions
            .get::<JwtSecret>()
            .ok_or_else(|| anyhow::anyhow!("JWT secret not configured"))?;

        decode_admin_token(token, &secret.0)
    }
}

/// Extension type to carry the JWT secret through request extensions.
#[derive(Clone)]
pub struct JwtSecret(pub String);

pub fn decode_admin_token(token: &str, secret: &str) -> Result<AdminUser, ApiError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|_| ApiError::Auth("Invalid or expired token".into()))?;

    if data.claims.role != ADMIN_ROLE {
        return Err(ApiError::Forbidden);
    }

    Ok(AdminUser {
        role: data.claims.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_with(role: &str, exp_offset: i64, secret: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin".into(),
            role: role.into(),
            iat: now as usize,
            exp: (now + exp_offset) as usize,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = token_with(ADMIN_ROLE, -120, "s3cret");
        assert!(matches!(
            decode_admin_token(&token, "s3cret"),
            Err(ApiError::Auth(_))
        ));
    }

    #[test]
    fn a_non_admin_role_claim_is_forbidden() {
        let token = token_with("VIEWER", 3600, "s3cret");
        assert!(matches!(
            decode_admin_token(&token, "s3cret"),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(decode_admin_token("not.a.jwt", "s3cret").is_err());
    }
}
