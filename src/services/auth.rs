use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::auth::{Claims, LoginResponse, ADMIN_ROLE};
use crate::services::metrics::LOGINS_COUNTER;

pub struct AuthService;

impl AuthService {
    /// Verify the shared admin password and issue a session token.
    pub fn login(config: &Config, password: &str) -> Result<LoginResponse, ApiError> {
        let valid = bcrypt::verify(password, &config.admin_password_hash)
            .map_err(|_| ApiError::Auth("Identifiants invalides".into()))?;
        if !valid {
            LOGINS_COUNTER.with_label_values(&["failed"]).inc();
            return Err(ApiError::Auth("Identifiants invalides".into()));
        }

        let token = Self::generate_token(&config.jwt_secret, config.jwt_expiry_seconds)
            .map_err(ApiError::Internal)?;

        LOGINS_COUNTER.with_label_values(&["ok"]).inc();
        Ok(LoginResponse {
            token,
            expires_in: config.jwt_expiry_seconds,
        })
    }

    /// HS256 token with the fixed `ADMIN` role claim.
    pub fn generate_token(secret: &str, ttl_seconds: u64) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "admin".into(),
            role: ADMIN_ROLE.into(),
            iat: now,
            exp: now + ttl_seconds as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_admin_token;

    #[test]
    fn issued_tokens_decode_with_the_admin_role() {
        let token = AuthService::generate_token("s3cret", 3600).unwrap();
        let user = decode_admin_token(&token, "s3cret").unwrap();
        assert_eq!(user.role, ADMIN_ROLE);
    }

    #[test]
    fn tokens_do_not_decode_with_another_secret() {
        let token = AuthService::generate_token("s3cret", 3600).unwrap();
        assert!(decode_admin_token(&token, "other").is_err());
    }

    #[test]
    fn login_rejects_a_wrong_password() {
        let config = test_config(bcrypt::hash("hunter2", 4).unwrap());
        assert!(AuthService::login(&config, "wrong").is_err());
    }

    #[test]
    fn login_issues_a_token_for_the_right_password() {
        let config = test_config(bcrypt::hash("hunter2", 4).unwrap());
        let response = AuthService::login(&config, "hunter2").unwrap();
        assert_eq!(response.expires_in, 3600);
        assert!(decode_admin_token(&response.token, "s3cret").is_ok());
    }

    fn test_config(admin_password_hash: String) -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            redis_url: None,
            jwt_secret: "s3cret".into(),
            jwt_expiry_seconds: 3600,
            admin_password_hash,
            cache_ttl_seconds: 300,
            image_relay_url: None,
            image_relay_key: None,
            host: "127.0.0.1".into(),
            port: 0,
            app_base_url: "http://localhost".into(),
        }
    }
}
