use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT token time-to-live constants
pub const ACCESS_TOKEN_TTL: i64 = 86400; // 1 day
pub const REFRESH_TOKEN_TTL: i64 = 604800; // 7 days

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // Subject (user ID)
    pub email: String,      // User email
    pub name: String,       // User name
    pub roles: Vec<String>, // User roles ("admin", "mod")
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
}

impl JwtClaims {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "admin")
    }

    /// Admins always pass moderator checks.
    pub fn is_mod(&self) -> bool {
        self.roles.iter().any(|r| r == "mod") || self.is_admin()
    }
}

/// Stateless HS256 JWT authentication.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
}

impl JwtAuth {
    /// # Example
    /// ```ignore
    /// use axum_helpers::{JwtAuth, JwtConfig};
    /// use core_config::FromEnv;
    ///
    /// let config = JwtConfig::from_env()?;
    /// let jwt_auth = JwtAuth::new(&config);
    /// ```
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
        }
    }

    /// Create access token (1 day)
    pub fn create_access_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        roles: &[String],
    ) -> eyre::Result<String> {
        self.create_token(user_id, email, name, roles, ACCESS_TOKEN_TTL)
    }

    /// Create refresh token (7 days)
    pub fn create_refresh_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        roles: &[String],
    ) -> eyre::Result<String> {
        self.create_token(user_id, email, name, roles, REFRESH_TOKEN_TTL)
    }

    fn create_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        roles: &[String],
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            roles: roles.to_vec(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify JWT token signature and decode claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-123"))
    }

    #[test]
    fn round_trip() {
        let auth = auth();
        let token = auth
            .create_access_token("user-1", "ana@example.com", "Ana", &["admin".to_string()])
            .unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ana@example.com");
        assert!(claims.is_admin());
        assert!(claims.is_mod());
    }

    #[test]
    fn mod_is_not_admin() {
        let auth = auth();
        let token = auth
            .create_access_token("user-2", "luis@example.com", "Luis", &["mod".to_string()])
            .unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert!(!claims.is_admin());
        assert!(claims.is_mod());
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = auth()
            .create_access_token("user-1", "ana@example.com", "Ana", &[])
            .unwrap();
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-long-enough!!"));
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn refresh_outlives_access() {
        let auth = auth();
        let access = auth
            .create_access_token("u", "e@x.com", "n", &[])
            .unwrap();
        let refresh = auth
            .create_refresh_token("u", "e@x.com", "n", &[])
            .unwrap();
        let access = auth.verify_token(&access).unwrap();
        let refresh = auth.verify_token(&refresh).unwrap();
        assert!(refresh.exp > access.exp);
    }
}
