use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::user_model::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // User id
    pub role: String, // Role at sign-in (user/admin/superadmin)
    pub exp: usize,   // Expiry timestamp
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }

    pub fn role(&self) -> Role {
        Role::from_db(&self.role).unwrap_or(Role::User)
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::Internal("Failed to hash password".to_string()))
}

/// False for a wrong password and for a stored value that is not a PHC hash.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Signs and reads the session tokens stored in the `session` cookie.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    ttl_hours: i64,
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }

    pub fn ttl_hours(&self) -> i64 {
        self.ttl_hours
    }

    pub fn issue(&self, user_id: i32, role: Role) -> AppResult<String> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(self.ttl_hours))
            .ok_or_else(|| AppError::Internal("Session expiry out of range".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| AppError::Internal("Failed to generate session token".to_string()))
    }

    /// None for tampered, expired, or malformed tokens.
    pub fn read(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .ok()
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_salted_and_verifiable() {
        let first = hash_password("p1").unwrap();
        let second = hash_password("p1").unwrap();
        assert_ne!(first, second);
        assert!(verify_password(&first, "p1"));
        assert!(!verify_password(&first, "p2"));
    }

    #[test]
    fn non_phc_hash_never_verifies() {
        assert!(!verify_password("plaintext", "plaintext"));
    }

    #[test]
    fn session_token_round_trip() {
        let keys = SessionKeys::new("test-secret", 1);
        let token = keys.issue(7, Role::Admin).unwrap();
        let claims = keys.read(&token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.role(), Role::Admin);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = SessionKeys::new("one", 1).issue(1, Role::User).unwrap();
        assert!(SessionKeys::new("two", 1).read(&token).is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = SessionKeys::new("test-secret", -2);
        let token = keys.issue(3, Role::User).unwrap();
        assert!(keys.read(&token).is_none());
    }
}
