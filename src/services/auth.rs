//! Authentication service: registration, login, token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};

use crate::{
    config::{AdminConfig, AuthConfig},
    error::{AppError, AppResult},
    models::user::{AccountType, RegisterUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new reader account
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        let hash = hash_password(&request.password)?;
        self.repository
            .users
            .create(
                &request.email,
                &hash,
                request.first_name.as_deref(),
                request.last_name.as_deref(),
                AccountType::Reader,
            )
            .await
    }

    /// Verify credentials and issue a JWT
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        verify_password(password, &user.password)
            .map_err(|_| AppError::Authentication("Invalid email or password".to_string()))?;

        let now = Utc::now();
        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            account_type: user.account_type,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.jwt_expiration_hours as i64)).timestamp(),
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Get the user behind a set of claims
    pub async fn current_user(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository.users.get_by_id(claims.user_id).await
    }

    /// Create the bootstrap administrator account if it does not exist yet
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<()> {
        if self.repository.users.get_by_email(&admin.email).await?.is_some() {
            return Ok(());
        }

        let hash = hash_password(&admin.password)?;
        self.repository
            .users
            .create(&admin.email, &hash, None, None, AccountType::Admin)
            .await?;

        tracing::info!("Created bootstrap administrator {}", admin.email);
        Ok(())
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<(), argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Argon2::default().verify_password(password.as_bytes(), &parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();
        assert_ne!(first, second);
    }
}
