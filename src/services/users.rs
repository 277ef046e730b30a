//! User registration, email confirmation and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{ChangePassword, CreateUser, UpdateProfile, User, UserClaims},
    repository::Repository,
    services::email::EmailService,
};

/// Claims of the emailed account-confirmation token
#[derive(Debug, Serialize, Deserialize)]
struct ConfirmClaims {
    sub: i32,
    purpose: String,
    exp: i64,
    iat: i64,
}

const CONFIRM_PURPOSE: &str = "email_confirm";

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    email: EmailService,
    public_url: String,
}

impl UsersService {
    pub fn new(
        repository: Repository,
        config: AuthConfig,
        email: EmailService,
        public_url: String,
    ) -> Self {
        Self {
            repository,
            config,
            email,
            public_url,
        }
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Register a new, inactive user and email the confirmation link.
    /// If the email cannot be delivered the error is surfaced, but the
    /// created account is kept; it stays unusable until confirmed.
    pub async fn register(&self, data: CreateUser) -> AppResult<User> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let hash = self.hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(
                data.username.trim(),
                data.email.trim(),
                &hash,
                data.first_name.as_deref().unwrap_or(""),
                data.last_name.as_deref().unwrap_or(""),
                data.role,
            )
            .await?;

        let token = self.confirmation_token(user.id)?;
        let link = format!("{}/api/v1/auth/confirm/{}", self.public_url, token);

        self.email
            .send_confirmation(&user.email, &user.username, &link)
            .await?;

        tracing::info!("User @{} (User ID: {}) registered, confirmation mail sent", user.username, user.id);

        Ok(user)
    }

    /// Activate the account named by a confirmation token
    pub async fn confirm(&self, token: &str) -> AppResult<User> {
        use jsonwebtoken::{decode, DecodingKey, Validation};

        let data = decode::<ConfirmClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Validation("Confirmation link is invalid or has expired.".to_string()))?;

        if data.claims.purpose != CONFIRM_PURPOSE {
            return Err(AppError::Validation(
                "Confirmation link is invalid or has expired.".to_string(),
            ));
        }

        self.repository.users.activate(data.claims.sub).await?;
        let user = self.repository.users.get_by_id(data.claims.sub).await?;

        tracing::info!("User @{} (User ID: {}) confirmed their email", user.username, user.id);

        Ok(user)
    }

    fn confirmation_token(&self, user_id: i32) -> AppResult<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = Utc::now().timestamp();
        let claims = ConfirmClaims {
            sub: user_id,
            purpose: CONFIRM_PURPOSE.to_string(),
            exp: now + (self.config.confirmation_expiration_hours as i64 * 3600),
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to create confirmation token: {}", e)))
    }

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    /// Authenticate by username and password, returning a JWT
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Credentials given incorrect, please try again.".to_string())
            })?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Credentials given incorrect, please try again.".to_string(),
            ));
        }

        if !user.is_active {
            return Err(AppError::Authentication(
                "Account is not active. Please confirm your email address first.".to_string(),
            ));
        }

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            rights: user.role.rights(),
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!("User {} (User ID: {}) logged in", user.username, user.id);

        Ok((token, user))
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Self-service profile edit
    pub async fn update_profile(&self, user_id: i32, data: UpdateProfile) -> AppResult<User> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self.repository.users.update_profile(user_id, &data).await?;

        tracing::info!("User @{} (User ID: {}) edited their profile", user.username, user.id);

        Ok(user)
    }

    /// Change the password after verifying the current one. Reusing the
    /// current password is rejected.
    pub async fn change_password(&self, user_id: i32, data: ChangePassword) -> AppResult<()> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let user = self.repository.users.get_by_id(user_id).await?;

        if !self.verify_password(&user, &data.current_password)? {
            return Err(AppError::Authentication(
                "Current password incorrect, please try again.".to_string(),
            ));
        }

        if data.new_password == data.current_password {
            return Err(AppError::Validation(
                "Password entered is the same as original. Please choose a new one and try again."
                    .to_string(),
            ));
        }

        let hash = self.hash_password(&data.new_password)?;
        self.repository.users.set_password(user_id, &hash).await?;

        tracing::info!("User @{} (User ID: {}) changed their password", user.username, user.id);

        Ok(())
    }

    // =========================================================================
    // PASSWORDS
    // =========================================================================

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
