//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{AccountType, CreateUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by login and password, returning a JWT token
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid login or password"))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::authentication("Invalid login or password"));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Issue a JWT for a user; permissions derive from the account type
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.login.clone(),
            user_id: user.id,
            account_type: user.account_type,
            permissions: user.account_type.permissions(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a new user with a hashed password
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        let hash = self.hash_password(&data.password)?;
        self.repository
            .users
            .create(
                &data.login,
                &hash,
                data.first_name.as_deref(),
                data.last_name.as_deref(),
                data.account_type.unwrap_or(AccountType::Patron),
            )
            .await
    }

    /// Create the configured admin account when the users table is empty.
    /// Gives a fresh deployment a way in.
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.users.count().await? > 0 {
            return Ok(());
        }

        let hash = self.hash_password(&self.config.bootstrap_admin_password)?;
        let admin = self
            .repository
            .users
            .create(
                &self.config.bootstrap_admin_login,
                &hash,
                None,
                None,
                AccountType::Admin,
            )
            .await?;

        tracing::info!("Created bootstrap admin user '{}'", admin.login);
        Ok(())
    }
}
