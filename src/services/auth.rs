use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{LoginRequest, LoginResponse, RegisterRequest, User, UserResponse},
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// How long a session token stays valid unless configured otherwise
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

/// Registration, login and logout against a [`UserStore`]
///
/// Sessions are plain bearer tokens with a fixed lifetime counted from login.
/// Expired tokens stop resolving immediately and are deleted the next time
/// their owner logs in.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hash_cost: u32,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            hash_cost: bcrypt::DEFAULT_COST,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Overrides the bcrypt work factor
    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    /// Sessions created before this instant are expired
    fn session_cutoff(&self) -> DateTime<Utc> {
        Utc::now() - self.session_ttl
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserResponse> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();

        if username.is_empty()
            || email.is_empty()
            || request.password.is_empty()
            || request.confirm_password.is_empty()
        {
            return Err(AppError::InvalidInput("All fields are required!".to_string()));
        }
        if request.password != request.confirm_password {
            return Err(AppError::InvalidInput("Passwords do not match!".to_string()));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters long!",
                MIN_PASSWORD_LEN
            )));
        }
        if self.store.username_or_email_taken(&username, &email).await? {
            return Err(AppError::Conflict(
                "Username or email already exists!".to_string(),
            ));
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = self
            .store
            .create_user(User::new(username, email, password_hash))
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(UserResponse::from(&user))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter both username and password!".to_string(),
            ));
        }

        let invalid = || AppError::Unauthorized("Invalid username or password!".to_string());

        let user = self
            .store
            .find_by_username(username)
            .await?
            .ok_or_else(invalid)?;

        if !self
            .verify_password(request.password, user.password_hash.clone())
            .await?
        {
            tracing::info!(username = %username, "Rejected login attempt");
            return Err(invalid());
        }

        let token = self.store.create_session(user.id, self.session_cutoff()).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            token,
            message: format!("Welcome back, {}!", user.username),
            user: UserResponse::from(&user),
        })
    }

    /// Ends a session; returns whether it existed
    pub async fn logout(&self, token: Uuid) -> AppResult<bool> {
        self.store.delete_session(token).await
    }

    /// Resolves a bearer token to its user
    pub async fn authenticate(&self, token: Uuid) -> AppResult<Option<User>> {
        self.store
            .user_for_session(token, self.session_cutoff())
            .await
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let cost = self.hash_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(AppError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(AppError::from)
    }
}
