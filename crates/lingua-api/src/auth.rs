use std::sync::OnceLock;

use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use lingua_db::{Database, is_unique_violation, models::UserRow};
use lingua_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest};

use crate::{ApiError, AppState, JwtSettings, run_blocking};

pub const TOKEN_TTL_HOURS: i64 = 2;

const DUPLICATE_USER: &str = "Username or Email is already in use.";
/// Same text whether the username is unknown or the password is wrong.
const INVALID_CREDENTIALS: &str = "Invalid username or password.";

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db_state = state.clone();
    let user_id = run_blocking(move || create_user(&db_state.db, &req)).await?;

    info!("Registered user {}", user_id);
    Ok("User registered successfully.")
}

fn create_user(db: &Database, req: &RegisterRequest) -> Result<i64, ApiError> {
    if db.user_exists(&req.username, &req.email)? {
        return Err(ApiError::BadRequest(DUPLICATE_USER));
    }

    let password_hash = hash_password(&req.password)?;
    insert_user(db, req, &password_hash)
}

/// The existence check can lose a race with a concurrent registration, so a
/// UNIQUE hit on insert is reported as a duplicate too.
fn insert_user(db: &Database, req: &RegisterRequest, password_hash: &str) -> Result<i64, ApiError> {
    match db.create_user(&req.username, &req.email, password_hash) {
        Ok(id) => Ok(id),
        Err(e) if is_unique_violation(&e) => Err(ApiError::BadRequest(DUPLICATE_USER)),
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = req.username.clone();
    let db_state = state.clone();
    let user = run_blocking(move || {
        let user = db_state.db.get_user_by_username(&req.username)?;
        let stored_hash = match &user {
            Some(user) => user.password_hash.as_str(),
            None => dummy_hash()?,
        };
        let verified = verify_password(&req.password, stored_hash)?;
        Ok(user.filter(|_| verified))
    })
    .await?;

    let Some(user) = user else {
        warn!("Rejected login for '{}'", username);
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    };

    let token = create_token(&state.jwt, &user)?;
    Ok(Json(LoginResponse { token }))
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Hash checked when the username is unknown, so a miss costs the same
/// Argon2 work as a wrong password.
fn dummy_hash() -> anyhow::Result<&'static str> {
    static DUMMY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DUMMY.get() {
        return Ok(hash);
    }
    let hash = hash_password("lingua-unknown-user")?;
    Ok(DUMMY.get_or_init(|| hash))
}

fn verify_password(password: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed_hash =
        PasswordHash::new(stored_hash).map_err(|e| anyhow!("Corrupt password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Signs an HS256 token for `user`, valid for [`TOKEN_TTL_HOURS`].
pub fn create_token(settings: &JwtSettings, user: &UserRow) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        email: user.email.clone(),
        iss: settings.issuer.clone(),
        aud: settings.audience.clone(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )?;

    Ok(token)
}
