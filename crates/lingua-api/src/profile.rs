use axum::{Extension, Json, extract::State};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use lingua_types::api::{Claims, ProfileResponse};

use crate::{ApiError, AppState, run_blocking};

pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| ApiError::Unauthorized("Invalid user ID in token."))?;

    let db_state = state.clone();
    let user = run_blocking(move || Ok(db_state.db.get_user_by_id(user_id)?))
        .await?
        .ok_or(ApiError::NotFound("User not found."))?;

    Ok(Json(ProfileResponse {
        id: user.id,
        created_at: parse_timestamp(&user.created_at),
        username: user.username,
        email: user.email,
    }))
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone; it is UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}': {}", raw, e);
            DateTime::default()
        })
}
