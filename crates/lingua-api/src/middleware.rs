use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use lingua_types::api::Claims;

use crate::{ApiError, AppState, JwtSettings};

/// Checks signature, expiry, issuer and audience.
pub fn decode_token(settings: &JwtSettings, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&settings.issuer]);
    validation.set_audience(&[&settings.audience]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Extract and validate JWT from Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("Missing bearer token."))?;

    let claims = decode_token(&state.jwt, token).map_err(|e| {
        debug!("Token rejected: {}", e);
        ApiError::Unauthorized("Invalid or expired token.")
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
