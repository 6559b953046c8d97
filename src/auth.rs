//! Optional shared-secret gate in front of `/mcp`

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{errors::AppError, AppState};

/// With no configured token every caller passes.
pub fn check_bearer(expected: Option<&str>, presented: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    match presented {
        None => Err(AppError::unauthorized(
            "missing_token",
            "missing authorization header",
        )),
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(AppError::unauthorized("invalid_token", "invalid bearer token")),
    }
}

pub async fn bearer_gate(
    State(state): State<AppState>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = auth_header
        .as_ref()
        .map(|TypedHeader(auth)| auth.token());
    check_bearer(state.api_token.as_deref(), presented)?;

    Ok(next.run(request).await)
}
