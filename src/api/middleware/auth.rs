//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::{policy, UserRole};
use crate::errors::{AppError, AppResult};

/// Authenticated caller extracted from the bearer token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: UserRole,
}

/// Authentication middleware.
///
/// A missing or non-bearer Authorization header is rejected with 401;
/// a token that fails verification with 403. On success the caller is
/// stored in the request extensions as [`CurrentUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthenticated)?;

    let identity = state.tokens.verify(token).ok_or(AppError::InvalidToken)?;

    request.extensions_mut().insert(CurrentUser {
        id: identity.id,
        role: identity.role,
    });

    Ok(next.run(request).await)
}

/// Require admin role, returns AdminRequired if not admin.
pub fn require_admin(user: &CurrentUser) -> AppResult<()> {
    policy::require_admin(user.role)
}
