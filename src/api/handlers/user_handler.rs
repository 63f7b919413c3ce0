//! Profile, block toggle and listing handlers (bearer token required).

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::config::{MSG_USER_BLOCKED, MSG_USER_UNBLOCKED};
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult, ErrorResponse};

/// Block toggle result
#[derive(Debug, Serialize, ToSchema)]
pub struct BlockResponse {
    #[schema(example = "User blocked")]
    pub message: String,
    pub user: UserResponse,
}

/// Create authenticated user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/block/:id", put(toggle_block))
}

/// An id that is not a UUID cannot name an existing user.
fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>),
        (status = 401, description = "No token provided", body = ErrorResponse),
        (status = 403, description = "Invalid token or not an admin", body = ErrorResponse)
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(&current_user)?;
    let users = state.user_service.find_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID (own profile or admin)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "No token provided", body = ErrorResponse),
        (status = 403, description = "Invalid token or not the owner", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let id = parse_user_id(&id)?;
    let user = state
        .user_service
        .find_by_id(id, current_user.id, current_user.role)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Block or unblock a user (own account or admin)
#[utoipa::path(
    put,
    path = "/api/users/block/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Block state toggled", body = BlockResponse),
        (status = 401, description = "No token provided", body = ErrorResponse),
        (status = 403, description = "Invalid token or not the owner", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn toggle_block(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BlockResponse>> {
    let id = parse_user_id(&id)?;
    let user = state
        .user_service
        .toggle_block(id, current_user.id, current_user.role)
        .await?;

    let message = if user.is_active {
        MSG_USER_UNBLOCKED
    } else {
        MSG_USER_BLOCKED
    };

    Ok(Json(BlockResponse {
        message: message.to_string(),
        user: UserResponse::from(user),
    }))
}
