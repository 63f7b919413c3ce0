//! Registration and login handlers.

use std::borrow::Cow;

use axum::{extract::State, http::StatusCode, response::Json, routing::post, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::{
    is_valid_role, BIRTH_DATE_FORMAT, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, MSG_USER_CREATED,
};
use crate::domain::{Registration, UserResponse, UserRole};
use crate::errors::{AppError, AppResult, ErrorResponse};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    #[validate(
        custom(function = "validate_full_name"),
        length(max = 255, message = "fullName must be at most 255 characters")
    )]
    #[schema(example = "Jane Doe", max_length = 255)]
    pub full_name: String,
    /// Birth date in yyyy-MM-dd format, not in the future
    #[serde(default)]
    #[validate(custom(function = "validate_birth_date"))]
    #[schema(example = "1990-05-17")]
    pub birth_date: String,
    /// User email address
    #[serde(default)]
    #[validate(
        custom(function = "validate_email_address"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    #[schema(example = "jane@example.com")]
    pub email: String,
    /// Password (6 to 128 characters)
    #[serde(default)]
    #[validate(custom(function = "validate_new_password"))]
    #[schema(example = "s3cret!", min_length = 6, max_length = 128)]
    pub password: String,
    /// Optional role, `user` when omitted
    #[validate(custom(function = "validate_role"))]
    #[schema(example = "user")]
    pub role: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[serde(default)]
    #[validate(custom(function = "validate_email_address"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    /// User password
    #[serde(default)]
    #[validate(custom(function = "validate_present_password"))]
    #[schema(example = "s3cret!")]
    pub password: String,
}

/// Registration result
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "User created")]
    pub message: String,
    pub user: UserResponse,
}

/// Login result
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the Authorization header
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserResponse,
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("required", "fullName is required"));
    }
    Ok(())
}

/// Parse a `yyyy-MM-dd` birth date.
pub(crate) fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, BIRTH_DATE_FORMAT).ok()
}

fn validate_birth_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("required", "birthDate is required"));
    }
    match parse_birth_date(value) {
        None => Err(rule(
            "format",
            "birthDate must be a valid date in yyyy-MM-dd format",
        )),
        Some(date) if date > Utc::now().date_naive() => {
            Err(rule("range", "birthDate cannot be in the future"))
        }
        Some(_) => Ok(()),
    }
}

fn validate_email_address(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("required", "email is required"));
    }
    if !value.validate_email() {
        return Err(rule("email", "email must be a valid email"));
    }
    Ok(())
}

fn validate_new_password(value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count() as u64;
    if len == 0 {
        return Err(rule("required", "password is required"));
    }
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
        return Err(rule(
            "length",
            "password must be between 6 and 128 characters",
        ));
    }
    Ok(())
}

fn validate_present_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rule("required", "password is required"));
    }
    Ok(())
}

fn validate_role(value: &str) -> Result<(), ValidationError> {
    if is_valid_role(value) {
        Ok(())
    } else {
        Err(rule("role", "role must be one of: user, admin"))
    }
}

/// Create registration and login routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Validation error or email already in use", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let birth_date = parse_birth_date(&payload.birth_date).ok_or_else(|| {
        AppError::field("birthDate", "birthDate must be a valid date in yyyy-MM-dd format")
    })?;

    let user = state
        .user_service
        .register(Registration {
            full_name: payload.full_name.trim().to_string(),
            birth_date,
            email: payload.email,
            password: payload.password,
            role: payload.role.as_deref().and_then(UserRole::parse),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: MSG_USER_CREATED.to_string(),
            user: UserResponse::from(user),
        }),
    ))
}

/// Login and get a bearer token
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let session = state
        .user_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token,
        user: UserResponse::from(session.user),
    }))
}
