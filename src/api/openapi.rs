//! OpenAPI documentation configuration.
//!
//! Served through Swagger UI at `/api/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, user_handler};
use crate::domain::{UserResponse, UserRole};
use crate::errors::{ErrorResponse, FieldError};

/// OpenAPI documentation for the user accounts service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Accounts API",
        version = "0.1.0",
        description = "User registration, authentication and account blocking",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        user_handler::list_users,
        user_handler::get_user,
        user_handler::toggle_block,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            ErrorResponse,
            FieldError,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::RegisterResponse,
            auth_handler::LoginResponse,
            user_handler::BlockResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Registration, login and user management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtained from /api/users/login"))
                        .build(),
                ),
            );
        }
    }
}
