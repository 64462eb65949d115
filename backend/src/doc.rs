//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers:
//!
//! - **Paths**: the user endpoints under `/api/v1` and the health probes.
//! - **Schemas**: domain types that derive `ToSchema` directly plus the
//!   schema-only mirrors in [`crate::inbound::http::schemas`] for payloads the
//!   domain serialises by hand.
//! - **Security**: the session cookie issued by `POST /api/v1/i/userLogin`.
//!
//! Swagger UI serves the document in debug builds.

use crate::domain::{FieldViolation, Role, UploadResult, User, UserCreateForm};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, MessageEnvelope, UploadEnvelope, UserEnvelope, UserPage,
    ViolationsEnvelope,
};
use crate::inbound::http::users::LoginRequest;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/i/userLogin.",
            ))),
        );
    }
}

/// OpenAPI document for the accounts REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Accounts API",
        description = "User registration, session login, avatar upload and user listing."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::create,
        crate::inbound::http::users::find_by_user_id,
        crate::inbound::http::users::upload_image,
        crate::inbound::http::users::get_user_list,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Role,
        UploadResult,
        FieldViolation,
        UserCreateForm,
        LoginRequest,
        UserPage,
        UserEnvelope,
        MessageEnvelope,
        ViolationsEnvelope,
        UploadEnvelope,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "users", description = "Account registration, login and lookup"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
