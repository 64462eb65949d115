//! OpenAPI schema definitions for wire types the domain keeps framework-free.
//!
//! The error payload, the response envelope and the user page are generic or
//! hand-serialised in the domain, so their documented shapes live here as
//! schema-only mirrors.

use utoipa::ToSchema;

use crate::domain::{FieldViolation, UploadResult, User};

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A dependency such as the database is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "invalid json body")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    details: Option<serde_json::Value>,
}

/// Envelope carrying a [`User`].
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserEnvelope {
    /// `1` on success, `0` on failure.
    #[schema(example = 1)]
    status: u8,
    #[schema(example = "user information")]
    message: String,
    data: Option<User>,
}

/// Envelope without a payload.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct MessageEnvelope {
    #[schema(example = 1)]
    status: u8,
    #[schema(example = "create user success")]
    message: String,
}

/// Envelope listing the rule violations of a rejected form.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ViolationsEnvelope {
    #[schema(example = 0)]
    status: u8,
    #[schema(example = "user_create error: failed validation")]
    message: String,
    data: Option<Vec<FieldViolation>>,
}

/// Envelope describing a stored avatar.
#[derive(ToSchema)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UploadEnvelope {
    #[schema(example = 1)]
    status: u8,
    #[schema(example = "user avatar uploaded")]
    message: String,
    data: Option<UploadResult>,
}

/// One page of users in bootgrid shape.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct UserPage {
    #[schema(example = 1)]
    current: u32,
    /// Page size, or `-1` when every row was requested.
    #[schema(example = 10)]
    row_count: i64,
    rows: Vec<User>,
    #[schema(example = 42)]
    total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[rstest]
    fn error_code_schema_lists_every_code() {
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        let json = schema_to_json::<ErrorCodeSchema>();
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(json.contains(code), "missing {code}");
        }
    }

    #[rstest]
    fn error_schema_uses_camel_case_trace_id() {
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_to_json::<ErrorSchema>().contains("traceId"));
    }

    #[rstest]
    fn user_page_uses_bootgrid_field_names() {
        let json = schema_to_json::<UserPage>();
        for field in ["current", "rowCount", "rows", "total"] {
            assert!(json.contains(field), "missing {field}");
        }
    }
}
