//! Domain primitives, ports and services.
//!
//! Purpose: define strongly typed entities for user accounts and the ports
//! through which inbound and outbound adapters reach them. Types keep their
//! invariants in constructors and document serialisation contracts in their
//! Rustdoc.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport agnostic failure payload.
//! - `Envelope`: `{status, message, data?}` wrapper returned by user endpoints.
//! - `User` and its value types, `UserCreateForm` validation.
//! - `AvatarImage`/`UploadResult`: avatar upload contract.
//! - `UserService`: implementation of the driving ports.

pub mod auth;
pub mod avatar;
pub mod envelope;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_form;
pub mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::avatar::{
    AvatarContentType, AvatarImage, AvatarValidationError, DEFAULT_AVATAR_MAX_BYTES,
    StoredAvatar, UploadResult,
};
pub use self::envelope::{Envelope, EnvelopeStatus};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, NewUser, Role, StoredUser, USERNAME_MAX, USERNAME_MIN, User, UserId,
    UserValidationError, Username,
};
pub use self::user_form::{FieldViolation, PASSWORD_MIN, UserCreateForm, UserCreateRequest};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use accounts::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("user not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
