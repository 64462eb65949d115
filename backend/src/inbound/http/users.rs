//! User account handlers.
//!
//! ```text
//! POST /api/v1/i/userLogin    {"username":"ada","password":"s3cret!"}
//! POST /api/v1/create         {"username":"ada","password":"..","passwordRepeated":".."}
//! GET  /api/v1/i/user/{id}
//! POST /api/v1/i/uploadImage  multipart/form-data; file=<image>
//! POST /api/v1/getUserList    current=1&rowCount=10&searchPhrase=ada
//! ```
//!
//! Every handler except `getUserList` answers with an [`Envelope`].

use std::str::FromStr;

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, get, post, web};
use futures_util::TryStreamExt;
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{CreateUserError, UserListQuery};
use crate::domain::{
    AvatarImage, AvatarValidationError, Envelope, Error, ErrorCode, FieldViolation,
    LoginCredentials, UploadResult, User, UserCreateForm, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const LOGIN_SUCCEEDED: &str = "user login succeeded";
const LOGIN_FAILED: &str = "user login failed";
const CREATE_INVALID: &str = "user_create error: failed validation";
const CREATE_DUPLICATE: &str = "create user failed: username already exists";
const CREATE_SUCCEEDED: &str = "create user success";
const USER_FOUND: &str = "user information";
const USER_NOT_FOUND: &str = "user not found";
const AVATAR_UPLOADED: &str = "user avatar uploaded";
const AVATAR_FIELD: &str = "file";

/// Login request body for `POST /api/v1/i/userLogin`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Authenticate, establish a session and return the signed-in user.
///
/// Blank or wrong credentials are a failure envelope, not an HTTP error.
#[utoipa::path(
    post,
    path = "/api/v1/i/userLogin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login outcome", body = crate::inbound::http::schemas::UserEnvelope,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Malformed body", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "userLogin",
    security([])
)]
#[post("/i/userLogin")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<Envelope<User>>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = match LoginCredentials::try_from_parts(&username, &password) {
        Ok(credentials) => credentials,
        Err(error) => {
            debug!(%error, "login rejected before authentication");
            return Ok(web::Json(Envelope::failure(LOGIN_FAILED)));
        }
    };

    let user_id = match state.login.authenticate(&credentials).await {
        Ok(id) => id,
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            return Ok(web::Json(Envelope::failure(LOGIN_FAILED)));
        }
        Err(error) => return Err(error),
    };
    session.persist_user(user_id)?;

    let envelope = match state.users.find_by_id(user_id).await? {
        Some(user) => Envelope::success_with(LOGIN_SUCCEEDED, user),
        None => {
            warn!(%user_id, "authenticated user vanished before lookup");
            Envelope::failure(LOGIN_FAILED)
        }
    };
    Ok(web::Json(envelope))
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/v1/create",
    request_body = UserCreateForm,
    responses(
        (status = 200, description = "User created", body = crate::inbound::http::schemas::MessageEnvelope),
        (status = 200, description = "Validation failed", body = crate::inbound::http::schemas::ViolationsEnvelope),
        (status = 400, description = "Malformed body", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "create",
    security([])
)]
#[post("/create")]
pub async fn create(
    state: web::Data<HttpState>,
    payload: web::Json<UserCreateForm>,
) -> ApiResult<HttpResponse> {
    let request = match payload.into_inner().validate() {
        Ok(request) => request,
        Err(violations) => {
            debug!(count = violations.len(), "create-user form rejected");
            let envelope: Envelope<Vec<FieldViolation>> =
                Envelope::failure_with(CREATE_INVALID, violations);
            return Ok(HttpResponse::Ok().json(envelope));
        }
    };

    match state.commands.create(request).await {
        Ok(_) => Ok(HttpResponse::Ok().json(Envelope::<()>::success(CREATE_SUCCEEDED))),
        Err(CreateUserError::DuplicateUsername { username }) => {
            warn!(%username, "create user failed: username already exists");
            Ok(HttpResponse::Ok().json(Envelope::<()>::failure(CREATE_DUPLICATE)))
        }
        Err(CreateUserError::Failed(error)) => Err(error),
    }
}

/// Fetch a user by id.
///
/// Ids that are not positive integers are reported like missing users.
#[utoipa::path(
    get,
    path = "/api/v1/i/user/{id}",
    params(("id" = String, Path, description = "Numeric user id")),
    responses(
        (status = 200, description = "User found", body = crate::inbound::http::schemas::UserEnvelope),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User not found", body = crate::inbound::http::schemas::UserEnvelope)
    ),
    tags = ["users"],
    operation_id = "findByUserId"
)]
#[get("/i/user/{id}")]
pub async fn find_by_user_id(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let not_found = || HttpResponse::NotFound().json(Envelope::<User>::failure(USER_NOT_FOUND));

    let Ok(id) = UserId::from_str(path.as_str()) else {
        debug!(raw = %path, "unparseable user id");
        return Ok(not_found());
    };
    Ok(match state.users.find_by_id(id).await? {
        Some(user) => HttpResponse::Ok().json(Envelope::success_with(USER_FOUND, user)),
        None => not_found(),
    })
}

/// Replace the signed-in user's avatar.
#[utoipa::path(
    post,
    path = "/api/v1/i/uploadImage",
    request_body(content_type = "multipart/form-data", description = "Image in the `file` part"),
    responses(
        (status = 200, description = "Avatar stored", body = crate::inbound::http::schemas::UploadEnvelope),
        (status = 400, description = "Missing, empty, oversized or unsupported file", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "uploadImage"
)]
#[post("/i/uploadImage")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<web::Json<Envelope<UploadResult>>> {
    let user_id = session.require_user_id()?;
    let image = read_avatar(payload, state.avatar_max_bytes).await?;
    let result = state.avatars.upload_avatar(user_id, image).await?;
    Ok(web::Json(Envelope::success_with(AVATAR_UPLOADED, result)))
}

fn map_multipart_error(error: actix_multipart::MultipartError) -> Error {
    Error::invalid_request("invalid multipart body")
        .with_details(json!({ "reason": error.to_string() }))
}

fn map_avatar_error(error: AvatarValidationError) -> Error {
    let code = match &error {
        AvatarValidationError::MissingFile => "missing_file",
        AvatarValidationError::Empty => "empty",
        AvatarValidationError::TooLarge { .. } => "too_large",
        AvatarValidationError::UnsupportedContentType { .. } => "unsupported_content_type",
        AvatarValidationError::ContentMismatch { .. } => "content_mismatch",
    };
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": AVATAR_FIELD, "code": code }))
}

/// Pull the `file` part out of the multipart stream, failing as soon as the
/// next chunk would take it past `max_bytes`.
async fn read_avatar(mut payload: Multipart, max_bytes: usize) -> Result<AvatarImage, Error> {
    while let Some(field) = payload.try_next().await.map_err(map_multipart_error)? {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let declared = field.content_type().map(ToString::to_string);
        let original_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);
        let bytes = read_capped(field, max_bytes).await?;
        return AvatarImage::try_new(declared.as_deref(), original_name, bytes, max_bytes)
            .map_err(map_avatar_error);
    }
    Err(map_avatar_error(AvatarValidationError::MissingFile))
}

async fn read_capped(mut field: Field, max_bytes: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(map_multipart_error)? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(map_avatar_error(AvatarValidationError::TooLarge {
                max: max_bytes,
            }));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Bootgrid paging parameters.
///
/// Numbers arrive as text so a malformed value is reported as a bad request
/// rather than silently falling through to defaults.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserListParams {
    /// 1-based page number; defaults to 1.
    #[param(value_type = Option<i64>)]
    pub current: Option<String>,
    /// Rows per page, `-1` for all rows; defaults to 10.
    #[param(value_type = Option<i64>)]
    pub row_count: Option<String>,
    /// Case-insensitive substring matched against username and email.
    pub search_phrase: Option<String>,
}

fn parse_number(name: &'static str, raw: Option<&str>) -> Result<Option<i64>, Error> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            Error::invalid_request(format!("{name} must be an integer"))
                .with_details(json!({ "field": name, "value": value }))
        }),
    }
}

impl UserListParams {
    /// Fill each absent field from `fallback`.
    fn or(self, fallback: Self) -> Self {
        Self {
            current: self.current.or(fallback.current),
            row_count: self.row_count.or(fallback.row_count),
            search_phrase: self.search_phrase.or(fallback.search_phrase),
        }
    }

    fn into_query(self) -> Result<UserListQuery, Error> {
        let current = parse_number("current", self.current.as_deref())?;
        let row_count = parse_number("rowCount", self.row_count.as_deref())?;
        let request = PageRequest::from_raw(current, row_count).map_err(|error| {
            Error::invalid_request(error.to_string())
                .with_details(json!({ "current": current, "rowCount": row_count }))
        })?;
        Ok(UserListQuery::new(request, self.search_phrase))
    }
}

/// List users a page at a time.
///
/// Parameters may arrive in the query string, a form-encoded body or both; a
/// query-string value wins over the same field in the form. The page is
/// returned without an envelope.
#[utoipa::path(
    post,
    path = "/api/v1/getUserList",
    params(UserListParams),
    responses(
        (status = 200, description = "Page of users", body = crate::inbound::http::schemas::UserPage),
        (status = 400, description = "Invalid paging parameters", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserList",
    security([])
)]
#[post("/getUserList")]
pub async fn get_user_list(
    state: web::Data<HttpState>,
    query: web::Query<UserListParams>,
    form: Option<web::Form<UserListParams>>,
) -> ApiResult<web::Json<Page<User>>> {
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let query = query.into_inner().or(form).into_query()?;
    let page = state.users.list_users(&query).await?;
    Ok(web::Json(page))
}

/// Register the user handlers under the current scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(create)
        .service(find_by_user_id)
        .service(upload_image)
        .service(get_user_list);
}
