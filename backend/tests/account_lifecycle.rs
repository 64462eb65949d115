//! End-to-end account flow through the full middleware stack.
//!
//! Registers a user, signs in, uploads an avatar and lists users against the
//! in-memory repository, with private cookie sessions and trace ids applied
//! as in production.

use std::sync::Arc;

use accounts::Trace;
use accounts::domain::{TRACE_ID_HEADER, UserService};
use accounts::inbound::http::error::configure_extractors;
use accounts::inbound::http::state::{HttpState, HttpStatePorts};
use accounts::inbound::http::users;
use accounts::outbound::avatars::FilesystemAvatarStore;
use accounts::outbound::memory::InMemoryUserRepository;
use accounts::outbound::password::Argon2PasswordHasher;
use actix_session::SessionMiddleware;
use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::{Value, json};
use tempfile::TempDir;

const BOUNDARY: &str = "accounts-boundary";
const GIF_BYTES: &[u8] = b"GIF89a\x01\0\x01\0\x80\0\0";

fn state(avatar_dir: &TempDir) -> HttpState {
    let service = Arc::new(UserService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(FilesystemAvatarStore::open(avatar_dir.path(), "/avatars").expect("avatar dir")),
        Arc::new(Argon2PasswordHasher::with_costs(8, 1, 1).expect("argon2 costs")),
    ));
    HttpState::new(HttpStatePorts {
        login: service.clone(),
        users: service.clone(),
        commands: service.clone(),
        avatars: service,
    })
}

fn session_cookie<B>(response: &actix_web::dev::ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

#[rstest]
#[actix_web::test]
async fn register_sign_in_upload_and_list() {
    let avatar_dir = tempfile::tempdir().expect("tempdir");
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .cookie_content_security(CookieContentSecurity::Private)
        .build();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(&avatar_dir)))
            .configure(configure_extractors)
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session)
                    .configure(users::configure),
            ),
    )
    .await;

    for name in ["ada", "grace"] {
        let request = test::TestRequest::post()
            .uri("/api/v1/create")
            .set_json(json!({
                "username": name,
                "password": "s3cret!",
                "passwordRepeated": "s3cret!",
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["status"], 1, "create {name}");
    }

    let login = test::TestRequest::post()
        .uri("/api/v1/i/userLogin")
        .set_json(json!({ "username": "grace", "password": "s3cret!" }))
        .to_request();
    let response = test::call_service(&app, login).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(TRACE_ID_HEADER));
    let cookie = session_cookie(&response).expect("session cookie");
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["status"], 1);
    assert_eq!(body["data"]["id"], 2);

    let mut payload = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"me.gif\"\r\n\
         Content-Type: image/gif\r\n\r\n"
    )
    .into_bytes();
    payload.extend_from_slice(GIF_BYTES);
    payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    let upload = test::TestRequest::post()
        .uri("/api/v1/i/uploadImage")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .cookie(cookie.clone())
        .set_payload(payload)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, upload).await;
    assert_eq!(body["status"], 1);
    let url = body["data"]["url"].as_str().expect("avatar url").to_owned();
    assert!(url.starts_with("/avatars/2-"), "unexpected url {url}");

    let lookup = test::TestRequest::get()
        .uri("/api/v1/i/user/2")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, lookup).await;
    assert_eq!(body["data"]["avatarUrl"], url.as_str());

    let list = test::TestRequest::post()
        .uri("/api/v1/getUserList")
        .set_form([("current", "1"), ("rowCount", "10"), ("searchPhrase", "GRA")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, list).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["rowCount"], 10);
    assert_eq!(body["rows"][0]["username"], "grace");
}

#[rstest]
#[actix_web::test]
async fn protected_endpoint_without_session_echoes_trace_id() {
    let avatar_dir = tempfile::tempdir().expect("tempdir");
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_secure(false)
        .build();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(&avatar_dir)))
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(session)
                    .configure(users::configure),
            ),
    )
    .await;

    let response = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/i/user/1").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["traceId"], header.as_str());
}
