//! HTTP server assembly.
//!
//! Routes live under `/api/v1` behind a private cookie session; the health
//! probes and Swagger UI sit outside the session scope. Every response passes
//! through [`Trace`].

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{AvatarConfig, ServerConfig};

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::time::Duration;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use accounts::Trace;
#[cfg(debug_assertions)]
use accounts::doc::ApiDoc;
use accounts::inbound::http::error::configure_extractors;
use accounts::inbound::http::health::{HealthState, live, ready};
use accounts::inbound::http::session_config::SessionSettings;
use accounts::inbound::http::state::HttpState;
use accounts::inbound::http::users;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_COOKIE: &str = "session";
const SESSION_TTL_HOURS: i64 = 2;

/// Private (encrypted) cookie session carrying the signed-in user id.
fn session_middleware(settings: &SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(settings.same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
        )
        .build()
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: &SessionSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let api = web::scope("/api/v1")
        .wrap(session_middleware(session))
        .configure(users::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(configure_extractors)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the accounts server and mark it ready.
///
/// The returned [`Server`] must be awaited to accept connections. Readiness
/// is only signalled once adapters are built and the socket is bound.
///
/// # Errors
/// Returns [`std::io::Error`] when the avatar directory cannot be opened or
/// the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        session,
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let app_health = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(app_health.clone(), http_state.clone(), &session);

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Routing and middleware wiring of the assembled app.

    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use accounts::domain::TRACE_ID_HEADER;
    use rstest::rstest;
    use std::net::SocketAddr;

    fn settings() -> SessionSettings {
        SessionSettings {
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Strict,
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn probes_are_served_outside_the_api_scope() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ServerConfig::new(
            settings(),
            SocketAddr::from(([127, 0, 0, 1], 0)),
            AvatarConfig::new(dir.path()),
        );
        let health = web::Data::new(HealthState::new());
        let http_state = build_http_state(&config).expect("state");
        let app = test::init_service(build_app(health, http_state, &config.session)).await;

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/health/live").to_request())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(TRACE_ID_HEADER));
    }

    #[rstest]
    #[actix_rt::test]
    async fn login_issues_a_strict_http_only_session_cookie() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ServerConfig::new(
            settings(),
            SocketAddr::from(([127, 0, 0, 1], 0)),
            AvatarConfig::new(dir.path()),
        );
        let health = web::Data::new(HealthState::new());
        let http_state = build_http_state(&config).expect("state");
        let app = test::init_service(build_app(health, http_state, &config.session)).await;

        let create = test::TestRequest::post()
            .uri("/api/v1/create")
            .set_json(serde_json::json!({
                "username": "ada",
                "password": "s3cret!",
                "passwordRepeated": "s3cret!",
            }))
            .to_request();
        assert_eq!(test::call_service(&app, create).await.status(), StatusCode::OK);

        let login = test::TestRequest::post()
            .uri("/api/v1/i/userLogin")
            .set_json(serde_json::json!({ "username": "ada", "password": "s3cret!" }))
            .to_request();
        let response = test::call_service(&app, login).await;
        let cookie = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE)
            .expect("session cookie");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }
}
