use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_identity::current_identity;
use super::handlers::get_identity::get_identity;
use super::handlers::login::login;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::identity::ports::IdentityServicePort;

pub struct AppState<IS: IdentityServicePort> {
    pub identity_service: Arc<IS>,
}

impl<IS: IdentityServicePort> Clone for AppState<IS> {
    fn clone(&self) -> Self {
        Self {
            identity_service: Arc::clone(&self.identity_service),
        }
    }
}

pub fn create_router<IS: IdentityServicePort>(identity_service: Arc<IS>) -> Router {
    let state = AppState { identity_service };

    let public_routes = Router::new()
        .route("/", get(|| async { "API Running" }))
        .route("/api/users", post(register::<IS>))
        .route("/api/auth/login", post(login::<IS>));

    let protected_routes = Router::new()
        .route("/api/auth", get(current_identity))
        .route("/api/users/:identity_id", get(get_identity::<IS>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<IS>,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            // Headers are left out: they carry bearer tokens
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
