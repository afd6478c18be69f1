use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;

use super::handlers::ApiError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::ports::IdentityServicePort;
use crate::identity::errors::AuthError;
use crate::inbound::http::router::AppState;

/// Header accepted when no `Authorization` header is present.
pub const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// Request context of a protected route: the identity the bearer token resolved to.
///
/// Inserted into the request extensions by [`authenticate`]; handlers take it with
/// `Extension<AuthenticatedIdentity>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    identity: Identity,
}

impl AuthenticatedIdentity {
    pub fn id(&self) -> IdentityId {
        self.identity.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Middleware that validates bearer tokens and attaches the resolved identity.
///
/// No token yields `Unauthenticated`; a token that fails verification or names an
/// identity that no longer exists yields `Unauthorized`. Either way the downstream
/// handler never runs.
pub async fn authenticate<IS: IdentityServicePort>(
    State(state): State<AppState<IS>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers())?;

    let identity = state.identity_service.authenticate(token).await?;
    tracing::debug!(identity_id = %identity.id, "Request authenticated");

    req.extensions_mut()
        .insert(AuthenticatedIdentity { identity });

    Ok(next.run(req).await)
}

fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::Unauthenticated)?;

        // The scheme name is case-insensitive
        return match value.trim().split_once(' ') {
            Some((scheme, token))
                if scheme.eq_ignore_ascii_case("Bearer") && !token.trim().is_empty() =>
            {
                Ok(token.trim())
            }
            _ => Err(AuthError::Unauthenticated),
        };
    }

    headers
        .get(LEGACY_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Unauthenticated)
}
