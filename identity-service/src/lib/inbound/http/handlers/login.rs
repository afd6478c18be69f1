use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::IssuedToken;
use crate::domain::identity::models::LoginCommand;
use crate::domain::identity::ports::IdentityServicePort;
use crate::identity::errors::IdentityError;
use crate::inbound::http::router::AppState;

pub async fn login<IS: IdentityServicePort>(
    State(state): State<AppState<IS>>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    // A malformed email cannot belong to anyone; answer exactly as for a wrong password
    let email = EmailAddress::new(body.email)
        .map_err(|_| ApiError::from(IdentityError::InvalidCredentials))?;

    state
        .identity_service
        .login(LoginCommand {
            email,
            password: body.password,
        })
        .await
        .map_err(ApiError::from)
        .map(|issued| ApiSuccess::new(StatusCode::OK, issued.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for LoginResponseData {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.access_token,
            expires_at: issued.expires_at,
        }
    }
}
