use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::IdentityResponseData;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

pub async fn get_identity<IS: IdentityServicePort>(
    State(state): State<AppState<IS>>,
    Path(identity_id): Path<String>,
) -> Result<ApiSuccess<IdentityResponseData>, ApiError> {
    let identity_id = IdentityId::from_string(&identity_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .identity_service
        .get_identity(&identity_id)
        .await
        .map_err(ApiError::from)
        .map(|ref identity| ApiSuccess::new(StatusCode::OK, identity.into()))
}
