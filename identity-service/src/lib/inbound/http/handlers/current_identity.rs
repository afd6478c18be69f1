use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::IdentityResponseData;
use crate::inbound::http::middleware::AuthenticatedIdentity;

/// Profile of the caller, as resolved by the authentication middleware.
pub async fn current_identity(
    Extension(current): Extension<AuthenticatedIdentity>,
) -> Result<ApiSuccess<IdentityResponseData>, ApiError> {
    tracing::debug!(identity_id = %current.id(), "Current identity requested");

    Ok(ApiSuccess::new(StatusCode::OK, current.identity().into()))
}
