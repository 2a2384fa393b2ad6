pub mod auth;
pub mod messages;
pub mod middleware;
pub mod threads;
pub mod users;

use axum::http::StatusCode;
use tracing::error;

use arigato_core::{CoreError, Session};
use arigato_types::api::Claims;

use crate::auth::AppStateInner;

/// Map the core failure taxonomy onto HTTP statuses. Store and credential
/// failures stay opaque to the client.
pub(crate) fn core_error(err: CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::DuplicateUser(_) => StatusCode::CONFLICT,
        CoreError::Authentication => StatusCode::UNAUTHORIZED,
        CoreError::Credential | CoreError::Store(_) => {
            error!("Journal operation failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Rebuild the acting session from verified claims. The token may outlive
/// the record; a vanished user is just unauthorized.
pub(crate) fn session_for_claims(
    state: &AppStateInner,
    claims: &Claims,
) -> Result<Session, StatusCode> {
    state
        .journal
        .session_for(&claims.sub)
        .map_err(core_error)?
        .ok_or(StatusCode::UNAUTHORIZED)
}
