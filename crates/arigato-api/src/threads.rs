use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use arigato_types::api::{Claims, MessageResponse, ThreadReplyRequest, ThreadResponse};

use crate::auth::AppState;
use crate::{core_error, join_error, session_for_claims};

pub async fn open_thread(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let thread = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        state
            .journal
            .open_thread(&session, &message_id)
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(ThreadResponse {
        root_id: thread.root_id,
        other_id: thread.other_id,
        other_name: thread.other_name,
        messages: thread.messages.iter().map(MessageResponse::from).collect(),
    }))
}

/// Reply within the thread anchored at `message_id`. The core resolves the
/// root and the other party; the anchoring message vanishing underneath us
/// is a 404, not an error.
pub async fn reply(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ThreadReplyRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let message = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        let thread = state
            .journal
            .open_thread(&session, &message_id)
            .map_err(core_error)?
            .ok_or(StatusCode::NOT_FOUND)?;

        let message = state
            .journal
            .reply_in_thread(&session, &thread, &req.body)
            .map_err(core_error)?;

        let recipient = state
            .journal
            .find_user(&thread.other_id)
            .map_err(core_error)?;
        state.notifier.message_created(&message, recipient.as_ref());

        Ok::<_, StatusCode>(message)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(&message))))
}
