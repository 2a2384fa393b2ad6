use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::DateTime;

use arigato_core::InboxGroup;
use arigato_types::api::{
    Claims, InboxGroupResponse, MessageResponse, SendMessageRequest, UnreadResponse,
};
use arigato_types::models::{ReplySnippet, SendOptions};

use crate::auth::AppState;
use crate::{core_error, join_error, session_for_claims};

fn group_response(g: InboxGroup) -> InboxGroupResponse {
    InboxGroupResponse {
        counterpart_id: g.counterpart_id,
        counterpart_name: g.counterpart_name,
        count: g.count,
        latest: DateTime::from_timestamp_millis(g.latest).unwrap_or_default(),
        has_unread: g.has_unread,
    }
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let message = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;

        // The recipient record supplies the name snapshot and push token.
        let recipient = state
            .journal
            .find_user(&req.to_id)
            .map_err(core_error)?
            .ok_or(StatusCode::NOT_FOUND)?;

        // A stale reply reference degrades to a plain send.
        let reply_to = match &req.reply_to_message_id {
            Some(id) => state
                .journal
                .find_message(id)
                .map_err(core_error)?
                .map(|m| ReplySnippet {
                    id: m.id,
                    name: m.from_name,
                    text: m.body,
                }),
            None => None,
        };

        let message = state
            .journal
            .send(
                &session,
                &recipient.user_id,
                &recipient.name,
                &req.body,
                SendOptions {
                    reply_to,
                    root_id: None,
                },
            )
            .map_err(core_error)?;

        state.notifier.message_created(&message, Some(&recipient));
        Ok::<_, StatusCode>(message)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(&message))))
}

pub async fn timeline(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let messages = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        state.journal.timeline(&session).map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(
        messages.iter().map(MessageResponse::from).collect::<Vec<_>>(),
    ))
}

pub async fn received_groups(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let groups = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        state.journal.received_groups(&session).map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(
        groups.into_iter().map(group_response).collect::<Vec<_>>(),
    ))
}

/// Opening a sender's bucket is what marks it read; the response carries
/// the messages as they were listed.
pub async fn received_detail(
    State(state): State<AppState>,
    Path(from_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let messages = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        state
            .journal
            .open_received_detail(&session, &from_id)
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(
        messages.iter().map(MessageResponse::from).collect::<Vec<_>>(),
    ))
}

pub async fn sent_groups(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let groups = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        state.journal.sent_groups(&session).map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(
        groups.into_iter().map(group_response).collect::<Vec<_>>(),
    ))
}

pub async fn sent_detail(
    State(state): State<AppState>,
    Path(to_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let messages = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        state
            .journal
            .sent_detail(&session, &to_id)
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(
        messages.iter().map(MessageResponse::from).collect::<Vec<_>>(),
    ))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let unread = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        state.journal.unread_count(&session).map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(UnreadResponse { unread }))
}
