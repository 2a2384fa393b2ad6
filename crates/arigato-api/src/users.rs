use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use arigato_core::{ProfileUpdate, ProfileView};
use arigato_types::api::{
    Claims, ProfileResponse, PushTokenRequest, RelationshipResponse, UpdateProfileRequest,
    UserSummary,
};
use arigato_types::models::Avatar;

use crate::{core_error, join_error, session_for_claims};
use crate::auth::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub user_id: String,
}

fn profile_response(view: ProfileView) -> ProfileResponse {
    ProfileResponse {
        user_id: view.user.user_id,
        name: view.user.name,
        bio: view.user.bio,
        avatar: view.user.avatar,
        following_count: view.following_count,
        follower_count: view.follower_count,
        follows_you: view.follows_you,
        relationship: view.relationship,
    }
}

pub async fn profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let view = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        state
            .journal
            .profile(&session, &user_id)
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(profile_response(view)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let view = tokio::task::spawn_blocking(move || {
        let mut session = session_for_claims(&state, &claims)?;
        let update = ProfileUpdate {
            name: req.name,
            bio: req.bio,
            avatar: req.avatar.map(Avatar::from),
        };
        state
            .journal
            .update_profile(&mut session, update)
            .map_err(core_error)?;
        state
            .journal
            .profile(&session, session.user_id())
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(profile_response(view)))
}

/// Exact-id lookup for the search box. The searcher never finds
/// themselves; a blocked target is still returned, with the relationship
/// reported so the caller can render it.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    let view = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        let Some(found) = state
            .journal
            .search_user(&session, &query.user_id)
            .map_err(core_error)?
        else {
            return Ok(None);
        };
        state
            .journal
            .profile(&session, &found.user_id)
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(profile_response(view)))
}

pub async fn follow(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    relationship_change(state, claims, user_id, |journal, session, target| {
        journal.follow(session, target)
    })
    .await
}

pub async fn unfollow(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    relationship_change(state, claims, user_id, |journal, session, target| {
        journal.unfollow(session, target)
    })
    .await
}

pub async fn block(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    relationship_change(state, claims, user_id, |journal, session, target| {
        journal.block(session, target)
    })
    .await
}

pub async fn unblock(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    relationship_change(state, claims, user_id, |journal, session, target| {
        journal.unblock(session, target)
    })
    .await
}

/// Shared shape of the four edge mutations: run the operation, then report
/// the resulting relationship so the caller can rerender without a second
/// round trip.
async fn relationship_change<F>(
    state: AppState,
    claims: Claims,
    target_id: String,
    op: F,
) -> Result<Json<RelationshipResponse>, StatusCode>
where
    F: FnOnce(
            &arigato_core::Journal,
            &mut arigato_core::Session,
            &str,
        ) -> arigato_core::Result<()>
        + Send
        + 'static,
{
    let relationship = tokio::task::spawn_blocking(move || {
        let mut session = session_for_claims(&state, &claims)?;
        op(&state.journal, &mut session, &target_id).map_err(core_error)?;
        Ok::<_, StatusCode>(state.journal.relationship(&session, &target_id))
    })
    .await
    .map_err(join_error)??;

    Ok(Json(RelationshipResponse { relationship }))
}

pub async fn following(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    user_list(state, claims, |journal, session| {
        journal.following_users(session)
    })
    .await
}

pub async fn followers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    user_list(state, claims, |journal, session| {
        journal.follower_users(session)
    })
    .await
}

pub async fn blocked(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    user_list(state, claims, |journal, session| {
        journal.blocked_users(session)
    })
    .await
}

pub async fn recipients(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, StatusCode> {
    user_list(state, claims, |journal, session| journal.recipients(session)).await
}

async fn user_list<F>(
    state: AppState,
    claims: Claims,
    list: F,
) -> Result<Json<Vec<UserSummary>>, StatusCode>
where
    F: FnOnce(
            &arigato_core::Journal,
            &arigato_core::Session,
        ) -> arigato_core::Result<Vec<arigato_types::models::User>>
        + Send
        + 'static,
{
    let users = tokio::task::spawn_blocking(move || {
        let session = session_for_claims(&state, &claims)?;
        list(&state.journal, &session).map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(users.iter().map(UserSummary::from).collect()))
}

pub async fn set_push_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PushTokenRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    tokio::task::spawn_blocking(move || {
        let mut session = session_for_claims(&state, &claims)?;
        state
            .journal
            .set_push_token(&mut session, req.token)
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    Ok(StatusCode::NO_CONTENT)
}
