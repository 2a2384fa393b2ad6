use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};

use arigato_core::Journal;
use arigato_notify::Notifier;
use arigato_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};

use crate::{core_error, join_error};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub journal: Journal,
    pub notifier: Notifier,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let session = tokio::task::spawn_blocking(move || {
        st.journal
            .register(&req.user_id, &req.name, &req.password)
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    let token = create_token(&state.jwt_secret, session.user_id(), &session.user().name)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id: session.user_id().to_string(),
            name: session.user().name.clone(),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let st = state.clone();
    let session = tokio::task::spawn_blocking(move || {
        st.journal
            .login(&req.user_id, &req.password)
            .map_err(core_error)
    })
    .await
    .map_err(join_error)??;

    let token = create_token(&state.jwt_secret, session.user_id(), &session.user().name)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(AuthResponse {
        user_id: session.user_id().to_string(),
        name: session.user().name.clone(),
        token,
    }))
}

fn create_token(secret: &str, user_id: &str, name: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
