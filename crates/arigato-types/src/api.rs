use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Avatar, Message, RelationshipStatus, ReplySnippet, User};

// -- JWT Claims --

/// JWT claims shared between the REST middleware and token creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub user_id: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub name: String,
    pub token: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub to_id: String,
    pub body: String,
    /// Message being replied to; resolved server-side into a snapshot.
    /// A stale id degrades to a plain send.
    #[serde(default)]
    pub reply_to_message_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadReplyRequest {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub from_id: String,
    pub from_name: String,
    pub to_id: String,
    pub to_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub reply_to: Option<ReplySnippet>,
    pub root_id: Option<String>,
}

impl From<&Message> for MessageResponse {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.clone(),
            from_id: m.from_id.clone(),
            from_name: m.from_name.clone(),
            to_id: m.to_id.clone(),
            to_name: m.to_name.clone(),
            body: m.body.clone(),
            created_at: DateTime::from_timestamp_millis(m.created_at).unwrap_or_default(),
            is_read: m.is_read,
            reply_to: m.reply_to.clone(),
            root_id: m.root_id.clone(),
        }
    }
}

// -- Inbox --

#[derive(Debug, Serialize)]
pub struct InboxGroupResponse {
    pub counterpart_id: String,
    pub counterpart_name: String,
    pub count: usize,
    pub latest: DateTime<Utc>,
    pub has_unread: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub unread: usize,
}

// -- Threads --

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub root_id: String,
    pub other_id: String,
    pub other_name: String,
    pub messages: Vec<MessageResponse>,
}

// -- Users --

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub user_id: String,
    pub name: String,
    pub avatar: Avatar,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.user_id.clone(),
            name: u.name.clone(),
            avatar: u.avatar.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub name: String,
    pub bio: String,
    pub avatar: Avatar,
    pub following_count: usize,
    pub follower_count: usize,
    pub follows_you: bool,
    pub relationship: RelationshipStatus,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushTokenRequest {
    /// `null` clears the registered token.
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RelationshipResponse {
    pub relationship: RelationshipStatus,
}
