use serde::{Deserialize, Serialize};

/// A user's avatar: either a short glyph (emoji) or an embedded `data:`
/// image payload. Stored as a single string field in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Avatar {
    Glyph(String),
    Image(String),
}

impl From<String> for Avatar {
    fn from(value: String) -> Self {
        if value.starts_with("data:") {
            Avatar::Image(value)
        } else {
            Avatar::Glyph(value)
        }
    }
}

impl From<Avatar> for String {
    fn from(avatar: Avatar) -> Self {
        match avatar {
            Avatar::Glyph(s) | Avatar::Image(s) => s,
        }
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Avatar::Glyph("👤".to_string())
    }
}

/// A registered user. The identifier is chosen at registration and never
/// changes; the display name, bio, avatar and relationship sets mutate in
/// place. `password` holds the salted credential hash and must never cross
/// the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: Avatar,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub blocked: Vec<String>,
    #[serde(default)]
    pub push_token: Option<String>,
    pub created_at: i64,
}

/// A thank-you note. Sender and recipient names are snapshots taken at send
/// time: a later display-name change must not rewrite history. `root_id`
/// absent means this message is itself a thread root. Timestamps are UTC
/// epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from_id: String,
    pub from_name: String,
    pub to_id: String,
    pub to_name: String,
    pub body: String,
    pub created_at: i64,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub reply_to: Option<ReplySnippet>,
    #[serde(default)]
    pub root_id: Option<String>,
}

/// Denormalized copy of the message being replied to: a snapshot, not a
/// live reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplySnippet {
    pub id: String,
    pub name: String,
    pub text: String,
}

/// Optional thread context attached to a send, copied onto the new message
/// verbatim.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub reply_to: Option<ReplySnippet>,
    pub root_id: Option<String>,
}

/// How the viewer relates to a target user. Computed fresh from the
/// relationship sets on every query, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    None,
    Following,
    Blocked,
    Myself,
}
