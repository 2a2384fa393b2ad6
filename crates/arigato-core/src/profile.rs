use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use arigato_types::models::{Avatar, RelationshipStatus, User};

use crate::{CoreError, Journal, Result, Session};

/// A user profile as some viewer sees it.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub user: User,
    pub following_count: usize,
    pub follower_count: usize,
    pub follows_you: bool,
    pub relationship: RelationshipStatus,
}

/// Partial profile mutation; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<Avatar>,
}

/// An embedded image avatar must be a well-formed base64 data URL. Decoding
/// happens here once, at update time; resizing is the caller's concern.
fn validate_avatar(avatar: &Avatar) -> Result<()> {
    let Avatar::Image(url) = avatar else {
        return Ok(());
    };

    let payload = url
        .split_once(";base64,")
        .map(|(_, payload)| payload)
        .ok_or_else(|| {
            CoreError::Validation("avatar image must be a base64 data URL".to_string())
        })?;

    B64.decode(payload)
        .map(|_| ())
        .map_err(|_| CoreError::Validation("avatar image payload is not valid base64".to_string()))
}

impl Journal {
    /// Everything a profile card shows, computed fresh: counts over the
    /// current edge sets, plus the viewer-relative relationship.
    pub fn profile(&self, session: &Session, user_id: &str) -> Result<Option<ProfileView>> {
        let users = self.store().load_users()?;
        let Some(user) = users.iter().find(|u| u.user_id == user_id) else {
            return Ok(None);
        };

        let follower_count = users
            .iter()
            .filter(|u| u.following.iter().any(|id| id == user_id))
            .count();
        let follows_you = user_id != session.user_id()
            && user.following.iter().any(|id| id == session.user_id());

        Ok(Some(ProfileView {
            following_count: user.following.len(),
            follower_count,
            follows_you,
            relationship: self.relationship(session, user_id),
            user: user.clone(),
        }))
    }

    /// Apply a profile edit to the session's own record. Display name may
    /// not become empty; name snapshots on existing messages are left
    /// untouched by design.
    pub fn update_profile(&self, session: &mut Session, update: ProfileUpdate) -> Result<()> {
        if let Some(name) = &update.name
            && name.trim().is_empty()
        {
            return Err(CoreError::Validation("display name is required".to_string()));
        }
        if let Some(avatar) = &update.avatar {
            validate_avatar(avatar)?;
        }

        let mut users = self.store().load_users()?;
        let Some(me) = users.iter_mut().find(|u| u.user_id == session.user_id()) else {
            return Ok(());
        };

        if let Some(name) = update.name {
            me.name = name.trim().to_string();
        }
        if let Some(bio) = update.bio {
            me.bio = bio.trim().to_string();
        }
        if let Some(avatar) = update.avatar {
            me.avatar = avatar;
        }

        self.commit_users(session, users)
    }

    /// Register or clear the push delivery token for the session's device.
    pub fn set_push_token(&self, session: &mut Session, token: Option<String>) -> Result<()> {
        let mut users = self.store().load_users()?;
        let Some(me) = users.iter_mut().find(|u| u.user_id == session.user_id()) else {
            return Ok(());
        };

        me.push_token = token.filter(|t| !t.is_empty());
        self.commit_users(session, users)
    }
}
