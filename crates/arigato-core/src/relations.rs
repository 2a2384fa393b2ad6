use tracing::debug;

use arigato_types::models::{RelationshipStatus, User};

use crate::{Journal, Result, Session};

impl Journal {
    /// Persist an updated users collection and refresh the acting session's
    /// snapshot. The persisted client session record is refreshed too when
    /// it carries the same identity.
    pub(crate) fn commit_users(&self, session: &mut Session, users: Vec<User>) -> Result<()> {
        self.store().replace_users(&users)?;
        if let Some(me) = users.into_iter().find(|u| u.user_id == session.user_id()) {
            if self
                .store()
                .session_user()?
                .is_some_and(|s| s.user_id == me.user_id)
            {
                self.store().set_session_user(&me)?;
            }
            session.replace(me);
        }
        Ok(())
    }

    /// Follow a user. Idempotent; no-ops on self, on an unknown target,
    /// and when either party blocks the other. The block check lives here
    /// rather than in the caller so a follow edge can never coexist with a
    /// block edge.
    pub fn follow(&self, session: &mut Session, target_id: &str) -> Result<()> {
        if target_id == session.user_id() {
            return Ok(());
        }

        let mut users = self.store().load_users()?;
        let Some(target) = users.iter().find(|u| u.user_id == target_id) else {
            return Ok(());
        };
        let crosses_block = target.blocked.iter().any(|id| id == session.user_id())
            || session.user().blocked.iter().any(|id| id == target_id);
        if crosses_block {
            debug!(
                "Refusing follow across a block: {} -> {}",
                session.user_id(),
                target_id
            );
            return Ok(());
        }

        let Some(me) = users.iter_mut().find(|u| u.user_id == session.user_id()) else {
            return Ok(());
        };
        if me.following.iter().any(|id| id == target_id) {
            return Ok(());
        }

        me.following.push(target_id.to_string());
        self.commit_users(session, users)
    }

    /// Remove a follow edge. Idempotent no-op when absent.
    pub fn unfollow(&self, session: &mut Session, target_id: &str) -> Result<()> {
        let mut users = self.store().load_users()?;
        let Some(me) = users.iter_mut().find(|u| u.user_id == session.user_id()) else {
            return Ok(());
        };

        let before = me.following.len();
        me.following.retain(|id| id != target_id);
        if me.following.len() == before {
            return Ok(());
        }

        self.commit_users(session, users)
    }

    /// Block a user. On first application this also severs any follow
    /// relationship in both directions; both touched records are committed
    /// in one store write so no reader observes half the severing.
    pub fn block(&self, session: &mut Session, target_id: &str) -> Result<()> {
        if target_id == session.user_id() {
            return Ok(());
        }

        let mut users = self.store().load_users()?;
        if !users.iter().any(|u| u.user_id == target_id) {
            return Ok(());
        }
        let Some(me) = users.iter_mut().find(|u| u.user_id == session.user_id()) else {
            return Ok(());
        };
        if me.blocked.iter().any(|id| id == target_id) {
            return Ok(());
        }

        me.blocked.push(target_id.to_string());
        me.following.retain(|id| id != target_id);

        let my_id = session.user_id().to_string();
        if let Some(target) = users.iter_mut().find(|u| u.user_id == target_id) {
            target.following.retain(|id| id != &my_id);
        }

        self.commit_users(session, users)
    }

    /// Drop a block edge. Severed follow relationships are not restored.
    pub fn unblock(&self, session: &mut Session, target_id: &str) -> Result<()> {
        let mut users = self.store().load_users()?;
        let Some(me) = users.iter_mut().find(|u| u.user_id == session.user_id()) else {
            return Ok(());
        };

        let before = me.blocked.len();
        me.blocked.retain(|id| id != target_id);
        if me.blocked.len() == before {
            return Ok(());
        }

        self.commit_users(session, users)
    }

    pub fn is_following(&self, session: &Session, target_id: &str) -> bool {
        session.user().following.iter().any(|id| id == target_id)
    }

    pub fn is_blocked(&self, session: &Session, target_id: &str) -> bool {
        session.user().blocked.iter().any(|id| id == target_id)
    }

    /// Count of users whose following set contains `user_id`.
    pub fn follower_count(&self, user_id: &str) -> Result<usize> {
        let users = self.store().load_users()?;
        Ok(users
            .iter()
            .filter(|u| u.following.iter().any(|id| id == user_id))
            .count())
    }

    pub fn following_count(&self, user_id: &str) -> Result<usize> {
        Ok(self
            .find_user(user_id)?
            .map(|u| u.following.len())
            .unwrap_or(0))
    }

    /// Viewer-to-target relationship, computed fresh from the session's
    /// current sets.
    pub fn relationship(&self, session: &Session, target_id: &str) -> RelationshipStatus {
        if target_id == session.user_id() {
            RelationshipStatus::Myself
        } else if self.is_blocked(session, target_id) {
            RelationshipStatus::Blocked
        } else if self.is_following(session, target_id) {
            RelationshipStatus::Following
        } else {
            RelationshipStatus::None
        }
    }

    /// Users the session follows.
    pub fn following_users(&self, session: &Session) -> Result<Vec<User>> {
        let users = self.store().load_users()?;
        Ok(users
            .into_iter()
            .filter(|u| session.user().following.iter().any(|id| id == &u.user_id))
            .collect())
    }

    /// Users who follow the session.
    pub fn follower_users(&self, session: &Session) -> Result<Vec<User>> {
        let users = self.store().load_users()?;
        Ok(users
            .into_iter()
            .filter(|u| u.following.iter().any(|id| id == session.user_id()))
            .collect())
    }

    /// Users the session has blocked.
    pub fn blocked_users(&self, session: &Session) -> Result<Vec<User>> {
        let users = self.store().load_users()?;
        Ok(users
            .into_iter()
            .filter(|u| session.user().blocked.iter().any(|id| id == &u.user_id))
            .collect())
    }

    /// Valid recipients for a new note: followed users, minus blocked.
    pub fn recipients(&self, session: &Session) -> Result<Vec<User>> {
        let me = session.user();
        let users = self.store().load_users()?;
        Ok(users
            .into_iter()
            .filter(|u| u.user_id != me.user_id)
            .filter(|u| me.following.iter().any(|id| id == &u.user_id))
            .filter(|u| !me.blocked.iter().any(|id| id == &u.user_id))
            .collect())
    }
}
