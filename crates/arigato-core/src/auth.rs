use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use tracing::info;

use arigato_types::models::{Avatar, User};

use crate::{CoreError, Journal, Result, Session};

impl Journal {
    /// Create a user and sign them in. The identifier is immutable and
    /// must be unique; id, display name and password are all required.
    pub fn register(&self, user_id: &str, name: &str, password: &str) -> Result<Session> {
        let user_id = user_id.trim();
        let name = name.trim();

        if user_id.is_empty() || name.is_empty() || password.is_empty() {
            return Err(CoreError::Validation(
                "user id, display name and password are all required".to_string(),
            ));
        }

        let mut users = self.store().load_users()?;
        if users.iter().any(|u| u.user_id == user_id) {
            return Err(CoreError::DuplicateUser(user_id.to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| CoreError::Credential)?
            .to_string();

        let user = User {
            user_id: user_id.to_string(),
            name: name.to_string(),
            password: password_hash,
            bio: String::new(),
            avatar: Avatar::default(),
            following: vec![],
            blocked: vec![],
            push_token: None,
            created_at: Utc::now().timestamp_millis(),
        };

        users.push(user.clone());
        self.store().replace_users(&users)?;
        self.store().set_session_user(&user)?;

        info!("Registered user {}", user.user_id);
        Ok(Session::new(user))
    }

    /// Verify credentials and sign in. Unknown id and wrong password
    /// collapse into the same error.
    pub fn login(&self, user_id: &str, password: &str) -> Result<Session> {
        let user = self
            .find_user(user_id.trim())?
            .ok_or(CoreError::Authentication)?;

        let parsed_hash =
            PasswordHash::new(&user.password).map_err(|_| CoreError::Authentication)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| CoreError::Authentication)?;

        self.store().set_session_user(&user)?;
        Ok(Session::new(user))
    }

    /// Destroy the persisted client session. The consumed [`Session`]
    /// makes further operations with it a compile error, not a runtime one.
    pub fn logout(&self, session: Session) -> Result<()> {
        self.store().clear_session_user()?;
        info!("Signed out {}", session.user_id());
        Ok(())
    }

    /// Restore the persisted client session, if one survives from a
    /// previous run.
    pub fn resume(&self) -> Result<Option<Session>> {
        Ok(self.store().session_user()?.map(Session::new))
    }

    /// Session for an identity authenticated out-of-band (a verified API
    /// token). `None` when the record no longer exists.
    pub fn session_for(&self, user_id: &str) -> Result<Option<Session>> {
        Ok(self.find_user(user_id)?.map(Session::new))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arigato_store::MemoryStore;

    use crate::{CoreError, Journal};

    fn journal() -> Journal {
        Journal::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn register_then_login() {
        let journal = journal();
        journal.register("alice", "Alice", "s3cret").unwrap();

        let session = journal.login("alice", "s3cret").unwrap();
        assert_eq!(session.user_id(), "alice");
        assert_eq!(session.user().name, "Alice");
        // The stored credential is a hash, never the password itself.
        assert_ne!(session.user().password, "s3cret");
    }

    #[test]
    fn duplicate_user_id_rejected() {
        let journal = journal();
        journal.register("alice", "Alice", "s3cret").unwrap();

        let err = journal.register("alice", "Other Alice", "pw").unwrap_err();
        assert!(matches!(err, CoreError::DuplicateUser(id) if id == "alice"));
    }

    #[test]
    fn empty_fields_rejected_without_mutation() {
        let journal = journal();
        assert!(matches!(
            journal.register("", "Alice", "pw"),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            journal.register("alice", "  ", "pw"),
            Err(CoreError::Validation(_))
        ));
        assert!(journal.find_user("alice").unwrap().is_none());
    }

    #[test]
    fn login_failure_is_one_generic_error() {
        let journal = journal();
        journal.register("alice", "Alice", "s3cret").unwrap();

        let unknown = journal.login("nobody", "s3cret").unwrap_err();
        let wrong = journal.login("alice", "wrong").unwrap_err();
        assert!(matches!(unknown, CoreError::Authentication));
        assert!(matches!(wrong, CoreError::Authentication));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn resume_and_logout() {
        let journal = journal();
        let session = journal.register("alice", "Alice", "s3cret").unwrap();

        let resumed = journal.resume().unwrap().expect("session persisted");
        assert_eq!(resumed.user_id(), "alice");

        journal.logout(session).unwrap();
        assert!(journal.resume().unwrap().is_none());
    }
}
