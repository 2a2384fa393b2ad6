use arigato_types::models::User;

/// The authenticated identity for one client context, passed explicitly
/// into every operation that needs one. Holds a snapshot of the user
/// record; mutations made through the journal refresh the snapshot in
/// place so subsequent reads observe them without re-fetching.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    pub(crate) fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.user_id
    }

    pub(crate) fn replace(&mut self, user: User) {
        self.user = user;
    }
}
