use std::sync::Mutex;

use arigato_types::models::{Message, User};

use crate::{Result, Store, StoreError};

/// In-memory store: the ephemeral local mode, and the backend tests run
/// against.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    messages: Vec<Message>,
    session: Option<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn load_users(&self) -> Result<Vec<User>> {
        Ok(self.lock()?.users.clone())
    }

    fn replace_users(&self, users: &[User]) -> Result<()> {
        self.lock()?.users = users.to_vec();
        Ok(())
    }

    fn load_messages(&self) -> Result<Vec<Message>> {
        Ok(self.lock()?.messages.clone())
    }

    fn replace_messages(&self, messages: &[Message]) -> Result<()> {
        self.lock()?.messages = messages.to_vec();
        Ok(())
    }

    fn session_user(&self) -> Result<Option<User>> {
        Ok(self.lock()?.session.clone())
    }

    fn set_session_user(&self, user: &User) -> Result<()> {
        self.lock()?.session = Some(user.clone());
        Ok(())
    }

    fn clear_session_user(&self) -> Result<()> {
        self.lock()?.session = None;
        Ok(())
    }
}
