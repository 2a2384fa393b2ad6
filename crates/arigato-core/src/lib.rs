pub mod error;
pub mod session;
pub mod visibility;

mod auth;
mod messages;
mod profile;
mod relations;
mod threads;

pub use error::CoreError;
pub use profile::{ProfileUpdate, ProfileView};
pub use session::Session;
pub use threads::{InboxGroup, ThreadView};

use std::sync::Arc;

use arigato_store::Store;
use arigato_types::models::User;

pub type Result<T> = std::result::Result<T, CoreError>;

/// The journal service. Every operation is a synchronous request/response
/// against the storage collaborator, acting on behalf of an explicit
/// [`Session`]; there is no ambient current-user state.
pub struct Journal {
    store: Arc<dyn Store>,
}

impl Journal {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn find_user(&self, user_id: &str) -> Result<Option<User>> {
        let users = self.store.load_users()?;
        Ok(users.into_iter().find(|u| u.user_id == user_id))
    }

    /// Exact-id user search. The searcher is never their own result.
    pub fn search_user(&self, session: &Session, user_id: &str) -> Result<Option<User>> {
        if user_id == session.user_id() {
            return Ok(None);
        }
        self.find_user(user_id)
    }
}
