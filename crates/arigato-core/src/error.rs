use thiserror::Error;

/// Failure taxonomy for journal operations. Not-found during lookups is
/// deliberately absent: a missing thread root or target user degrades to
/// an empty result, never an error. Likewise an action across a block is
/// filtered at the query layer, not rejected here.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Empty required field or malformed input. Nothing was mutated.
    #[error("{0}")]
    Validation(String),

    /// The chosen identifier already exists.
    #[error("user id '{0}' is already taken")]
    DuplicateUser(String),

    /// One generic message for unknown user and wrong credential alike,
    /// so login failures don't enumerate identifiers.
    #[error("incorrect user id or password")]
    Authentication,

    /// Credential hashing failed; details stay server-side.
    #[error("credential processing failed")]
    Credential,

    #[error(transparent)]
    Store(#[from] arigato_store::StoreError),
}
