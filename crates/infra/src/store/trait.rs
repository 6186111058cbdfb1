use std::sync::Arc;

use thiserror::Error;
use userhub_core::{NewUser, Page, PageRequest, User, UserId, UserPatch};

/// Storage-level failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row with the requested id.
    #[error("user not found")]
    NotFound,

    /// The email is already owned by another row.
    #[error("email already exists")]
    EmailTaken,

    /// The backend could not be reached (pool closed, connect failure, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Backend(String),
}

/// Async CRUD interface over the user table.
///
/// Implementations enforce email uniqueness atomically: `insert` and `update`
/// return `StoreError::EmailTaken` instead of writing a duplicate.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name for health output ("memory", "postgres").
    fn backend(&self) -> &'static str;

    /// Cheap round trip proving the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Users ordered by ascending id, cut to the requested page.
    async fn list(&self, request: PageRequest) -> Result<Page<User>, StoreError>;

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Insert a row with a server-assigned id and timestamps.
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;

    /// Apply `patch` to an existing row and refresh `updated_at`.
    ///
    /// Setting the email a row already has is not a conflict.
    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, StoreError>;

    /// Remove a row, returning it as it was.
    async fn delete(&self, id: UserId) -> Result<User, StoreError>;
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn backend(&self) -> &'static str {
        (**self).backend()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<User>, StoreError> {
        (**self).list(request).await
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        (**self).get(id).await
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        (**self).insert(new).await
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> Result<User, StoreError> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: UserId) -> Result<User, StoreError> {
        (**self).delete(id).await
    }
}
