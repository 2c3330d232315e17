//! crates/notepad_core/src/ports.rs
//!
//! Defines the storage contracts (traits) the notepad core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete database behind it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Note, User, UserCredentials};

/// A generic error type for all storage operations.
/// Abstracts away the specific errors of the underlying driver.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    Backend(String),
}

/// A convenience alias for `Result<T, StorageError>`.
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for notes. Injected into `NoteAccessService`; the service
/// never talks to the database directly.
///
/// `find` reports a missing row as `Ok(None)` rather than an error so the
/// service can fold "missing" and "not yours" into one outcome.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn find(&self, note_id: Uuid) -> StorageResult<Option<Note>>;

    /// Inserts the note, or overwrites title/body if the id already exists.
    /// The owner column is never touched on update.
    async fn save(&self, note: &Note) -> StorageResult<()>;

    async fn delete(&self, note_id: Uuid) -> StorageResult<()>;

    /// All notes owned by `user_id`, in an order that is stable within a
    /// single read (oldest first).
    async fn list_by_owner(&self, user_id: Uuid) -> StorageResult<Vec<Note>>;
}

/// Persistence for user accounts and cookie sessions. Consumed by the web
/// layer's auth handlers and middleware, not by the note service.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> StorageResult<User>;

    async fn get_user_by_email(&self, email: &str) -> StorageResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Resolves a session cookie to a user id, rejecting expired sessions.
    async fn validate_auth_session(&self, session_id: &str) -> StorageResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> StorageResult<()>;
}
