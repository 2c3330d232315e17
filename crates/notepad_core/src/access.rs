//! crates/notepad_core/src/access.rs
//!
//! The ownership-scoped access-control contract for notes: a note is only
//! visible, editable, or deletable by the user who created it. Denials are
//! deliberately uniform - a caller cannot tell "does not exist" from "exists
//! but belongs to someone else", which prevents probing for valid ids.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Note;
use crate::ports::{NoteRepository, StorageResult};

/// The ownership gate. Pure so it can be tested and reasoned about in
/// isolation; evaluated fresh on every call, never cached.
pub fn authorize(actor_id: Uuid, resource_owner_id: Uuid) -> bool {
    actor_id == resource_owner_id
}

/// Outcome of an ownership-gated operation.
///
/// `Denied` covers both a missing note and a note owned by another user.
/// Keeping them merged in one variant makes the anti-enumeration property a
/// type-level fact instead of an accident of error handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    Granted(T),
    Denied,
}

impl<T> Access<T> {
    pub fn granted(self) -> Option<T> {
        match self {
            Access::Granted(value) => Some(value),
            Access::Denied => None,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Access::Denied)
    }
}

/// Owns the CRUD + ownership-check logic for notes.
///
/// Every read-detail or mutating operation goes through [`authorize`] before
/// touching the repository, and a denied mutation performs no write at all.
#[derive(Clone)]
pub struct NoteAccessService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteAccessService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    /// All notes owned by `user_id`, oldest first. A user with no notes gets
    /// an empty list, not an error.
    pub async fn list_for_user(&self, user_id: Uuid) -> StorageResult<Vec<Note>> {
        self.repo.list_by_owner(user_id).await
    }

    /// Creates and persists a note owned by `user_id`. Title and body are
    /// opaque text; validation belongs to the form layer in front of us.
    pub async fn create(&self, user_id: Uuid, title: &str, body: &str) -> StorageResult<Note> {
        let note = Note::new(user_id, title, body);
        self.repo.save(&note).await?;
        Ok(note)
    }

    /// Fetches a note if `user_id` owns it. Missing and not-owned collapse
    /// into `Access::Denied`.
    pub async fn get_if_owned(
        &self,
        user_id: Uuid,
        note_id: Uuid,
    ) -> StorageResult<Access<Note>> {
        match self.repo.find(note_id).await? {
            Some(note) if authorize(user_id, note.user_id) => Ok(Access::Granted(note)),
            _ => Ok(Access::Denied),
        }
    }

    /// Overwrites title/body if `user_id` owns the note; the owner is never
    /// reassigned. On denial nothing is written.
    pub async fn update_if_owned(
        &self,
        user_id: Uuid,
        note_id: Uuid,
        title: &str,
        body: &str,
    ) -> StorageResult<Access<Note>> {
        let mut note = match self.repo.find(note_id).await? {
            Some(note) if authorize(user_id, note.user_id) => note,
            _ => return Ok(Access::Denied),
        };
        note.title = title.to_string();
        note.body = body.to_string();
        self.repo.save(&note).await?;
        Ok(Access::Granted(note))
    }

    /// Deletes the note if `user_id` owns it; otherwise the note is left
    /// untouched and continues to exist.
    pub async fn delete_if_owned(
        &self,
        user_id: Uuid,
        note_id: Uuid,
    ) -> StorageResult<Access<()>> {
        match self.repo.find(note_id).await? {
            Some(note) if authorize(user_id, note.user_id) => {
                self.repo.delete(note.id).await?;
                Ok(Access::Granted(()))
            }
            _ => Ok(Access::Denied),
        }
    }
}
