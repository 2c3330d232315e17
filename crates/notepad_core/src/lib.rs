pub mod access;
pub mod domain;
pub mod ports;

pub use access::{authorize, Access, NoteAccessService};
pub use domain::{AuthSession, Note, User, UserCredentials};
pub use ports::{AuthStore, NoteRepository, StorageError, StorageResult};
