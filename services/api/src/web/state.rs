//! services/api/src/web/state.rs
//!
//! The shared application state, created once at startup and passed to all
//! handlers. Ports are held as trait objects so tests can swap the Postgres
//! adapter for in-memory implementations.

use notepad_core::access::NoteAccessService;
use notepad_core::ports::AuthStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthStore>,
    pub notes: NoteAccessService,
}
