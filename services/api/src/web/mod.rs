pub mod auth;
pub mod middleware;
pub mod notepad;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use middleware::require_auth;
pub use notepad::ApiDoc;
pub use state::AppState;

/// Builds the full API router: public auth routes plus the notepad routes
/// behind the session middleware. Lives here (not in the binary) so the
/// integration tests can drive the exact production routing in-process.
pub fn router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    let protected_routes = Router::new()
        .route("/notepad", get(notepad::list_notes_handler))
        .route(
            "/notepad/create",
            get(notepad::create_form_handler).post(notepad::create_note_handler),
        )
        .route("/notepad/{id}", get(notepad::show_note_handler))
        .route(
            "/notepad/edit/{id}",
            get(notepad::edit_form_handler).post(notepad::update_note_handler),
        )
        .route("/notepad/delete/{id}", post(notepad::delete_note_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
