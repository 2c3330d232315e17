//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting the notepad routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::web::auth::session_id_from_cookies;
use crate::web::state::AppState;

/// Middleware that validates the auth session cookie and extracts the user id.
///
/// On success the user id is inserted into request extensions for handlers to
/// consume; handlers never trust a client-supplied identity. Missing or
/// invalid sessions get 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let session_id = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session_id_from_cookies)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = state
        .auth
        .validate_auth_session(session_id)
        .await
        .map_err(|e| {
            debug!("Rejected session cookie: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}
