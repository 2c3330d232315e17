//! HTTP integration tests for the notepad routes.
//!
//! Drives the production router in-process with in-memory implementations of
//! the storage ports, exercising the full stack: session middleware, auth
//! handlers, and the ownership-gated CRUD surface.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use notepad_core::access::NoteAccessService;
use notepad_core::domain::{Note, User, UserCredentials};
use notepad_core::ports::{AuthStore, NoteRepository, StorageError, StorageResult};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use api_lib::web::{self, AppState};

//=========================================================================================
// In-memory storage double
//=========================================================================================

#[derive(Default)]
struct MemoryStore {
    notes: Mutex<HashMap<Uuid, Note>>,
    users: Mutex<HashMap<String, UserCredentials>>,
    sessions: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn find(&self, note_id: Uuid) -> StorageResult<Option<Note>> {
        Ok(self.notes.lock().unwrap().get(&note_id).cloned())
    }

    async fn save(&self, note: &Note) -> StorageResult<()> {
        let mut notes = self.notes.lock().unwrap();
        match notes.get_mut(&note.id) {
            Some(existing) => {
                existing.title = note.title.clone();
                existing.body = note.body.clone();
            }
            None => {
                notes.insert(note.id, note.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, note_id: Uuid) -> StorageResult<()> {
        self.notes.lock().unwrap().remove(&note_id);
        Ok(())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> StorageResult<Vec<Note>> {
        let mut owned: Vec<Note> = self
            .notes
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(owned)
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> StorageResult<User> {
        let creds = UserCredentials {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(email.to_string(), creds.clone());
        Ok(User {
            user_id: creds.user_id,
            email: creds.email,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<UserCredentials> {
        self.users
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> StorageResult<Uuid> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .map(|(user_id, _)| *user_id)
            .ok_or_else(|| StorageError::NotFound("Auth session not found".to_string()))
    }

    async fn delete_auth_session(&self, session_id: &str) -> StorageResult<()> {
        self.sessions.lock().unwrap().remove(session_id);
        Ok(())
    }
}

//=========================================================================================
// Test harness
//=========================================================================================

fn test_app() -> Router {
    let store = Arc::new(MemoryStore::default());
    let state = Arc::new(AppState {
        auth: store.clone(),
        notes: NoteAccessService::new(store),
    });
    web::router(state)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, set_cookie, bytes.to_vec())
}

/// Signs up a fresh user and returns the session cookie to send back.
async fn signup(app: &Router, email: &str) -> String {
    let (status, set_cookie, _) = send(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({"email": email, "password": "test1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let set_cookie = set_cookie.expect("signup must set a session cookie");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

async fn create_note(app: &Router, cookie: &str, title: &str, body: &str) -> Value {
    let (status, _, bytes) = send(
        app,
        Method::POST,
        "/notepad/create",
        Some(cookie),
        Some(json!({"title": title, "body": body})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

fn as_json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn notepad_routes_require_a_session() {
    let app = test_app();
    for uri in ["/notepad", "/notepad/create"] {
        let (status, _, _) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "GET {} without cookie", uri);
    }
}

#[tokio::test]
async fn fresh_user_sees_an_empty_list() {
    let app = test_app();
    let cookie = signup(&app, "test@example.com").await;

    let (status, _, bytes) = send(&app, Method::GET, "/notepad", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes), json!([]));
}

#[tokio::test]
async fn created_note_appears_in_the_list() {
    let app = test_app();
    let cookie = signup(&app, "test@example.com").await;

    create_note(&app, &cookie, "Mi primera nota", "Contenido inicial").await;

    let (status, _, bytes) = send(&app, Method::GET, "/notepad", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = as_json(&bytes);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Mi primera nota");
    assert_eq!(list[0]["body"], "Contenido inicial");
}

#[tokio::test]
async fn create_form_describes_its_fields() {
    let app = test_app();
    let cookie = signup(&app, "test@example.com").await;

    let (status, _, bytes) =
        send(&app, Method::GET, "/notepad/create", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes), json!({"fields": ["title", "body"]}));
}

#[tokio::test]
async fn owner_can_read_note_detail() {
    let app = test_app();
    let cookie = signup(&app, "test@example.com").await;
    let note = create_note(&app, &cookie, "Una nota", "Su contenido").await;

    let uri = format!("/notepad/{}", note["id"].as_str().unwrap());
    let (status, _, bytes) = send(&app, Method::GET, &uri, Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let detail = as_json(&bytes);
    assert_eq!(detail["title"], "Una nota");
    assert_eq!(detail["body"], "Su contenido");
}

#[tokio::test]
async fn owner_edit_persists_new_title_and_body() {
    let app = test_app();
    let cookie = signup(&app, "test@example.com").await;
    let note = create_note(&app, &cookie, "Mi primera nota", "Contenido inicial").await;
    let id = note["id"].as_str().unwrap();

    // The edit form is prefilled through the same gate as the detail view.
    let (status, _, bytes) = send(
        &app,
        Method::GET,
        &format!("/notepad/edit/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&bytes)["title"], "Mi primera nota");

    let (status, _, _) = send(
        &app,
        Method::POST,
        &format!("/notepad/edit/{}", id),
        Some(&cookie),
        Some(json!({"title": "Nota editada", "body": "Contenido actualizado"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, bytes) = send(
        &app,
        Method::GET,
        &format!("/notepad/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    let detail = as_json(&bytes);
    assert_eq!(detail["title"], "Nota editada");
    assert_eq!(detail["body"], "Contenido actualizado");
}

#[tokio::test]
async fn owner_delete_removes_the_note() {
    let app = test_app();
    let cookie = signup(&app, "test@example.com").await;
    let note = create_note(&app, &cookie, "Para borrar", "x").await;
    let id = note["id"].as_str().unwrap();

    let (status, _, _) = send(
        &app,
        Method::POST,
        &format!("/notepad/delete/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        Method::GET,
        &format!("/notepad/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, _, bytes) = send(&app, Method::GET, "/notepad", Some(&cookie), None).await;
    assert_eq!(as_json(&bytes), json!([]));
}

#[tokio::test]
async fn foreign_edit_and_delete_leave_the_note_untouched() {
    let app = test_app();
    let owner = signup(&app, "test@example.com").await;
    let other = signup(&app, "other@example.com").await;

    let note = create_note(&app, &owner, "Secreta", "No ver").await;
    let id = note["id"].as_str().unwrap();

    // Detail read by the other user leaks nothing.
    let (status, _, _) = send(
        &app,
        Method::GET,
        &format!("/notepad/{}", id),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Probing edit answers an ordinary 200 and writes nothing.
    let (status, _, _) = send(
        &app,
        Method::POST,
        &format!("/notepad/edit/{}", id),
        Some(&other),
        Some(json!({"title": "Hack", "body": "Intento"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Probing delete likewise.
    let (status, _, _) = send(
        &app,
        Method::POST,
        &format!("/notepad/delete/{}", id),
        Some(&other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The owner still sees the exact original content.
    let (status, _, bytes) = send(
        &app,
        Method::GET,
        &format!("/notepad/{}", id),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let detail = as_json(&bytes);
    assert_eq!(detail["title"], "Secreta");
    assert_eq!(detail["body"], "No ver");
}

#[tokio::test]
async fn missing_and_foreign_detail_responses_are_identical() {
    let app = test_app();
    let owner = signup(&app, "test@example.com").await;
    let other = signup(&app, "other@example.com").await;

    let note = create_note(&app, &owner, "Secreta", "No ver").await;
    let foreign_uri = format!("/notepad/{}", note["id"].as_str().unwrap());
    let missing_uri = format!("/notepad/{}", Uuid::new_v4());

    let (foreign_status, _, foreign_body) =
        send(&app, Method::GET, &foreign_uri, Some(&other), None).await;
    let (missing_status, _, missing_body) =
        send(&app, Method::GET, &missing_uri, Some(&other), None).await;

    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_body, missing_body);
}

#[tokio::test]
async fn login_works_and_logout_invalidates_the_session() {
    let app = test_app();
    let cookie = signup(&app, "test@example.com").await;

    // A second session via login with the same credentials.
    let (status, set_cookie, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "test@example.com", "password": "test1234"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie.is_some());

    let (status, _, _) = send(&app, Method::POST, "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, Method::GET, "/notepad", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = test_app();
    signup(&app, "test@example.com").await;

    let (status, set_cookie, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "test@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(set_cookie.is_none());
}
