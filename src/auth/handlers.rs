use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rusqlite::{params, OptionalExtension};
use serde::Deserialize;
use serde_json::json;

use crate::auth::password;
use crate::db::models::User;
use crate::db::now_timestamp;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/register — create a user with the default role.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> AppResult<Response> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password required".into(),
        ));
    }

    let conn = state.db.get()?;
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE username = ?1",
        params![req.username],
        |row| row.get(0),
    )?;
    if taken {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let user = User {
        id: uuid::Uuid::now_v7().to_string(),
        username: req.username,
        password_hash: password::hash_password(&req.password)?,
        role: "user".to_string(),
        created_at: now_timestamp(),
    };

    conn.execute(
        "INSERT INTO users (id, username, password_hash, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user.id, user.username, user.password_hash, user.role, user.created_at],
    )?;

    tracing::info!("Registered user {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": user,
        })),
    )
        .into_response())
}

/// POST /api/auth/login — verify credentials and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> AppResult<Response> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password required".into(),
        ));
    }

    let conn = state.db.get()?;
    let user = conn
        .query_row(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?1",
            params![req.username],
            User::from_row,
        )
        .optional()?;

    let Some(user) = user else {
        return Err(AppError::Unauthorized("Invalid username".into()));
    };

    if !password::verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthorized("Incorrect password".into()));
    }

    let token = state.tokens.issue(&user.id, &user.username, &user.role)?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "role": user.role,
    }))
    .into_response())
}
