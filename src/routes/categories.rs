use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use rusqlite::{params, OptionalExtension};
use serde::Deserialize;
use serde_json::json;

use crate::db::models::{Category, Post};
use crate::db::now_timestamp;
use crate::error::{AppError, AppResult};
use crate::extractors::AdminUser;
use crate::routes::Pagination;
use crate::state::AppState;

/// Page size for the posts listed under a single category.
const CATEGORY_PAGE_SIZE: i64 = 6;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", get(get_category).delete(delete_category))
}

#[derive(Deserialize)]
struct CreateCategory {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct CategoryPostsQuery {
    page: Option<i64>,
    sort: Option<String>,
}

/// POST /api/categories — admin only.
async fn create_category(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreateCategory>,
) -> AppResult<Json<serde_json::Value>> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".into()));
    }

    let conn = state.db.get()?;
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM categories WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )?;
    if exists {
        return Err(AppError::Conflict(
            "Category with this name already exists".into(),
        ));
    }

    let category = Category {
        id: uuid::Uuid::now_v7().to_string(),
        name,
        created_at: now_timestamp(),
    };
    conn.execute(
        "INSERT INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![category.id, category.name, category.created_at],
    )?;

    tracing::info!("Category '{}' created by {}", category.name, user.username);

    Ok(Json(json!({
        "success": true,
        "message": "New category created successfully",
        "data": category,
    })))
}

/// GET /api/categories — all categories, newest first.
async fn list_categories(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let mut stmt =
        conn.prepare("SELECT id, name, created_at FROM categories ORDER BY created_at DESC")?;
    let categories: Vec<Category> = stmt
        .query_map([], Category::from_row)?
        .filter_map(|r| r.ok())
        .collect();

    Ok(Json(json!({
        "success": true,
        "message": "All categories fetched successfully",
        "data": categories,
    })))
}

/// GET /api/categories/{id} — the category plus a page of its posts.
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CategoryPostsQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let category = conn
        .query_row(
            "SELECT id, name, created_at FROM categories WHERE id = ?1",
            params![id],
            Category::from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

    let page = query.page.filter(|p| *p > 0).unwrap_or(1);
    let order = match query.sort.as_deref() {
        Some("oldest") => "ASC",
        _ => "DESC",
    };
    let offset = (page - 1) * CATEGORY_PAGE_SIZE;

    let mut stmt = conn.prepare(&format!(
        "SELECT id, title, slug, subtitle, content, category_id, thumbnail, gallery, tags, created_at
         FROM posts WHERE category_id = ?1
         ORDER BY created_at {} LIMIT ?2 OFFSET ?3",
        order
    ))?;
    let posts: Vec<Post> = stmt
        .query_map(params![category.id, CATEGORY_PAGE_SIZE, offset], Post::from_row)?
        .filter_map(|r| r.ok())
        .collect();

    let total_posts: i64 = conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE category_id = ?1",
        params![category.id],
        |row| row.get(0),
    )?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "category": category,
            "posts": posts,
        },
        "pagination": Pagination::new(page, CATEGORY_PAGE_SIZE, total_posts),
    })))
}

/// DELETE /api/categories/{id} — admin only; posts cascade.
async fn delete_category(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM categories WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(AppError::NotFound("Category not found".into()));
    }

    conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;

    tracing::info!("Category {} deleted by {}", id, user.username);

    Ok(Json(json!({
        "success": true,
        "message": "Category deleted successfully",
    })))
}
