use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::models::{Post, PostWithCategory};
use crate::db::now_timestamp;
use crate::error::{AppError, AppResult};
use crate::extractors::AdminUser;
use crate::routes::Pagination;
use crate::slug::slugify;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 5;

const POST_COLUMNS: &str =
    "id, title, slug, subtitle, content, category_id, thumbnail, gallery, tags, created_at";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/latest-per-category", get(latest_per_category))
        .route("/id/{id}", get(get_post_by_id))
        .route(
            "/{slug}",
            get(get_post_by_slug).put(update_post).delete(delete_post),
        )
}

// -- Request types --

/// Tags and gallery arrive either as a comma-separated string or as an
/// array; both normalize to a list of trimmed, non-empty strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringList {
    Csv(String),
    Items(Vec<String>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePost {
    #[serde(default)]
    title: String,
    subtitle: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    category_id: String,
    tags: Option<StringList>,
    thumbnail: Option<String>,
    gallery: Option<StringList>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePost {
    title: Option<String>,
    subtitle: Option<String>,
    content: Option<String>,
    category_id: Option<String>,
    tags: Option<StringList>,
    thumbnail: Option<String>,
    gallery: Option<StringList>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPostsQuery {
    page: Option<i64>,
    limit: Option<i64>,
    category_id: Option<String>,
    sort: Option<String>,
}

/// The most recent post of one category, flattened with the category name.
#[derive(Serialize)]
struct LatestPost {
    category: String,
    #[serde(flatten)]
    post: Post,
}

// -- Handlers --

/// POST /api/posts — admin only.
async fn create_post(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Json(req): Json<CreatePost>,
) -> AppResult<Json<serde_json::Value>> {
    if req.title.is_empty() || req.content.is_empty() || req.category_id.is_empty() {
        return Err(AppError::BadRequest(
            "Title, Content, Category are required".into(),
        ));
    }

    let conn = state.db.get()?;

    let slug = slugify(&req.title);
    let slug_taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE slug = ?1",
        params![slug],
        |row| row.get(0),
    )?;
    if slug_taken {
        return Err(AppError::Conflict(
            "A post with that title already exists".into(),
        ));
    }

    let category_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM categories WHERE id = ?1",
        params![req.category_id],
        |row| row.get(0),
    )?;
    if !category_exists {
        return Err(AppError::BadRequest("Category not found".into()));
    }

    let post = Post {
        id: uuid::Uuid::now_v7().to_string(),
        title: req.title,
        slug,
        subtitle: req.subtitle,
        content: req.content,
        category_id: req.category_id,
        thumbnail: normalize_thumbnail(req.thumbnail),
        gallery: normalize_list(req.gallery),
        tags: normalize_list(req.tags),
        created_at: now_timestamp(),
    };

    conn.execute(
        "INSERT INTO posts (id, title, slug, subtitle, content, category_id, thumbnail, gallery, tags, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            post.id,
            post.title,
            post.slug,
            post.subtitle,
            post.content,
            post.category_id,
            post.thumbnail,
            serde_json::to_string(&post.gallery)?,
            serde_json::to_string(&post.tags)?,
            post.created_at,
        ],
    )?;

    tracing::info!("Post '{}' created by {}", post.slug, user.username);

    Ok(Json(json!({
        "success": true,
        "message": "New post created successfully",
        "data": post,
    })))
}

/// GET /api/posts — paginated list, optionally filtered by category.
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let page = query.page.filter(|p| *p > 0).unwrap_or(1);
    let limit = query.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_PAGE_SIZE);
    let order = sort_order(query.sort.as_deref());
    let offset = (page - 1) * limit;

    let conn = state.db.get()?;

    let select = format!(
        "SELECT p.id, p.title, p.slug, p.subtitle, p.content, p.category_id,
                p.thumbnail, p.gallery, p.tags, p.created_at,
                c.id, c.name, c.created_at
         FROM posts p
         JOIN categories c ON c.id = p.category_id
         {} ORDER BY p.created_at {} LIMIT ?1 OFFSET ?2",
        if query.category_id.is_some() {
            "WHERE p.category_id = ?3"
        } else {
            ""
        },
        order
    );

    let mut stmt = conn.prepare(&select)?;
    let posts: Vec<PostWithCategory> = if let Some(ref category_id) = query.category_id {
        stmt.query_map(params![limit, offset, category_id], PostWithCategory::from_row)?
            .filter_map(|r| r.ok())
            .collect()
    } else {
        stmt.query_map(params![limit, offset], PostWithCategory::from_row)?
            .filter_map(|r| r.ok())
            .collect()
    };

    let total_posts: i64 = if let Some(ref category_id) = query.category_id {
        conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )?
    } else {
        conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?
    };

    Ok(Json(json!({
        "success": true,
        "data": posts,
        "pagination": Pagination::new(page, limit, total_posts),
    })))
}

/// GET /api/posts/latest-per-category — the single most recent post per
/// category; categories with no posts are omitted.
async fn latest_per_category(
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let mut stmt = conn.prepare(
        "SELECT p.id, p.title, p.slug, p.subtitle, p.content, p.category_id,
                p.thumbnail, p.gallery, p.tags, p.created_at, c.name
         FROM posts p
         JOIN categories c ON c.id = p.category_id
         WHERE p.id = (SELECT p2.id FROM posts p2
                       WHERE p2.category_id = p.category_id
                       ORDER BY p2.created_at DESC LIMIT 1)
         ORDER BY c.created_at DESC",
    )?;
    let latest: Vec<LatestPost> = stmt
        .query_map([], |row| {
            Ok(LatestPost {
                post: Post::from_row(row)?,
                category: row.get(10)?,
            })
        })?
        .filter_map(|r| r.ok())
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": latest,
    })))
}

/// GET /api/posts/id/{id}
async fn get_post_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let post = conn
        .query_row(
            "SELECT p.id, p.title, p.slug, p.subtitle, p.content, p.category_id,
                    p.thumbnail, p.gallery, p.tags, p.created_at,
                    c.id, c.name, c.created_at
             FROM posts p JOIN categories c ON c.id = p.category_id
             WHERE p.id = ?1",
            params![id],
            PostWithCategory::from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Post fetched successfully",
        "data": post,
    })))
}

/// GET /api/posts/{slug}
async fn get_post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    // Frontends have been seen forwarding an unset variable here.
    if slug.is_empty() || slug == "undefined" {
        return Err(AppError::BadRequest("Invalid slug parameter".into()));
    }

    let conn = state.db.get()?;
    let post = conn
        .query_row(
            "SELECT p.id, p.title, p.slug, p.subtitle, p.content, p.category_id,
                    p.thumbnail, p.gallery, p.tags, p.created_at,
                    c.id, c.name, c.created_at
             FROM posts p JOIN categories c ON c.id = p.category_id
             WHERE p.slug = ?1",
            params![slug],
            PostWithCategory::from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound("No post found".into()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Post fetched successfully",
        "data": post,
    })))
}

/// PUT /api/posts/{id} — admin only. Partial merge: only provided fields
/// change. A new title regenerates the slug; uniqueness is not re-checked,
/// so a colliding title surfaces as a constraint violation.
async fn update_post(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdatePost>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let mut post = conn
        .query_row(
            &format!("SELECT {} FROM posts WHERE id = ?1", POST_COLUMNS),
            params![id],
            Post::from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    if let Some(title) = req.title.filter(|t| !t.is_empty()) {
        post.slug = slugify(&title);
        post.title = title;
    }
    if let Some(subtitle) = req.subtitle {
        post.subtitle = Some(subtitle);
    }
    if let Some(content) = req.content {
        post.content = content;
    }
    if let Some(category_id) = req.category_id.filter(|c| !c.is_empty()) {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM categories WHERE id = ?1",
            params![category_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(AppError::BadRequest("Category not found".into()));
        }
        post.category_id = category_id;
    }
    if let Some(thumbnail) = req.thumbnail {
        post.thumbnail = Some(thumbnail);
    }
    if req.gallery.is_some() {
        post.gallery = normalize_list(req.gallery);
    }
    if req.tags.is_some() {
        post.tags = normalize_list(req.tags);
    }

    conn.execute(
        "UPDATE posts SET title = ?1, slug = ?2, subtitle = ?3, content = ?4,
                category_id = ?5, thumbnail = ?6, gallery = ?7, tags = ?8
         WHERE id = ?9",
        params![
            post.title,
            post.slug,
            post.subtitle,
            post.content,
            post.category_id,
            post.thumbnail,
            serde_json::to_string(&post.gallery)?,
            serde_json::to_string(&post.tags)?,
            post.id,
        ],
    )?;

    tracing::info!("Post {} updated by {}", post.id, user.username);

    Ok(Json(json!({
        "success": true,
        "message": "Post updated successfully",
        "data": post,
    })))
}

/// DELETE /api/posts/{id} — admin only.
async fn delete_post(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM posts WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(AppError::NotFound("Post not found".into()));
    }

    conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;

    tracing::info!("Post {} deleted by {}", id, user.username);

    Ok(Json(json!({
        "success": true,
        "message": "Post deleted successfully",
    })))
}

// -- Helpers --

fn sort_order(sort: Option<&str>) -> &'static str {
    match sort {
        Some("oldest") => "ASC",
        _ => "DESC",
    }
}

fn normalize_list(value: Option<StringList>) -> Vec<String> {
    let items = match value {
        Some(StringList::Csv(s)) => s.split(',').map(str::to_string).collect(),
        Some(StringList::Items(items)) => items,
        None => Vec::new(),
    };
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Frontends have been seen sending the literal strings "undefined" and
/// "null" for an unset thumbnail.
fn normalize_thumbnail(value: Option<String>) -> Option<String> {
    value.filter(|t| !t.is_empty() && t != "undefined" && t != "null")
}
