pub mod auth;
pub mod categories;
pub mod posts;

use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .nest("/api/auth", auth::router())
        .nest("/api/categories", categories::router())
        .nest("/api/posts", posts::router())
}

async fn root() -> &'static str {
    "Blog backend is running!"
}

/// Pagination metadata included alongside paginated lists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_posts: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total_posts: i64) -> Self {
        Self {
            page,
            limit,
            total_posts,
            total_pages: (total_posts + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 5, 11).total_pages, 3);
        assert_eq!(Pagination::new(1, 5, 10).total_pages, 2);
        assert_eq!(Pagination::new(1, 5, 1).total_pages, 1);
    }

    #[test]
    fn zero_items_means_zero_pages() {
        assert_eq!(Pagination::new(1, 5, 0).total_pages, 0);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(2, 5, 12)).unwrap();
        assert_eq!(json["page"], 2);
        assert_eq!(json["totalPosts"], 12);
        assert_eq!(json["totalPages"], 3);
    }
}
