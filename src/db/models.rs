use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub category_id: String,
    pub thumbnail: Option<String>,
    pub gallery: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: String,
}

/// A post joined with its owning category, as returned by the list and
/// single-post lookups.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithCategory {
    #[serde(flatten)]
    pub post: Post,
    pub category: Category,
}

impl User {
    /// Column order: id, username, password_hash, role, created_at
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            role: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl Category {
    /// Column order: id, name, created_at
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

impl Post {
    /// Column order: id, title, slug, subtitle, content, category_id,
    /// thumbnail, gallery, tags, created_at
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let gallery: String = row.get(7)?;
        let tags: String = row.get(8)?;
        Ok(Post {
            id: row.get(0)?,
            title: row.get(1)?,
            slug: row.get(2)?,
            subtitle: row.get(3)?,
            content: row.get(4)?,
            category_id: row.get(5)?,
            thumbnail: row.get(6)?,
            gallery: serde_json::from_str(&gallery).unwrap_or_default(),
            tags: serde_json::from_str(&tags).unwrap_or_default(),
            created_at: row.get(9)?,
        })
    }
}

impl PostWithCategory {
    /// Post columns followed by category columns (id, name, created_at).
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let post = Post::from_row(row)?;
        Ok(PostWithCategory {
            post,
            category: Category {
                id: row.get(10)?,
                name: row.get(11)?,
                created_at: row.get(12)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serialization_omits_password_hash() {
        let user = User {
            id: "u1".into(),
            username: "alice".into(),
            password_hash: "$2b$10$secret".into(),
            role: "user".into(),
            created_at: "2025-01-01T00:00:00.000000Z".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn post_serializes_camel_case() {
        let post = Post {
            id: "p1".into(),
            title: "Hello".into(),
            slug: "hello".into(),
            subtitle: None,
            content: "body".into(),
            category_id: "c1".into(),
            thumbnail: None,
            gallery: vec![],
            tags: vec!["rust".into()],
            created_at: "2025-01-01T00:00:00.000000Z".into(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["categoryId"], "c1");
        assert_eq!(json["createdAt"], "2025-01-01T00:00:00.000000Z");
        assert_eq!(json["tags"][0], "rust");
    }

    #[test]
    fn post_with_category_flattens_post_fields() {
        let post = Post {
            id: "p1".into(),
            title: "Hello".into(),
            slug: "hello".into(),
            subtitle: None,
            content: "body".into(),
            category_id: "c1".into(),
            thumbnail: None,
            gallery: vec![],
            tags: vec![],
            created_at: "2025-01-01T00:00:00.000000Z".into(),
        };
        let with_category = PostWithCategory {
            post,
            category: Category {
                id: "c1".into(),
                name: "Tech".into(),
                created_at: "2025-01-01T00:00:00.000000Z".into(),
            },
        };
        let json = serde_json::to_value(&with_category).unwrap();
        assert_eq!(json["slug"], "hello");
        assert_eq!(json["category"]["name"], "Tech");
    }
}
