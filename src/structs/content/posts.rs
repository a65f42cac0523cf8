use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::{database::schema::posts, structs::Users};

#[derive(Debug, Queryable, Selectable, Clone, Serialize, Deserialize, Identifiable)]
#[diesel(table_name = posts)]
pub struct Posts {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Insertable, Serialize, Deserialize)]
#[diesel(table_name = posts)]
pub struct NewPosts {
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = posts)]
pub struct UpdatePosts {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_published", alias = "status")]
    pub published: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(alias = "status")]
    pub published: Option<bool>,
}

fn default_published() -> bool {
    true
}

/// A post with its author embedded. `Users` never serializes its password hash.
#[derive(Debug, Serialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Posts,
    pub user: Option<Users>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSort {
    Newest,
    Default,
}

impl PostSort {
    pub fn from_query(sort: Option<&str>) -> Self {
        match sort {
            Some("newest") => PostSort::Newest,
            _ => PostSort::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostListQuery {
    pub skip: i64,
    pub take: i64,
    pub search: Option<String>,
    pub sort: PostSort,
}

impl PostListQuery {
    /// `ILIKE` pattern matching the search phrase anywhere in the content.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }

        let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        Some(format!("%{}%", escaped))
    }
}
