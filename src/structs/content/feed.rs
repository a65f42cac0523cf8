use diesel::{
    sql_types::{BigInt, Bool, Int4, Int8, Jsonb, Nullable, Text, Varchar},
    QueryableByName,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::{meltdown::*, structs::TagSummary};

/// One row of the feed join. Author columns are null when the author row is gone.
#[derive(Debug, Clone, QueryableByName)]
pub struct FeedRow {
    #[diesel(sql_type = Int4)]
    pub id: i32,
    #[diesel(sql_type = Varchar)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub content: String,
    #[diesel(sql_type = Bool)]
    pub published: bool,
    #[diesel(sql_type = Int8)]
    pub created_at: i64,
    #[diesel(sql_type = BigInt)]
    pub bookmarks: i64,
    #[diesel(sql_type = BigInt)]
    pub views: i64,
    #[diesel(sql_type = BigInt)]
    pub votes: i64,
    #[diesel(sql_type = Nullable<Int4>)]
    pub author_id: Option<i32>,
    #[diesel(sql_type = Nullable<Varchar>)]
    pub author_username: Option<String>,
    #[diesel(sql_type = Nullable<Int4>)]
    pub author_role: Option<i32>,
    #[diesel(sql_type = Nullable<Int8>)]
    pub author_created_at: Option<i64>,
    #[diesel(sql_type = Jsonb)]
    pub tags: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedAuthor {
    pub id: i32,
    pub username: String,
    pub role: i32,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPost {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: i64,
    pub bookmarks: i64,
    pub views: i64,
    pub votes: i64,
    pub user: Option<FeedAuthor>,
    pub tags: Vec<TagSummary>,
}

impl TryFrom<FeedRow> for FeedPost {
    type Error = MeltDown;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        let user = match (row.author_id, row.author_username) {
            (Some(id), Some(username)) => Some(FeedAuthor {
                id,
                username,
                role: row.author_role.unwrap_or_default(),
                created_at: row.author_created_at.unwrap_or_default(),
            }),
            _ => None,
        };

        let tags = match row.tags {
            JsonValue::Null => Vec::new(),
            value => serde_json::from_value::<Vec<TagSummary>>(value).map_err(|e| MeltDown::from(e).with_context("post_id", row.id.to_string()))?,
        };

        Ok(FeedPost {
            id: row.id,
            title: row.title,
            content: row.content,
            published: row.published,
            created_at: row.created_at,
            bookmarks: row.bookmarks,
            views: row.views,
            votes: row.votes,
            user,
            tags,
        })
    }
}
