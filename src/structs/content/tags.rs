use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::database::schema::{post_tags, tags};

/// Tags returned per post in the feed.
pub const FEED_TAG_LIMIT: i64 = 6;

pub const MAX_TAG_TITLE_LEN: usize = 50;

#[derive(Debug, Queryable, Selectable, Clone, Serialize, Deserialize, Identifiable)]
#[diesel(table_name = tags)]
pub struct Tags {
    pub id: i32,
    pub title: String,
    pub created_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tags)]
pub struct NewTags {
    pub title: String,
    pub created_at: i64,
}

#[derive(Debug, Queryable, Selectable, Clone, Serialize, Identifiable)]
#[diesel(table_name = post_tags)]
pub struct PostTags {
    pub id: i32,
    pub post_id: i32,
    pub tag_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = post_tags)]
pub struct NewPostTags {
    pub post_id: i32,
    pub tag_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub id: i32,
    pub title: String,
}

impl From<Tags> for TagSummary {
    fn from(tag: Tags) -> Self {
        TagSummary { id: tag.id, title: tag.title }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPostTagsRequest {
    pub tags: Vec<String>,
}

/// Trims, lowercases and de-duplicates titles while keeping first-seen order.
pub fn normalize_tag_titles(titles: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(titles.len());

    for title in titles {
        let title = title.trim().to_lowercase();
        if title.is_empty() || title.chars().count() > MAX_TAG_TITLE_LEN {
            continue;
        }
        if !normalized.contains(&title) {
            normalized.push(title);
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn normalizes_and_dedupes_in_order() {
        let titles = owned(&["  Rust ", "web", "rust", "", "WEB", "async"]);
        assert_eq!(normalize_tag_titles(&titles), owned(&["rust", "web", "async"]));
    }

    #[test]
    fn drops_overlong_titles() {
        let long = "x".repeat(MAX_TAG_TITLE_LEN + 1);
        assert!(normalize_tag_titles(&[long]).is_empty());
    }
}
