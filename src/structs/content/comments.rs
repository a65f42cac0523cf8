use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::database::schema::comments;

#[derive(Debug, Queryable, Selectable, Clone, Serialize, Deserialize, Identifiable)]
#[diesel(table_name = comments)]
pub struct Comments {
    pub id: i32,
    pub post_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub user_id: i32,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// What a new comment hangs off. A comment has exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    Post(i32),
    Reply(i32),
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = comments)]
pub struct NewComments {
    pub post_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub user_id: i32,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl NewComments {
    pub fn new(target: CommentTarget, user_id: i32, body: String, now: i64) -> Self {
        let (post_id, parent_id) = match target {
            CommentTarget::Post(id) => (Some(id), None),
            CommentTarget::Reply(id) => (None, Some(id)),
        };

        NewComments {
            post_id,
            parent_id,
            user_id,
            body,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn target(&self) -> Option<CommentTarget> {
        match (self.post_id, self.parent_id) {
            (Some(post_id), None) => Some(CommentTarget::Post(post_id)),
            (None, Some(parent_id)) => Some(CommentTarget::Reply(parent_id)),
            _ => None,
        }
    }
}

/// Body of `POST /posts/<id>/comments`. Unknown fields such as a user id are ignored.
#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub body: String,
    #[serde(rename = "inReplyToComment", alias = "in_reply_to_comment", default)]
    pub in_reply_to_comment: Option<i32>,
}

impl CommentPayload {
    pub fn target(&self, post_id: i32) -> CommentTarget {
        match self.in_reply_to_comment {
            Some(parent_id) => CommentTarget::Reply(parent_id),
            None => CommentTarget::Post(post_id),
        }
    }

    pub fn into_new_comment(self, post_id: i32, user_id: i32, now: i64) -> NewComments {
        let target = self.target(post_id);
        NewComments::new(target, user_id, self.body, now)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub body: String,
}
