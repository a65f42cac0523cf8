use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::{database::schema::notifications, structs::Comments};

#[derive(Debug, Queryable, Selectable, Clone, Serialize, Deserialize, Identifiable)]
#[diesel(table_name = notifications)]
pub struct Notifications {
    pub id: i32,
    pub recipient_id: i32,
    pub actor_id: i32,
    pub kind: String,
    pub post_id: Option<i32>,
    pub comment_id: Option<i32>,
    pub read: bool,
    pub created_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotifications {
    pub recipient_id: i32,
    pub actor_id: i32,
    pub kind: String,
    pub post_id: Option<i32>,
    pub comment_id: Option<i32>,
    pub read: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    CommentOnPost,
    ReplyToComment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::CommentOnPost => "comment_on_post",
            NotificationKind::ReplyToComment => "reply_to_comment",
        }
    }
}

impl NewNotifications {
    /// Notification for `recipient_id` about a freshly created comment.
    /// Returns `None` when people comment on their own content.
    pub fn for_comment(comment: &Comments, recipient_id: i32, now: i64) -> Option<Self> {
        if comment.user_id == recipient_id {
            return None;
        }

        let kind = match comment.parent_id {
            Some(_) => NotificationKind::ReplyToComment,
            None => NotificationKind::CommentOnPost,
        };

        Some(NewNotifications {
            recipient_id,
            actor_id: comment.user_id,
            kind: kind.as_str().to_string(),
            post_id: comment.post_id,
            comment_id: Some(comment.id),
            read: false,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(post_id: Option<i32>, parent_id: Option<i32>, user_id: i32) -> Comments {
        Comments {
            id: 9,
            post_id,
            parent_id,
            user_id,
            body: "hi".into(),
            created_at: 5,
            updated_at: 5,
        }
    }

    #[test]
    fn post_comment_notifies_post_author() {
        let note = NewNotifications::for_comment(&comment(Some(3), None, 4), 7, 50).unwrap();
        assert_eq!(note.recipient_id, 7);
        assert_eq!(note.actor_id, 4);
        assert_eq!(note.kind, "comment_on_post");
        assert_eq!(note.post_id, Some(3));
        assert_eq!(note.comment_id, Some(9));
        assert!(!note.read);
    }

    #[test]
    fn reply_uses_reply_kind() {
        let note = NewNotifications::for_comment(&comment(None, Some(2), 4), 7, 50).unwrap();
        assert_eq!(note.kind, "reply_to_comment");
        assert_eq!(note.post_id, None);
    }

    #[test]
    fn self_comments_do_not_notify() {
        assert!(NewNotifications::for_comment(&comment(Some(3), None, 7), 7, 50).is_none());
    }
}
