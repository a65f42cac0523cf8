use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};
use rocket::async_trait;

use crate::{
    database::{
        db::establish_connection,
        schema::{
            comments::dsl::{self as comment_dsl},
            notifications, posts,
        },
    },
    meltdown::*,
    middleware::{Owned, OwnedResource},
    services::PageRequest,
    structs::*,
};

impl Comments {
    pub async fn find(id: i32) -> Result<Option<Comments>, MeltDown> {
        let mut conn = establish_connection().await?;

        comment_dsl::comments
            .filter(comment_dsl::id.eq(id))
            .select(Comments::as_select())
            .first::<Comments>(&mut conn)
            .await
            .optional()
            .map_err(|e| MeltDown::from(e).with_context("operation", "find_comment").with_context("id", id.to_string()))
    }

    /// Inserts the comment after checking its post or parent comment exists, and
    /// notifies the owner of whatever was commented on.
    pub async fn create(new_comment: NewComments) -> Result<Comments, MeltDown> {
        let target = new_comment.target().ok_or_else(|| MeltDown::validation_failed("a comment needs exactly one of post or parent comment"))?;
        if new_comment.body.trim().is_empty() {
            return Err(MeltDown::missing_field("body"));
        }

        let mut conn = establish_connection().await?;

        conn.transaction::<_, MeltDown, _>(|conn| {
            async move {
                let recipient_id = match target {
                    CommentTarget::Post(post_id) => posts::table
                        .filter(posts::id.eq(post_id))
                        .select(posts::user_id)
                        .first::<i32>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| MeltDown::record_not_found("Post").with_context("id", post_id.to_string()))?,
                    CommentTarget::Reply(parent_id) => comment_dsl::comments
                        .filter(comment_dsl::id.eq(parent_id))
                        .select(comment_dsl::user_id)
                        .first::<i32>(conn)
                        .await
                        .optional()?
                        .ok_or_else(|| MeltDown::record_not_found("Comment").with_context("id", parent_id.to_string()))?,
                };

                let comment = diesel::insert_into(comment_dsl::comments)
                    .values(&new_comment)
                    .returning(Comments::as_returning())
                    .get_result::<Comments>(conn)
                    .await?;

                if let Some(notification) = NewNotifications::for_comment(&comment, recipient_id, comment.created_at) {
                    diesel::insert_into(notifications::table).values(&notification).execute(conn).await?;
                }

                Ok(comment)
            }
            .scope_boxed()
        })
        .await
        .map_err(|e| e.with_context("operation", "create_comment"))
    }

    /// Direct comments of a post, oldest first. Replies are not included.
    pub async fn find_of_post(post_id: i32, page: PageRequest) -> Result<Vec<Comments>, MeltDown> {
        let mut conn = establish_connection().await?;

        comment_dsl::comments
            .filter(comment_dsl::post_id.eq(post_id))
            .order(comment_dsl::id.asc())
            .offset(page.skip())
            .limit(page.take())
            .select(Comments::as_select())
            .load::<Comments>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "find_comments_of_post").with_context("post_id", post_id.to_string()))
    }

    pub async fn total_of_post(post_id: i32) -> Result<i64, MeltDown> {
        let mut conn = establish_connection().await?;

        comment_dsl::comments
            .filter(comment_dsl::post_id.eq(post_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "total_comments_of_post").with_context("post_id", post_id.to_string()))
    }

    pub async fn update_body(id: i32, body: String) -> Result<Comments, MeltDown> {
        if body.trim().is_empty() {
            return Err(MeltDown::missing_field("body"));
        }

        let mut conn = establish_connection().await?;

        diesel::update(comment_dsl::comments.filter(comment_dsl::id.eq(id)))
            .set((comment_dsl::body.eq(body), comment_dsl::updated_at.eq(Utc::now().timestamp())))
            .returning(Comments::as_returning())
            .get_result::<Comments>(&mut conn)
            .await
            .optional()
            .map_err(|e| MeltDown::from(e).with_context("operation", "update_comment").with_context("id", id.to_string()))?
            .ok_or_else(|| MeltDown::record_not_found("Comment").with_context("id", id.to_string()))
    }

    /// Replies to the comment are removed with it.
    pub async fn delete_by_id(id: i32) -> Result<(), MeltDown> {
        let mut conn = establish_connection().await?;

        let deleted = diesel::delete(comment_dsl::comments.filter(comment_dsl::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "delete_comment").with_context("id", id.to_string()))?;

        match deleted {
            0 => Err(MeltDown::record_not_found("Comment").with_context("id", id.to_string())),
            _ => Ok(()),
        }
    }
}

impl Owned for Comments {
    const NAME: &'static str = "Comment";

    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

#[async_trait]
impl OwnedResource for Comments {
    async fn find(id: i32) -> Result<Option<Self>, MeltDown> {
        Comments::find(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::AuthUser;

    #[test]
    fn ownership_follows_the_author() {
        let comment = Comments {
            id: 1,
            post_id: Some(2),
            parent_id: None,
            user_id: 7,
            body: "hi".into(),
            created_at: 0,
            updated_at: 0,
        };

        assert!(AuthUser { id: 7, role: ROLE_USER }.can_modify(comment.owner_id()));
        assert!(!AuthUser { id: 8, role: ROLE_USER }.can_modify(comment.owner_id()));
        assert!(AuthUser { id: 8, role: ROLE_ADMIN }.can_modify(comment.owner_id()));
    }

    #[rocket::async_test]
    async fn invalid_target_is_rejected_before_touching_the_database() {
        let comment = NewComments {
            post_id: Some(1),
            parent_id: Some(2),
            user_id: 3,
            body: "both".into(),
            created_at: 0,
            updated_at: 0,
        };

        assert_eq!(Comments::create(comment).await.unwrap_err().melt_type, MeltType::ValidationFailed);
    }

    #[rocket::async_test]
    async fn blank_body_is_rejected_before_touching_the_database() {
        let comment = NewComments::new(CommentTarget::Post(1), 3, "   ".into(), 0);
        assert_eq!(Comments::create(comment).await.unwrap_err().melt_type, MeltType::MissingField);
    }
}
