use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};

use crate::{
    database::{
        db::establish_connection,
        schema::bookmarks::dsl::{self as bookmark_dsl},
    },
    meltdown::*,
    structs::*,
};

impl Bookmarks {
    pub async fn find_by_post(post_id: i32) -> Result<Vec<Bookmarks>, MeltDown> {
        let mut conn = establish_connection().await?;

        bookmark_dsl::bookmarks
            .filter(bookmark_dsl::post_id.eq(post_id))
            .order(bookmark_dsl::id.asc())
            .select(Bookmarks::as_select())
            .load::<Bookmarks>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "find_bookmarks_of_post").with_context("post_id", post_id.to_string()))
    }

    /// Adds the caller's bookmark or removes it when present.
    /// Returns whether the post is now bookmarked and the post's bookmark total.
    pub async fn toggle(post_id: i32, user_id: i32) -> Result<(bool, i64), MeltDown> {
        let mut conn = establish_connection().await?;

        conn.transaction::<_, MeltDown, _>(|conn| {
            async move {
                let removed = diesel::delete(bookmark_dsl::bookmarks.filter(bookmark_dsl::post_id.eq(post_id)).filter(bookmark_dsl::user_id.eq(user_id)))
                    .execute(conn)
                    .await?;

                if removed == 0 {
                    let bookmark = NewBookmarks {
                        post_id,
                        user_id,
                        created_at: Utc::now().timestamp(),
                    };
                    diesel::insert_into(bookmark_dsl::bookmarks).values(&bookmark).execute(conn).await?;
                }

                let total = bookmark_dsl::bookmarks.filter(bookmark_dsl::post_id.eq(post_id)).count().get_result::<i64>(conn).await?;

                Ok((removed == 0, total))
            }
            .scope_boxed()
        })
        .await
        .map_err(|e| e.with_context("operation", "toggle_bookmark").with_context("post_id", post_id.to_string()))
    }
}
