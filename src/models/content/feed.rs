use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;

use crate::{
    database::db::establish_connection,
    meltdown::*,
    services::PageRequest,
    structs::*,
};

/// Paging for the feed. Without `page` and `limit` the whole feed is returned.
pub fn feed_window(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Option<PageRequest> {
    match (page, limit) {
        (None, None) => None,
        _ => Some(PageRequest::from_query(page, limit, default_limit)),
    }
}

/// Published posts with their counters, author and first tags.
/// Correlated sub-selects keep posts with no bookmarks, views or votes at 0.
pub fn feed_sql(sort: PostSort, paged: bool) -> String {
    let order = match sort {
        PostSort::Newest => "p.created_at DESC, p.id DESC",
        PostSort::Default => "p.id ASC",
    };

    format!(
        r#"SELECT p.id, p.title, p.content, p.published, p.created_at,
    (SELECT COUNT(*) FROM bookmarks b WHERE b.post_id = p.id) AS bookmarks,
    (SELECT COUNT(*) FROM post_views pv WHERE pv.post_id = p.id) AS views,
    (SELECT COALESCE(SUM({vote_score}), 0) FROM votes vt WHERE vt.post_id = p.id)::BIGINT AS votes,
    u.id AS author_id, u.username AS author_username, u.role AS author_role, u.created_at AS author_created_at,
    COALESCE((
        SELECT jsonb_agg(jsonb_build_object('id', t.id, 'title', t.title) ORDER BY pt.id)
        FROM (SELECT id, tag_id FROM post_tags WHERE post_id = p.id ORDER BY id LIMIT {tag_limit}) pt
        JOIN tags t ON t.id = pt.tag_id
    ), '[]'::jsonb) AS tags
FROM posts p
LEFT JOIN users u ON u.id = p.user_id
WHERE p.published = TRUE
ORDER BY {order}{window}"#,
        vote_score = VoteType::score_case_sql("vt.vote_type"),
        tag_limit = FEED_TAG_LIMIT,
        order = order,
        window = if paged { "\nLIMIT $1 OFFSET $2" } else { "" },
    )
}

impl FeedPost {
    pub async fn load(sort: PostSort, window: Option<PageRequest>) -> Result<Vec<FeedPost>, MeltDown> {
        let mut conn = establish_connection().await?;

        let rows = match window {
            Some(page) => {
                diesel::sql_query(feed_sql(sort, true))
                    .bind::<BigInt, _>(page.take())
                    .bind::<BigInt, _>(page.skip())
                    .load::<FeedRow>(&mut conn)
                    .await
            }
            None => diesel::sql_query(feed_sql(sort, false)).load::<FeedRow>(&mut conn).await,
        }
        .map_err(|e| MeltDown::from(e).with_context("operation", "load_feed"))?;

        rows.into_iter().map(FeedPost::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_sorts_by_creation_time() {
        assert!(feed_sql(PostSort::Newest, false).contains("ORDER BY p.created_at DESC, p.id DESC"));
        assert!(feed_sql(PostSort::Default, false).contains("ORDER BY p.id ASC"));
    }

    #[test]
    fn only_published_posts_with_capped_tags() {
        let sql = feed_sql(PostSort::Default, false);
        assert!(sql.contains("WHERE p.published = TRUE"));
        assert!(sql.contains("LIMIT 6)"));
        assert!(sql.contains("LEFT JOIN users u"));
    }

    #[test]
    fn never_selects_the_password() {
        assert!(!feed_sql(PostSort::Newest, false).contains("password"));
    }

    #[test]
    fn unpaged_feed_has_no_limit() {
        assert!(feed_window(None, None, 10).is_none());
        assert!(!feed_sql(PostSort::Default, false).contains("LIMIT $1"));
        assert!(feed_sql(PostSort::Newest, true).ends_with("ORDER BY p.created_at DESC, p.id DESC\nLIMIT $1 OFFSET $2"));
    }

    #[test]
    fn either_paging_param_pages_the_feed() {
        assert_eq!(feed_window(Some(3), None, 10), Some(PageRequest { page: 3, limit: 10 }));
        assert_eq!(feed_window(None, Some(4), 10), Some(PageRequest { page: 1, limit: 4 }));
    }

    #[test]
    fn votes_are_weighted_in_sql() {
        assert!(feed_sql(PostSort::Default, false).contains("WHEN 'Upvote' THEN 1 WHEN 'Downvote' THEN -1"));
    }

    mod seeded {
        use diesel::prelude::*;
        use diesel_async::{AsyncPgConnection, RunQueryDsl};
        use uuid::Uuid;

        use super::*;
        use crate::database::{
            db::init_connection_pool,
            schema::{bookmarks, post_tags, posts, tags, users, votes},
        };

        async fn user(conn: &mut AsyncPgConnection, name: &str) -> i32 {
            diesel::insert_into(users::table)
                .values((
                    users::username.eq(name),
                    users::email.eq(format!("{name}@quill.test")),
                    users::password_hash.eq("x"),
                    users::role.eq(ROLE_USER),
                    users::created_at.eq(1_700_000_000),
                    users::updated_at.eq(1_700_000_000),
                ))
                .returning(users::id)
                .get_result(conn)
                .await
                .unwrap()
        }

        async fn post(conn: &mut AsyncPgConnection, user_id: i32, title: &str, published: bool) -> i32 {
            diesel::insert_into(posts::table)
                .values((
                    posts::user_id.eq(user_id),
                    posts::title.eq(title),
                    posts::content.eq("seeded"),
                    posts::published.eq(published),
                    posts::created_at.eq(1_700_000_000),
                    posts::updated_at.eq(1_700_000_000),
                ))
                .returning(posts::id)
                .get_result(conn)
                .await
                .unwrap()
        }

        #[tokio::test]
        #[ignore = "needs DATABASE_URL pointing at a migrated database"]
        async fn feed_reduces_joined_rows() {
            let _ = init_connection_pool();
            let mut conn = establish_connection().await.unwrap();
            let run = Uuid::new_v4().simple().to_string();

            let author = user(&mut conn, &format!("author-{run}")).await;
            let mut readers = Vec::new();
            for i in 0..3 {
                readers.push(user(&mut conn, &format!("reader{i}-{run}")).await);
            }

            let busy = post(&mut conn, author, "busy", true).await;
            let quiet = post(&mut conn, author, "quiet", true).await;
            let draft = post(&mut conn, author, "draft", false).await;

            for reader in &readers {
                diesel::insert_into(bookmarks::table)
                    .values((bookmarks::post_id.eq(busy), bookmarks::user_id.eq(*reader), bookmarks::created_at.eq(1_700_000_000)))
                    .execute(&mut conn)
                    .await
                    .unwrap();
            }

            for (reader, vote_type) in readers.iter().zip(["Upvote", "Upvote", "Downvote"]) {
                diesel::insert_into(votes::table)
                    .values((votes::post_id.eq(busy), votes::user_id.eq(*reader), votes::vote_type.eq(vote_type), votes::created_at.eq(1_700_000_000)))
                    .execute(&mut conn)
                    .await
                    .unwrap();
            }

            let mut tag_ids = Vec::new();
            for i in 0..7 {
                let tag_id: i32 = diesel::insert_into(tags::table)
                    .values((tags::title.eq(format!("feed-{run}-{i}")), tags::created_at.eq(1_700_000_000)))
                    .returning(tags::id)
                    .get_result(&mut conn)
                    .await
                    .unwrap();
                diesel::insert_into(post_tags::table)
                    .values((post_tags::post_id.eq(busy), post_tags::tag_id.eq(tag_id)))
                    .execute(&mut conn)
                    .await
                    .unwrap();
                tag_ids.push(tag_id);
            }
            drop(conn);

            let feed = FeedPost::load(PostSort::Default, None).await.unwrap();

            let mut conn = establish_connection().await.unwrap();
            diesel::delete(tags::table.filter(tags::id.eq_any(tag_ids.clone()))).execute(&mut conn).await.unwrap();
            diesel::delete(users::table.filter(users::id.eq(author).or(users::id.eq_any(readers.clone())))).execute(&mut conn).await.unwrap();

            let busy_post = feed.iter().find(|p| p.id == busy).unwrap();
            assert_eq!((busy_post.bookmarks, busy_post.views, busy_post.votes), (3, 0, 1));
            assert_eq!(busy_post.tags.iter().map(|t| t.id).collect::<Vec<_>>(), tag_ids[..FEED_TAG_LIMIT as usize].to_vec());
            assert_eq!(busy_post.user.as_ref().map(|u| u.id), Some(author));

            let quiet_post = feed.iter().find(|p| p.id == quiet).unwrap();
            assert_eq!((quiet_post.bookmarks, quiet_post.views, quiet_post.votes), (0, 0, 0));
            assert!(quiet_post.tags.is_empty());

            assert!(feed.iter().all(|p| p.id != draft));
        }
    }
}
