use chrono::Utc;
use diesel::{pg::Pg, prelude::*};
use diesel_async::RunQueryDsl;
use rocket::async_trait;

use crate::{
    database::{
        db::establish_connection,
        schema::{
            posts::dsl::{self as post_dsl},
            users,
        },
    },
    meltdown::*,
    middleware::{Owned, OwnedResource},
    structs::*,
};

impl Posts {
    pub async fn find(id: i32) -> Result<Option<Posts>, MeltDown> {
        let mut conn = establish_connection().await?;

        post_dsl::posts
            .filter(post_dsl::id.eq(id))
            .select(Posts::as_select())
            .first::<Posts>(&mut conn)
            .await
            .optional()
            .map_err(|e| MeltDown::from(e).with_context("operation", "find_post").with_context("id", id.to_string()))
    }

    pub async fn get_by_id(id: i32) -> Result<Posts, MeltDown> {
        Self::find(id).await?.ok_or_else(|| MeltDown::record_not_found("Post").with_context("id", id.to_string()))
    }

    /// The post with its author embedded, `user` is `None` for an orphaned post.
    pub async fn get_with_author(id: i32) -> Result<PostWithAuthor, MeltDown> {
        let mut conn = establish_connection().await?;

        post_dsl::posts
            .left_join(users::table)
            .filter(post_dsl::id.eq(id))
            .select((Posts::as_select(), Option::<Users>::as_select()))
            .first::<(Posts, Option<Users>)>(&mut conn)
            .await
            .optional()
            .map_err(|e| MeltDown::from(e).with_context("operation", "get_post_with_author").with_context("id", id.to_string()))?
            .map(|(post, user)| PostWithAuthor { post, user })
            .ok_or_else(|| MeltDown::record_not_found("Post").with_context("id", id.to_string()))
    }

    pub async fn create(user_id: i32, request: CreatePostRequest) -> Result<PostWithAuthor, MeltDown> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(MeltDown::missing_field("title"));
        }

        let now = Utc::now().timestamp();
        let new_post = NewPosts {
            user_id,
            title,
            content: request.content,
            published: request.published,
            created_at: now,
            updated_at: now,
        };

        let mut conn = establish_connection().await?;
        let post = diesel::insert_into(post_dsl::posts)
            .values(&new_post)
            .returning(Posts::as_returning())
            .get_result::<Posts>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "create_post").with_context("user_id", user_id.to_string()))?;

        Self::get_with_author(post.id).await
    }

    pub async fn update_by_id(id: i32, request: UpdatePostRequest) -> Result<PostWithAuthor, MeltDown> {
        let title = request.title.map(|title| title.trim().to_string());
        if title.as_deref() == Some("") {
            return Err(MeltDown::validation_failed("title cannot be empty"));
        }

        let changes = UpdatePosts {
            title,
            content: request.content,
            published: request.published,
            updated_at: Utc::now().timestamp(),
        };

        let mut conn = establish_connection().await?;
        let updated = diesel::update(post_dsl::posts.filter(post_dsl::id.eq(id)))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "update_post").with_context("id", id.to_string()))?;

        if updated == 0 {
            return Err(MeltDown::record_not_found("Post").with_context("id", id.to_string()));
        }

        Self::get_with_author(id).await
    }

    /// Comments, votes, bookmarks, views and tag links go with the post (`ON DELETE CASCADE`).
    pub async fn delete_by_id(id: i32) -> Result<(), MeltDown> {
        let mut conn = establish_connection().await?;

        let deleted = diesel::delete(post_dsl::posts.filter(post_dsl::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "delete_post").with_context("id", id.to_string()))?;

        match deleted {
            0 => Err(MeltDown::record_not_found("Post").with_context("id", id.to_string())),
            _ => Ok(()),
        }
    }

    /// One page of published posts and the total number of matches.
    pub async fn list(query: &PostListQuery) -> Result<(Vec<Posts>, i64), MeltDown> {
        let mut conn = establish_connection().await?;
        let pattern = query.search_pattern();

        let mut count = post_dsl::posts.filter(post_dsl::published.eq(true)).into_boxed::<Pg>();
        let mut page = post_dsl::posts.filter(post_dsl::published.eq(true)).into_boxed::<Pg>();

        if let Some(pattern) = &pattern {
            count = count.filter(post_dsl::content.ilike(pattern.clone()));
            page = page.filter(post_dsl::content.ilike(pattern.clone()));
        }

        page = match query.sort {
            PostSort::Newest => page.order((post_dsl::created_at.desc(), post_dsl::id.desc())),
            PostSort::Default => page.order(post_dsl::id.asc()),
        };

        let total = count
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "count_posts"))?;

        let posts = page
            .offset(query.skip)
            .limit(query.take)
            .select(Posts::as_select())
            .load::<Posts>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "list_posts"))?;

        Ok((posts, total))
    }
}

impl Owned for Posts {
    const NAME: &'static str = "Post";

    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

#[async_trait]
impl OwnedResource for Posts {
    async fn find(id: i32) -> Result<Option<Self>, MeltDown> {
        Posts::find(id).await
    }
}
