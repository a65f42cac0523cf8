use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};

use crate::{
    database::{
        db::establish_connection,
        schema::{
            post_tags::dsl::{self as post_tag_dsl},
            tags::dsl::{self as tag_dsl},
        },
    },
    meltdown::*,
    structs::*,
};

impl Tags {
    pub async fn all() -> Result<Vec<Tags>, MeltDown> {
        let mut conn = establish_connection().await?;

        tag_dsl::tags
            .order(tag_dsl::title.asc())
            .select(Tags::as_select())
            .load::<Tags>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "all_tags"))
    }

    pub async fn create(request: CreateTagRequest) -> Result<Tags, MeltDown> {
        let title = normalize_tag_titles(&[request.title])
            .into_iter()
            .next()
            .ok_or_else(|| MeltDown::validation_failed(format!("tag title must be 1 to {} characters", MAX_TAG_TITLE_LEN)))?;

        let mut conn = establish_connection().await?;

        diesel::insert_into(tag_dsl::tags)
            .values(&NewTags {
                title,
                created_at: Utc::now().timestamp(),
            })
            .returning(Tags::as_returning())
            .get_result::<Tags>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "create_tag"))
    }

    pub async fn delete_by_id(id: i32) -> Result<(), MeltDown> {
        let mut conn = establish_connection().await?;

        let deleted = diesel::delete(tag_dsl::tags.filter(tag_dsl::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "delete_tag").with_context("id", id.to_string()))?;

        match deleted {
            0 => Err(MeltDown::record_not_found("Tag").with_context("id", id.to_string())),
            _ => Ok(()),
        }
    }

    /// Replaces the post's tags with `titles`, creating unknown tags on the way.
    pub async fn replace_for_post(post_id: i32, titles: &[String]) -> Result<Vec<Tags>, MeltDown> {
        let titles = normalize_tag_titles(titles);
        let mut conn = establish_connection().await?;

        conn.transaction::<_, MeltDown, _>(|conn| {
            async move {
                let now = Utc::now().timestamp();
                let new_tags: Vec<NewTags> = titles.iter().map(|title| NewTags { title: title.clone(), created_at: now }).collect();

                if !new_tags.is_empty() {
                    diesel::insert_into(tag_dsl::tags).values(&new_tags).on_conflict(tag_dsl::title).do_nothing().execute(conn).await?;
                }

                let found = tag_dsl::tags.filter(tag_dsl::title.eq_any(&titles)).select(Tags::as_select()).load::<Tags>(conn).await?;

                diesel::delete(post_tag_dsl::post_tags.filter(post_tag_dsl::post_id.eq(post_id))).execute(conn).await?;

                // Keep the order the titles were given in.
                let ordered: Vec<Tags> = titles.iter().filter_map(|title| found.iter().find(|tag| &tag.title == title).cloned()).collect();
                let links: Vec<NewPostTags> = ordered.iter().map(|tag| NewPostTags { post_id, tag_id: tag.id }).collect();

                if !links.is_empty() {
                    diesel::insert_into(post_tag_dsl::post_tags).values(&links).execute(conn).await?;
                }

                Ok(ordered)
            }
            .scope_boxed()
        })
        .await
        .map_err(|e| e.with_context("operation", "replace_post_tags").with_context("post_id", post_id.to_string()))
    }
}
