use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{
    database::{
        db::establish_connection,
        schema::post_views::dsl::{self as view_dsl},
    },
    meltdown::*,
    structs::*,
};

impl PostViews {
    /// Records one view and returns the post's view count.
    pub async fn record(post_id: i32) -> Result<i64, MeltDown> {
        let mut conn = establish_connection().await?;

        let view = NewPostViews {
            post_id,
            created_at: Utc::now().timestamp(),
        };

        diesel::insert_into(view_dsl::post_views)
            .values(&view)
            .execute(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "record_view").with_context("post_id", post_id.to_string()))?;

        view_dsl::post_views
            .filter(view_dsl::post_id.eq(post_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(|e| MeltDown::from(e).with_context("operation", "count_views").with_context("post_id", post_id.to_string()))
    }
}
