use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, RunQueryDsl};

use crate::{
    database::{
        db::establish_connection,
        schema::votes::dsl::{self as vote_dsl},
    },
    meltdown::*,
    structs::*,
};

impl Votes {
    /// Records the caller's vote on a post. Casting the vote already held removes it,
    /// casting the other type switches it. Returns the caller's vote afterwards and the
    /// post's net score.
    pub async fn cast(post_id: i32, user_id: i32, vote_type: VoteType) -> Result<(Option<VoteType>, i64), MeltDown> {
        let mut conn = establish_connection().await?;

        conn.transaction::<_, MeltDown, _>(|conn| {
            async move {
                let mine = vote_dsl::votes.filter(vote_dsl::post_id.eq(post_id)).filter(vote_dsl::user_id.eq(user_id));

                let current = mine.clone().select(Votes::as_select()).first::<Votes>(conn).await.optional()?;

                let vote = match current {
                    Some(existing) if existing.vote_type == vote_type.as_str() => {
                        diesel::delete(mine.clone()).execute(conn).await?;
                        None
                    }
                    Some(_) => {
                        diesel::update(mine).set(vote_dsl::vote_type.eq(vote_type.as_str())).execute(conn).await?;
                        Some(vote_type)
                    }
                    None => {
                        let new_vote = NewVotes {
                            post_id,
                            user_id,
                            vote_type: vote_type.as_str().to_string(),
                            created_at: Utc::now().timestamp(),
                        };
                        diesel::insert_into(vote_dsl::votes).values(&new_vote).execute(conn).await?;
                        Some(vote_type)
                    }
                };

                let types = vote_dsl::votes.filter(vote_dsl::post_id.eq(post_id)).select(vote_dsl::vote_type).load::<String>(conn).await?;

                Ok((vote, net_score(types.iter().map(String::as_str))))
            }
            .scope_boxed()
        })
        .await
        .map_err(|e| e.with_context("operation", "cast_vote").with_context("post_id", post_id.to_string()))
    }
}
