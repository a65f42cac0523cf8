use std::{fmt, str::FromStr};

use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::{database::schema::votes, meltdown::*};

#[derive(Debug, Queryable, Selectable, Clone, Serialize, Deserialize, Identifiable)]
#[diesel(table_name = votes)]
pub struct Votes {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub vote_type: String,
    pub created_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = votes)]
pub struct NewVotes {
    pub post_id: i32,
    pub user_id: i32,
    pub vote_type: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub const ALL: [VoteType; 2] = [VoteType::Upvote, VoteType::Downvote];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Upvote => "Upvote",
            VoteType::Downvote => "Downvote",
        }
    }

    pub fn weight(&self) -> i64 {
        match self {
            VoteType::Upvote => 1,
            VoteType::Downvote => -1,
        }
    }

    /// SQL `CASE` turning a vote type column into its weight, unknown values count 0.
    pub fn score_case_sql(column: &str) -> String {
        let arms: Vec<String> = Self::ALL.iter().map(|vote| format!("WHEN '{}' THEN {}", vote.as_str(), vote.weight())).collect();
        format!("CASE {} {} ELSE 0 END", column, arms.join(" "))
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteType {
    type Err = MeltDown;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|vote| vote.as_str() == value)
            .ok_or_else(|| MeltDown::invalid_input(format!("unknown vote type '{}'", value)))
    }
}

/// Net score: +1 per upvote, -1 per downvote.
pub fn net_score<'a>(vote_types: impl IntoIterator<Item = &'a str>) -> i64 {
    vote_types.into_iter().filter_map(|value| value.parse::<VoteType>().ok()).map(|vote| vote.weight()).sum()
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "type", alias = "vote_type")]
    pub vote_type: VoteType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_counts_upvotes_minus_downvotes() {
        assert_eq!(net_score(["Upvote", "Upvote", "Downvote"]), 1);
        assert_eq!(net_score(["Downvote", "Downvote"]), -2);
    }

    #[test]
    fn no_votes_scores_zero() {
        assert_eq!(net_score(Vec::<&str>::new()), 0);
    }

    #[test]
    fn unknown_types_do_not_count() {
        assert_eq!(net_score(["Upvote", "Sidevote"]), 1);
        assert!("Sidevote".parse::<VoteType>().is_err());
    }

    #[test]
    fn case_expression_covers_both_types() {
        assert_eq!(
            VoteType::score_case_sql("vt.vote_type"),
            "CASE vt.vote_type WHEN 'Upvote' THEN 1 WHEN 'Downvote' THEN -1 ELSE 0 END"
        );
    }

    #[test]
    fn request_reads_type_field() {
        let request: VoteRequest = serde_json::from_str(r#"{"type":"Downvote"}"#).unwrap();
        assert_eq!(request.vote_type, VoteType::Downvote);
        assert!(serde_json::from_str::<VoteRequest>(r#"{"type":"upvote"}"#).is_err());
    }
}
