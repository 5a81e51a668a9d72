use std::collections::HashMap;

use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Database,
    bson::{Bson, doc, oid::ObjectId},
};

use crate::models::poll_models::{Poll, PollOption};
use crate::models::vote_models::{PollResult, Vote};
use crate::utils::error::{AppError, AppResult, is_duplicate_key_error};

/// Vote persistence: at most one vote per (poll, voter identity).
#[derive(Clone)]
pub struct VoteStore {
    db: Database,
}

impl VoteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Records one vote. The duplicate pre-check is advisory; the unique
    /// index on (poll_id, voter_id) is what actually stops a concurrent
    /// double vote, so a duplicate-key write error maps to the same
    /// conflict.
    pub async fn create(
        &self,
        poll_id: ObjectId,
        option_id: &str,
        voter_id: &str,
        is_anonymous: bool,
    ) -> AppResult<Vote> {
        let votes = self.db.collection::<Vote>("votes");

        let existing = votes
            .find_one(doc! { "poll_id": poll_id, "voter_id": voter_id })
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "User has already voted on this poll".to_string(),
            ));
        }

        let poll = self
            .db
            .collection::<Poll>("polls")
            .find_one(doc! { "_id": poll_id })
            .await?
            .ok_or_else(|| AppError::NotFound("Poll not found".to_string()))?;

        if !poll.options.iter().any(|option| option.id == option_id) {
            return Err(AppError::BadRequest(
                "Invalid option for this poll".to_string(),
            ));
        }

        let vote = Vote {
            id: ObjectId::new(),
            poll_id,
            option_id: option_id.to_string(),
            voter_id: voter_id.to_string(),
            is_anonymous,
            created_at: Utc::now(),
        };

        match votes.insert_one(&vote).await {
            Ok(_) => Ok(vote),
            Err(err) if is_duplicate_key_error(&err) => Err(AppError::Conflict(
                "User has already voted on this poll".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Count and percentage per option, most-voted first. Options with no
    /// votes report zero.
    pub async fn results(
        &self,
        poll_id: ObjectId,
        options: &[PollOption],
    ) -> AppResult<Vec<PollResult>> {
        let votes = self.db.collection::<Vote>("votes");

        let total = votes.count_documents(doc! { "poll_id": poll_id }).await?;

        let pipeline = vec![
            doc! { "$match": { "poll_id": poll_id } },
            doc! { "$group": { "_id": "$option_id", "count": { "$sum": 1 } } },
        ];

        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut cursor = votes.aggregate(pipeline).await?;
        while let Some(row) = cursor.try_next().await? {
            let Ok(option_id) = row.get_str("_id") else {
                continue;
            };
            let count = match row.get("count") {
                Some(Bson::Int32(n)) => *n as u64,
                Some(Bson::Int64(n)) => *n as u64,
                _ => 0,
            };
            counts.insert(option_id.to_string(), count);
        }

        Ok(assemble_results(options, &counts, total))
    }
}

/// Merges raw per-option counts into ordered result rows. The sort is
/// stable, so equal counts keep the original option order.
pub fn assemble_results(
    options: &[PollOption],
    counts: &HashMap<String, u64>,
    total: u64,
) -> Vec<PollResult> {
    let mut rows: Vec<PollResult> = options
        .iter()
        .map(|option| {
            let vote_count = counts.get(&option.id).copied().unwrap_or(0);
            let percentage = if total > 0 {
                (vote_count as f64 / total as f64 * 100.0).round()
            } else {
                0.0
            };
            PollResult {
                option_id: option.id.clone(),
                option_text: option.text.clone(),
                vote_count,
                percentage,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(texts: &[&str]) -> Vec<PollOption> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| PollOption {
                id: format!("option-{i}"),
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn zero_votes_yields_all_zero_rows() {
        let options = options(&["Pizza", "Salad"]);
        let rows = assemble_results(&options, &HashMap::new(), 0);

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.vote_count, 0);
            assert_eq!(row.percentage, 0.0);
        }
    }

    #[test]
    fn counts_sum_to_total_and_percentages_to_roughly_100() {
        let options = options(&["A", "B", "C"]);
        let counts = HashMap::from([
            ("option-0".to_string(), 2),
            ("option-1".to_string(), 1),
        ]);

        let rows = assemble_results(&options, &counts, 3);

        let count_sum: u64 = rows.iter().map(|r| r.vote_count).sum();
        assert_eq!(count_sum, 3);

        let pct_sum: f64 = rows.iter().map(|r| r.percentage).sum();
        assert!((pct_sum - 100.0).abs() <= 1.0, "pct_sum = {pct_sum}");
    }

    #[test]
    fn rows_are_ordered_by_descending_count() {
        let options = options(&["A", "B", "C"]);
        let counts = HashMap::from([
            ("option-1".to_string(), 5),
            ("option-2".to_string(), 2),
            ("option-0".to_string(), 1),
        ]);

        let rows = assemble_results(&options, &counts, 8);

        assert_eq!(rows[0].option_text, "B");
        assert_eq!(rows[1].option_text, "C");
        assert_eq!(rows[2].option_text, "A");
    }

    #[test]
    fn ties_keep_original_option_order() {
        let options = options(&["A", "B", "C"]);
        let counts = HashMap::from([
            ("option-0".to_string(), 1),
            ("option-1".to_string(), 1),
            ("option-2".to_string(), 1),
        ]);

        let rows = assemble_results(&options, &counts, 3);

        let texts: Vec<&str> = rows.iter().map(|r| r.option_text.as_str()).collect();
        assert_eq!(texts, ["A", "B", "C"]);
    }

    #[test]
    fn percentage_is_rounded() {
        let options = options(&["A", "B"]);
        let counts = HashMap::from([
            ("option-0".to_string(), 1),
            ("option-1".to_string(), 2),
        ]);

        let rows = assemble_results(&options, &counts, 3);

        assert_eq!(rows[0].option_text, "B");
        assert_eq!(rows[0].percentage, 67.0);
        assert_eq!(rows[1].percentage, 33.0);
    }

    #[test]
    fn options_missing_from_counts_report_zero() {
        let options = options(&["A", "B"]);
        let counts = HashMap::from([("option-0".to_string(), 4)]);

        let rows = assemble_results(&options, &counts, 4);

        assert_eq!(rows[0].vote_count, 4);
        assert_eq!(rows[0].percentage, 100.0);
        assert_eq!(rows[1].vote_count, 0);
        assert_eq!(rows[1].percentage, 0.0);
    }
}
