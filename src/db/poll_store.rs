use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Database,
    bson::{doc, oid::ObjectId},
};

use crate::models::poll_models::{Poll, PollOption};
use crate::models::vote_models::Vote;
use crate::utils::error::{AppError, AppResult, is_duplicate_key_error};

/// Poll persistence and read assembly.
#[derive(Clone)]
pub struct PollStore {
    db: Database,
}

/// A poll with its poll-wide vote count folded in.
#[derive(Debug, Clone)]
pub struct PollWithCount {
    pub poll: Poll,
    pub vote_count: u64,
}

impl PollStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts the poll and its options as one document, so creation is
    /// atomic and partial insertion is never observable. A duplicate title
    /// trips the unique index. Option count and title presence are
    /// validated by the caller.
    pub async fn create(
        &self,
        title: &str,
        options: &[String],
        creator_id: Option<String>,
        creator_name: Option<String>,
        is_anonymous_creator: bool,
        allow_anonymous_voting: bool,
    ) -> AppResult<Poll> {
        let poll = Poll {
            id: ObjectId::new(),
            title: title.to_string(),
            creator_id,
            creator_name,
            is_anonymous_creator,
            allow_anonymous_voting,
            created_at: Utc::now(),
            options: options
                .iter()
                .map(|text| PollOption {
                    id: ObjectId::new().to_hex(),
                    text: text.clone(),
                })
                .collect(),
        };

        match self.db.collection::<Poll>("polls").insert_one(&poll).await {
            Ok(_) => Ok(poll),
            Err(err) if is_duplicate_key_error(&err) => Err(AppError::Conflict(
                "A poll with this title already exists".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<PollWithCount>> {
        let poll = self
            .db
            .collection::<Poll>("polls")
            .find_one(doc! { "_id": id })
            .await?;

        match poll {
            Some(poll) => {
                let vote_count = self.count_votes(id).await?;
                Ok(Some(PollWithCount { poll, vote_count }))
            }
            None => Ok(None),
        }
    }

    /// All polls, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<PollWithCount>> {
        let mut cursor = self
            .db
            .collection::<Poll>("polls")
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;

        let mut polls = Vec::new();
        while let Some(poll) = cursor.try_next().await? {
            let vote_count = self.count_votes(poll.id).await?;
            polls.push(PollWithCount { poll, vote_count });
        }

        Ok(polls)
    }

    /// Existence check on the votes collection's unique-key pair.
    pub async fn has_voted(&self, poll_id: ObjectId, voter_id: &str) -> AppResult<bool> {
        let vote = self
            .db
            .collection::<Vote>("votes")
            .find_one(doc! { "poll_id": poll_id, "voter_id": voter_id })
            .await?;

        Ok(vote.is_some())
    }

    async fn count_votes(&self, poll_id: ObjectId) -> AppResult<u64> {
        Ok(self
            .db
            .collection::<Vote>("votes")
            .count_documents(doc! { "poll_id": poll_id })
            .await?)
    }
}
