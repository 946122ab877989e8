//! Vote aggregation and toggle voting

use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::Result;
use crate::model::{Vote, VoteDirection};
use crate::postgrest::{Collection, Filter, ListOptions};

/// Columns identifying "the" vote of a user on a restaurant
pub const VOTE_CONFLICT_COLUMNS: [&str; 2] = ["user_id", "restaurant_id"];

/// Up/down totals for one restaurant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteCount {
    pub restaurant_id: String,
    pub up_votes: u32,
    pub down_votes: u32,
}

impl VoteCount {
    pub fn empty(restaurant_id: &str) -> Self {
        Self {
            restaurant_id: restaurant_id.to_string(),
            up_votes: 0,
            down_votes: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.up_votes + self.down_votes
    }

    pub fn popularity(&self) -> i64 {
        popularity(self)
    }
}

/// Vote totals keyed by restaurant id
pub type VoteTally = HashMap<String, VoteCount>;

/// Count every vote, in one pass, from scratch
pub fn tally(votes: &[Vote]) -> VoteTally {
    let mut counts = VoteTally::new();
    for vote in votes {
        let count = counts
            .entry(vote.restaurant_id.clone())
            .or_insert_with(|| VoteCount::empty(&vote.restaurant_id));
        match vote.vote_type {
            VoteDirection::Up => count.up_votes += 1,
            VoteDirection::Down => count.down_votes += 1,
        }
    }
    counts
}

/// Up votes minus down votes; negative when down votes dominate
pub fn popularity(count: &VoteCount) -> i64 {
    i64::from(count.up_votes) - i64::from(count.down_votes)
}

/// Totals for a restaurant, zero when nobody voted
pub fn count_for(tally: &VoteTally, restaurant_id: &str) -> VoteCount {
    tally
        .get(restaurant_id)
        .cloned()
        .unwrap_or_else(|| VoteCount::empty(restaurant_id))
}

/// Vote of one user on one restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteState {
    #[default]
    NoVote,
    Up,
    Down,
}

/// The single persistence call a vote action maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    Create(VoteDirection),
    Update {
        from: VoteDirection,
        to: VoteDirection,
    },
    Delete(VoteDirection),
}

impl From<Option<VoteDirection>> for VoteState {
    fn from(direction: Option<VoteDirection>) -> Self {
        match direction {
            None => VoteState::NoVote,
            Some(VoteDirection::Up) => VoteState::Up,
            Some(VoteDirection::Down) => VoteState::Down,
        }
    }
}

impl VoteState {
    pub fn direction(&self) -> Option<VoteDirection> {
        match self {
            VoteState::NoVote => None,
            VoteState::Up => Some(VoteDirection::Up),
            VoteState::Down => Some(VoteDirection::Down),
        }
    }

    /// Voting `direction` from this state.
    ///
    /// Same direction twice removes the vote; the opposite direction flips it.
    pub fn apply(self, direction: VoteDirection) -> (VoteState, VoteTransition) {
        match self.direction() {
            None => (Some(direction).into(), VoteTransition::Create(direction)),
            Some(current) if current == direction => {
                (VoteState::NoVote, VoteTransition::Delete(direction))
            }
            Some(current) => (
                Some(direction).into(),
                VoteTransition::Update {
                    from: current,
                    to: direction,
                },
            ),
        }
    }
}

/// The current user's own votes, as last loaded and locally updated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MyVotes {
    votes: Vec<Vote>,
}

impl MyVotes {
    pub fn new(votes: Vec<Vote>) -> Self {
        Self { votes }
    }

    pub fn find(&self, restaurant_id: &str) -> Option<&Vote> {
        self.votes.iter().find(|v| v.restaurant_id == restaurant_id)
    }

    pub fn state_for(&self, restaurant_id: &str) -> VoteState {
        self.find(restaurant_id).map(|v| v.vote_type).into()
    }

    pub fn as_slice(&self) -> &[Vote] {
        &self.votes
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    fn put(&mut self, vote: Vote) {
        match self
            .votes
            .iter_mut()
            .find(|v| v.restaurant_id == vote.restaurant_id)
        {
            Some(existing) => *existing = vote,
            None => self.votes.push(vote),
        }
    }

    fn remove(&mut self, restaurant_id: &str) {
        self.votes.retain(|v| v.restaurant_id != restaurant_id);
    }
}

/// Reads and writes the vote collection
#[derive(Clone)]
pub struct VoteService {
    votes: Collection<Vote>,
}

impl VoteService {
    pub fn new(votes: Collection<Vote>) -> Self {
        Self { votes }
    }

    /// Every vote of every user
    pub async fn load_all(&self, session: &Session) -> Result<Vec<Vote>> {
        self.votes.list(session, &ListOptions::new()).await
    }

    /// Votes cast by the session's user
    pub async fn load_my_votes(&self, session: &Session) -> Result<Vec<Vote>> {
        self.votes
            .list(session, &ListOptions::new().eq("user_id", &session.user.id))
            .await
    }

    /// Totals for every restaurant
    pub async fn tally_all(&self, session: &Session) -> Result<VoteTally> {
        let votes = self.load_all(session).await?;
        Ok(tally(&votes))
    }

    /// Apply a vote action for the session's user and persist it with one call.
    ///
    /// Create and flip go through an upsert keyed on (user, restaurant), so a
    /// stale local view never produces a second row. Removal deletes the user's
    /// vote on the restaurant whatever its direction. `mine` is updated after
    /// the call succeeds.
    ///
    /// When the votes table has no unique index on (user, restaurant) the store
    /// rejects the upsert; the vote is then created, or updated by id.
    pub async fn cast(
        &self,
        session: &Session,
        mine: &mut MyVotes,
        restaurant_id: &str,
        direction: VoteDirection,
    ) -> Result<VoteState> {
        let (next, transition) = mine.state_for(restaurant_id).apply(direction);
        log::debug!(
            "vote {} on {} by {}: {:?}",
            direction,
            restaurant_id,
            session.user.id,
            transition
        );

        match transition {
            VoteTransition::Create(to) | VoteTransition::Update { to, .. } => {
                let known = mine.find(restaurant_id).map(|v| v.id.clone());
                let vote = Vote {
                    id: known
                        .clone()
                        .unwrap_or_else(|| Uuid::new_v4().to_string()),
                    restaurant_id: restaurant_id.to_string(),
                    user_id: session.user.id.clone(),
                    vote_type: to,
                };
                let stored = match self
                    .votes
                    .upsert(session, &vote, &VOTE_CONFLICT_COLUMNS)
                    .await
                {
                    Err(e) if e.is_missing_conflict_target() => {
                        log::warn!(
                            "{} has no unique index on ({}), voting by id",
                            self.votes.table(),
                            VOTE_CONFLICT_COLUMNS.join(", ")
                        );
                        match known {
                            Some(id) => {
                                self.votes
                                    .update(session, &id, &json!({ "vote_type": to }))
                                    .await?
                            }
                            None => self.votes.create(session, &vote).await?,
                        }
                    }
                    result => result?,
                };
                mine.put(stored);
            }
            VoteTransition::Delete(removed) => {
                let filters = [
                    Filter::eq("user_id", &session.user.id),
                    Filter::eq("restaurant_id", restaurant_id),
                ];
                let deleted = self.votes.delete_where(session, &filters).await?;
                if deleted == 0 {
                    log::warn!(
                        "no vote left to remove on {} (clicked {}); local view was stale",
                        restaurant_id,
                        removed
                    );
                }
                mine.remove(restaurant_id);
            }
        }

        Ok(next)
    }
}
