//! Profile statistics, badge tiers and achievements

use std::collections::HashSet;

use crate::auth::Session;
use crate::error::Result;
use crate::model::{Restaurant, Vote, VoteDirection};
use crate::restaurants::RestaurantStore;
use crate::votes::VoteService;

/// Votes given before "Contributeur actif" is earned
pub const ACTIVE_CONTRIBUTOR_VOTES: u32 = 5;

/// Aggregates shown on the profile page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total_restaurants: u32,
    pub total_votes_received: u32,
    pub up_votes_received: u32,
    pub down_votes_received: u32,
    pub total_votes_given: u32,
    pub popularity_score: i64,
}

impl UserStats {
    pub fn badge(&self) -> BadgeTier {
        BadgeTier::from_score(self.popularity_score)
    }
}

/// Rank earned from the popularity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BadgeTier {
    Debutant,
    Decouvreur,
    Foodie,
    Gourmet,
    ExpertCulinaire,
}

impl BadgeTier {
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s >= 20 => BadgeTier::ExpertCulinaire,
            s if s >= 10 => BadgeTier::Gourmet,
            s if s >= 5 => BadgeTier::Foodie,
            s if s >= 1 => BadgeTier::Decouvreur,
            _ => BadgeTier::Debutant,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BadgeTier::Debutant => "Débutant",
            BadgeTier::Decouvreur => "Découvreur",
            BadgeTier::Foodie => "Foodie",
            BadgeTier::Gourmet => "Gourmet",
            BadgeTier::ExpertCulinaire => "Expert Culinaire",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BadgeTier::Debutant => "gray",
            BadgeTier::Decouvreur => "green",
            BadgeTier::Foodie => "blue",
            BadgeTier::Gourmet => "purple",
            BadgeTier::ExpertCulinaire => "yellow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub title: &'static str,
    pub unlocked: bool,
    /// What is left to do, for locked achievements that track progress
    pub hint: Option<String>,
}

pub fn achievements(stats: &UserStats) -> Vec<Achievement> {
    let active = stats.total_votes_given >= ACTIVE_CONTRIBUTOR_VOTES;
    vec![
        Achievement {
            title: "Premier restaurant ajouté",
            unlocked: stats.total_restaurants > 0,
            hint: None,
        },
        Achievement {
            title: "Premier vote positif",
            unlocked: stats.popularity_score > 0,
            hint: None,
        },
        Achievement {
            title: "Contributeur actif",
            unlocked: active,
            hint: (!active).then(|| {
                format!(
                    "Votez pour {} restaurants de plus",
                    ACTIVE_CONTRIBUTOR_VOTES - stats.total_votes_given
                )
            }),
        },
    ]
}

fn saturating_count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Stats from already-loaded data.
///
/// Received votes are those on an owned restaurant, whoever cast them.
pub fn compute_from(owned: &[Restaurant], all_votes: &[Vote], given: &[Vote]) -> UserStats {
    let owned_ids: HashSet<&str> = owned.iter().map(|r| r.id.as_str()).collect();

    let mut stats = UserStats {
        total_restaurants: saturating_count(owned.len()),
        total_votes_given: saturating_count(given.len()),
        ..UserStats::default()
    };
    for vote in all_votes
        .iter()
        .filter(|v| owned_ids.contains(v.restaurant_id.as_str()))
    {
        match vote.vote_type {
            VoteDirection::Up => {
                stats.up_votes_received = stats.up_votes_received.saturating_add(1)
            }
            VoteDirection::Down => {
                stats.down_votes_received = stats.down_votes_received.saturating_add(1)
            }
        }
    }
    stats.total_votes_received = stats
        .up_votes_received
        .saturating_add(stats.down_votes_received);
    stats.popularity_score =
        i64::from(stats.up_votes_received) - i64::from(stats.down_votes_received);
    stats
}

#[derive(Clone)]
pub struct ProfileService {
    restaurants: RestaurantStore,
    votes: VoteService,
}

impl ProfileService {
    pub fn new(restaurants: RestaurantStore, votes: VoteService) -> Self {
        Self { restaurants, votes }
    }

    /// Stats for the session's user; the three reads run concurrently
    pub async fn compute_stats(&self, session: &Session) -> Result<UserStats> {
        let (owned, all_votes, given) = tokio::try_join!(
            self.restaurants.load_mine(session),
            self.votes.load_all(session),
            self.votes.load_my_votes(session),
        )?;
        Ok(compute_from(&owned, &all_votes, &given))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CuisineType, PriceRange};
    use chrono::Utc;

    fn owned(id: &str) -> Restaurant {
        Restaurant {
            id: id.to_string(),
            name: id.to_string(),
            cuisine_type: CuisineType::Autre,
            price_range: PriceRange::Budget,
            address: "somewhere".to_string(),
            description: None,
            image_url: None,
            user_id: "me".to_string(),
            created_at: Utc::now(),
        }
    }

    fn vote(restaurant_id: &str, user_id: &str, direction: VoteDirection) -> Vote {
        Vote {
            id: format!("{}-{}", restaurant_id, user_id),
            restaurant_id: restaurant_id.to_string(),
            user_id: user_id.to_string(),
            vote_type: direction,
        }
    }

    #[test]
    fn nothing_yet_is_debutant() {
        let stats = compute_from(&[], &[], &[]);
        assert_eq!(stats, UserStats::default());
        assert_eq!(stats.badge(), BadgeTier::Debutant);
        assert_eq!(stats.badge().label(), "Débutant");
    }

    #[test]
    fn badge_ladder() {
        assert_eq!(BadgeTier::from_score(-3), BadgeTier::Debutant);
        assert_eq!(BadgeTier::from_score(1), BadgeTier::Decouvreur);
        assert_eq!(BadgeTier::from_score(5), BadgeTier::Foodie);
        assert_eq!(BadgeTier::from_score(12), BadgeTier::Gourmet);
        assert_eq!(BadgeTier::from_score(12).label(), "Gourmet");
        assert_eq!(BadgeTier::from_score(20), BadgeTier::ExpertCulinaire);
        assert_eq!(BadgeTier::ExpertCulinaire.color(), "yellow");
    }

    #[test]
    fn received_votes_only_count_owned_restaurants() {
        let mine = vec![owned("r1"), owned("r2")];
        let all = vec![
            vote("r1", "a", VoteDirection::Up),
            vote("r1", "me", VoteDirection::Up),
            vote("r2", "b", VoteDirection::Down),
            vote("other", "me", VoteDirection::Up),
        ];
        let given: Vec<Vote> = all.iter().filter(|v| v.user_id == "me").cloned().collect();

        let stats = compute_from(&mine, &all, &given);
        assert_eq!(stats.total_restaurants, 2);
        assert_eq!(stats.up_votes_received, 2);
        assert_eq!(stats.down_votes_received, 1);
        assert_eq!(stats.total_votes_received, 3);
        assert_eq!(stats.popularity_score, 1);
        assert_eq!(stats.total_votes_given, 2);
    }

    #[test]
    fn counts_saturate_instead_of_wrapping() {
        assert_eq!(saturating_count(7), 7);
        assert_eq!(saturating_count(u32::MAX as usize), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(saturating_count(u32::MAX as usize + 1), u32::MAX);
    }

    #[test]
    fn achievements_track_progress() {
        let stats = UserStats {
            total_restaurants: 1,
            total_votes_given: 2,
            ..UserStats::default()
        };
        let list = achievements(&stats);
        assert!(list[0].unlocked);
        assert!(!list[1].unlocked);
        assert!(!list[2].unlocked);
        assert_eq!(
            list[2].hint.as_deref(),
            Some("Votez pour 3 restaurants de plus")
        );

        let active = UserStats {
            total_votes_given: 7,
            ..UserStats::default()
        };
        assert!(achievements(&active)[2].unlocked);
        assert_eq!(achievements(&active)[2].hint, None);
    }
}
