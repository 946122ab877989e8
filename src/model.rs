//! Records exchanged with the collection store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Culinary categories a restaurant can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CuisineType {
    #[serde(rename = "Française")]
    Francaise,
    #[serde(rename = "Italienne")]
    Italienne,
    #[serde(rename = "Japonaise")]
    Japonaise,
    #[serde(rename = "Chinoise")]
    Chinoise,
    #[serde(rename = "Indienne")]
    Indienne,
    #[serde(rename = "Mexicaine")]
    Mexicaine,
    #[serde(rename = "Thaïlandaise")]
    Thailandaise,
    #[serde(rename = "Méditerranéenne")]
    Mediterraneenne,
    #[serde(rename = "Américaine")]
    Americaine,
    #[serde(rename = "Libanaise")]
    Libanaise,
    #[serde(rename = "Vietnamienne")]
    Vietnamienne,
    #[serde(rename = "Grecque")]
    Grecque,
    #[serde(rename = "Espagnole")]
    Espagnole,
    #[serde(rename = "Marocaine")]
    Marocaine,
    #[serde(rename = "Coréenne")]
    Coreenne,
    #[serde(rename = "Autre")]
    Autre,
}

impl CuisineType {
    /// Every category, in the order the add form offers them
    pub const ALL: [CuisineType; 16] = [
        CuisineType::Francaise,
        CuisineType::Italienne,
        CuisineType::Japonaise,
        CuisineType::Chinoise,
        CuisineType::Indienne,
        CuisineType::Mexicaine,
        CuisineType::Thailandaise,
        CuisineType::Mediterraneenne,
        CuisineType::Americaine,
        CuisineType::Libanaise,
        CuisineType::Vietnamienne,
        CuisineType::Grecque,
        CuisineType::Espagnole,
        CuisineType::Marocaine,
        CuisineType::Coreenne,
        CuisineType::Autre,
    ];

    /// Display name, identical to the stored value
    pub fn as_str(&self) -> &'static str {
        match self {
            CuisineType::Francaise => "Française",
            CuisineType::Italienne => "Italienne",
            CuisineType::Japonaise => "Japonaise",
            CuisineType::Chinoise => "Chinoise",
            CuisineType::Indienne => "Indienne",
            CuisineType::Mexicaine => "Mexicaine",
            CuisineType::Thailandaise => "Thaïlandaise",
            CuisineType::Mediterraneenne => "Méditerranéenne",
            CuisineType::Americaine => "Américaine",
            CuisineType::Libanaise => "Libanaise",
            CuisineType::Vietnamienne => "Vietnamienne",
            CuisineType::Grecque => "Grecque",
            CuisineType::Espagnole => "Espagnole",
            CuisineType::Marocaine => "Marocaine",
            CuisineType::Coreenne => "Coréenne",
            CuisineType::Autre => "Autre",
        }
    }
}

impl fmt::Display for CuisineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price tiers, cheapest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceRange {
    #[serde(rename = "€")]
    Budget,
    #[serde(rename = "€€")]
    Moderate,
    #[serde(rename = "€€€")]
    Expensive,
    #[serde(rename = "€€€€")]
    VeryExpensive,
}

impl PriceRange {
    pub const ALL: [PriceRange; 4] = [
        PriceRange::Budget,
        PriceRange::Moderate,
        PriceRange::Expensive,
        PriceRange::VeryExpensive,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            PriceRange::Budget => "€",
            PriceRange::Moderate => "€€",
            PriceRange::Expensive => "€€€",
            PriceRange::VeryExpensive => "€€€€",
        }
    }

    /// Descriptive label shown next to the symbol in the add form
    pub fn label(&self) -> &'static str {
        match self {
            PriceRange::Budget => "€ - Économique (moins de 15€)",
            PriceRange::Moderate => "€€ - Modéré (15-30€)",
            PriceRange::Expensive => "€€€ - Cher (30-50€)",
            PriceRange::VeryExpensive => "€€€€ - Très cher (plus de 50€)",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A recommended restaurant as stored in the `restaurants` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub cuisine_type: CuisineType,
    pub price_range: PriceRange,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a restaurant; the store stamps `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRestaurant {
    pub id: String,
    pub name: String,
    pub cuisine_type: CuisineType,
    pub price_range: PriceRange,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub user_id: String,
}

/// Direction of a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }

    pub fn opposite(&self) -> VoteDirection {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user's vote on one restaurant, from the `restaurant_votes` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub restaurant_id: String,
    pub user_id: String,
    pub vote_type: VoteDirection,
}

/// An authenticated user, read-only from the application's side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name, falling back to the local part of the email
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Avatar fallback: first two characters of the email's local part, upper-cased
pub fn initials(email: &str) -> String {
    email
        .split('@')
        .next()
        .unwrap_or_default()
        .chars()
        .take(2)
        .collect::<String>()
        .to_uppercase()
}
