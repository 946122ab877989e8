//! Restaurant collection access and client-side filtering

use crate::auth::Session;
use crate::error::{Error, Result};
use crate::model::{CuisineType, NewRestaurant, PriceRange, Restaurant};
use crate::postgrest::{Collection, ListOptions};

/// Browse-page search box and dropdowns. Empty means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub search_term: String,
    pub cuisine: Option<CuisineType>,
    pub price: Option<PriceRange>,
}

impl SearchFilter {
    pub fn new(search_term: &str, cuisine: Option<CuisineType>, price: Option<PriceRange>) -> Self {
        Self {
            search_term: search_term.to_string(),
            cuisine,
            price,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.cuisine.is_none() && self.price.is_none()
    }

    /// Whether the "clear filters" action applies (dropdowns only)
    pub fn has_selection(&self) -> bool {
        self.cuisine.is_some() || self.price.is_some()
    }

    /// Reset both dropdowns, keeping the search term
    pub fn clear_selection(&mut self) {
        self.cuisine = None;
        self.price = None;
    }

    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        let term = self.search_term.to_lowercase();
        let matches_search = term.is_empty()
            || restaurant.name.to_lowercase().contains(&term)
            || restaurant
                .cuisine_type
                .as_str()
                .to_lowercase()
                .contains(&term)
            || restaurant.address.to_lowercase().contains(&term);
        let matches_cuisine = self.cuisine.map_or(true, |c| restaurant.cuisine_type == c);
        let matches_price = self.price.map_or(true, |p| restaurant.price_range == p);

        matches_search && matches_cuisine && matches_price
    }
}

/// Restaurants accepted by the filter, in their original order
pub fn filter(restaurants: &[Restaurant], search: &SearchFilter) -> Vec<Restaurant> {
    restaurants
        .iter()
        .filter(|r| search.matches(r))
        .cloned()
        .collect()
}

/// Cuisines present in the list, first-seen order
pub fn cuisine_options(restaurants: &[Restaurant]) -> Vec<CuisineType> {
    let mut seen = Vec::new();
    for restaurant in restaurants {
        if !seen.contains(&restaurant.cuisine_type) {
            seen.push(restaurant.cuisine_type);
        }
    }
    seen
}

/// Reads and writes the restaurant collection
#[derive(Clone)]
pub struct RestaurantStore {
    restaurants: Collection<Restaurant>,
}

impl RestaurantStore {
    pub fn new(restaurants: Collection<Restaurant>) -> Self {
        Self { restaurants }
    }

    /// All restaurants, newest first
    pub async fn load_all(&self, session: &Session) -> Result<Vec<Restaurant>> {
        self.restaurants
            .list(session, &ListOptions::new().order("created_at", false))
            .await
    }

    /// Restaurants recommended by one user, newest first
    pub async fn load_by_owner(&self, session: &Session, user_id: &str) -> Result<Vec<Restaurant>> {
        let options = ListOptions::new()
            .eq("user_id", user_id)
            .order("created_at", false);
        self.restaurants.list(session, &options).await
    }

    /// The session user's own restaurants
    pub async fn load_mine(&self, session: &Session) -> Result<Vec<Restaurant>> {
        self.load_by_owner(session, &session.user.id).await
    }

    pub async fn create(&self, session: &Session, restaurant: &NewRestaurant) -> Result<Restaurant> {
        self.restaurants.create(session, restaurant).await
    }

    /// Delete a restaurant owned by the session user.
    ///
    /// Someone else's restaurant is refused before any backend call.
    pub async fn delete_own(&self, session: &Session, restaurant: &Restaurant) -> Result<()> {
        if restaurant.user_id != session.user.id {
            return Err(Error::forbidden(format!(
                "restaurant {} belongs to another user",
                restaurant.id
            )));
        }
        self.restaurants.delete(session, &restaurant.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn restaurant(id: &str, name: &str, cuisine: CuisineType, price: PriceRange, address: &str) -> Restaurant {
        Restaurant {
            id: id.to_string(),
            name: name.to_string(),
            cuisine_type: cuisine,
            price_range: price,
            address: address.to_string(),
            description: None,
            image_url: None,
            user_id: "owner".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Restaurant> {
        vec![
            restaurant("a", "Da Mario", CuisineType::Italienne, PriceRange::Moderate, "3 rue Nationale, Lille"),
            restaurant("b", "Sakura", CuisineType::Japonaise, PriceRange::Expensive, "8 quai de Bercy, Paris"),
            restaurant("c", "Le Zinc", CuisineType::Francaise, PriceRange::Budget, "1 place d'Italie, Paris"),
        ]
    }

    #[test]
    fn search_matches_cuisine_case_insensitively() {
        let list = vec![sample()[0].clone(), sample()[1].clone()];
        let result = filter(&list, &SearchFilter::new("ital", None, None));
        let ids: Vec<_> = result.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn search_covers_name_and_address() {
        let list = sample();
        let by_name = filter(&list, &SearchFilter::new("SAKU", None, None));
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "b");

        // "ital" is in the Italienne cuisine of A and in the address of C
        let by_address = filter(&list, &SearchFilter::new("ital", None, None));
        let ids: Vec<_> = by_address.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn dropdowns_are_exact_and_combined_with_search() {
        let list = sample();
        let paris_budget = filter(&list, &SearchFilter::new("paris", None, Some(PriceRange::Budget)));
        assert_eq!(paris_budget.len(), 1);
        assert_eq!(paris_budget[0].id, "c");

        let none = filter(
            &list,
            &SearchFilter::new("sakura", Some(CuisineType::Italienne), None),
        );
        assert!(none.is_empty());
    }

    #[test]
    fn empty_filter_returns_input_unchanged() {
        let list = sample();
        let search = SearchFilter::default();
        assert!(search.is_empty());
        assert_eq!(filter(&list, &search), list);
    }

    #[test]
    fn filter_is_idempotent() {
        let list = sample();
        let searches = [
            SearchFilter::new("paris", None, None),
            SearchFilter::new("", Some(CuisineType::Japonaise), None),
            SearchFilter::new("a", None, Some(PriceRange::Moderate)),
            SearchFilter::new("zzz", None, None),
        ];
        for search in &searches {
            let once = filter(&list, search);
            let twice = filter(&once, search);
            assert_eq!(once, twice, "filter: {:?}", search);
        }
    }

    #[test]
    fn clear_selection_keeps_the_search_term() {
        let mut search = SearchFilter::new("bistrot", Some(CuisineType::Francaise), Some(PriceRange::Budget));
        assert!(search.has_selection());
        search.clear_selection();
        assert!(!search.has_selection());
        assert_eq!(search.search_term, "bistrot");
    }

    #[test]
    fn cuisine_options_are_distinct_in_first_seen_order() {
        let mut list = sample();
        list.push(restaurant("d", "Trattoria", CuisineType::Italienne, PriceRange::Budget, "x"));
        assert_eq!(
            cuisine_options(&list),
            vec![CuisineType::Italienne, CuisineType::Japonaise, CuisineType::Francaise]
        );
    }
}
