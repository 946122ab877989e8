//! Session gate and the page shell shown to a signed-in user

use std::sync::Arc;

use crate::auth::{AuthProvider, AuthState, AuthSubscription, Credentials, Session};
use crate::error::{Error, Result};
use crate::model::{Restaurant, VoteDirection};
use crate::notify::Notifications;
use crate::profile::{ProfileService, UserStats};
use crate::restaurants::{self, RestaurantStore, SearchFilter};
use crate::submission::{ImageFile, RestaurantForm, Submission};
use crate::votes::{self, MyVotes, VoteCount, VoteService, VoteState, VoteTally};

/// Text shown while the auth provider restores a session
pub const LOADING_TEXT: &str = "Chargement...";

/// Label of the login action on the prompt
pub const LOGIN_LABEL: &str = "Se connecter";

/// Label of the logout action in the header
pub const LOGOUT_LABEL: &str = "Se déconnecter";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Home,
    Add,
    MyRecommendations,
    Profile,
}

/// What the gate renders for a given auth state
#[derive(Debug, Clone, PartialEq)]
pub enum GateView {
    Loading,
    LoginPrompt,
    Shell(Session),
}

impl From<&AuthState> for GateView {
    fn from(state: &AuthState) -> Self {
        match (&state.session, state.is_loading) {
            (_, true) => GateView::Loading,
            (Some(session), false) => GateView::Shell(session.clone()),
            (None, false) => GateView::LoginPrompt,
        }
    }
}

impl GateView {
    /// Caption of the view's main element
    pub fn caption(&self) -> &'static str {
        match self {
            GateView::Loading => LOADING_TEXT,
            GateView::LoginPrompt => LOGIN_LABEL,
            GateView::Shell(_) => LOGOUT_LABEL,
        }
    }
}

/// Follows the auth provider's state. Dropping the gate unsubscribes.
pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    subscription: AuthSubscription,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        let subscription = auth.subscribe();
        Self { auth, subscription }
    }

    /// View for the latest state
    pub fn view(&self) -> GateView {
        GateView::from(&self.subscription.current())
    }

    /// Wait for the next state and return its view; `None` once the provider is gone
    pub async fn next_view(&mut self) -> Option<GateView> {
        let state = self.subscription.changed().await?;
        Some(GateView::from(&state))
    }

    /// Forward a login; the new session arrives as a state change
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.auth.login(credentials).await.map(|_| ())
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await
    }
}

/// Home page data: every restaurant, the user's votes, the filter inputs
#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    pub restaurants: Vec<Restaurant>,
    pub my_votes: MyVotes,
    pub search: SearchFilter,
    pub loading: bool,
}

impl BrowseState {
    pub fn visible(&self) -> Vec<Restaurant> {
        restaurants::filter(&self.restaurants, &self.search)
    }
}

/// "My recommendations" page data
#[derive(Debug, Clone, Default)]
pub struct MineState {
    pub restaurants: Vec<Restaurant>,
    pub tally: VoteTally,
    pub loading: bool,
}

impl MineState {
    pub fn count_for(&self, restaurant_id: &str) -> VoteCount {
        votes::count_for(&self.tally, restaurant_id)
    }
}

/// The services a shell routes page actions to
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthProvider>,
    pub restaurants: RestaurantStore,
    pub votes: VoteService,
    pub submission: Submission,
    pub profile: ProfileService,
}

/// Signed-in application: current page, page state and pending notifications.
///
/// Backend failures never escape a handler; they are logged and queued as a
/// notification.
pub struct App {
    session: Session,
    services: Services,
    page: Page,
    pub notifications: Notifications,
    pub browse: BrowseState,
    pub form: RestaurantForm,
    pub image: Option<ImageFile>,
    pub mine: MineState,
    pub stats: UserStats,
}

impl App {
    pub fn new(session: Session, services: Services) -> Self {
        Self {
            session,
            services,
            page: Page::default(),
            notifications: Notifications::new(),
            browse: BrowseState::default(),
            form: RestaurantForm::default(),
            image: None,
            mine: MineState::default(),
            stats: UserStats::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Switch page and load what it shows
    pub async fn navigate(&mut self, page: Page) {
        log::debug!("navigate {:?} -> {:?}", self.page, page);
        self.page = page;
        match page {
            Page::Home => self.load_home().await,
            Page::MyRecommendations => self.load_mine().await,
            Page::Profile => self.load_profile().await,
            Page::Add => {}
        }
    }

    pub async fn load_home(&mut self) {
        self.browse.loading = true;
        match self.services.restaurants.load_all(&self.session).await {
            Ok(list) => self.browse.restaurants = list,
            Err(e) => {
                log::error!("Error loading restaurants: {}", e);
                self.notifications
                    .failure("Impossible de charger les restaurants");
            }
        }
        self.browse.loading = false;

        match self.services.votes.load_my_votes(&self.session).await {
            Ok(list) => self.browse.my_votes = MyVotes::new(list),
            Err(e) => log::error!("Error loading votes: {}", e),
        }
    }

    /// Restaurants on the home page after filtering
    pub fn visible_restaurants(&self) -> Vec<Restaurant> {
        self.browse.visible()
    }

    pub fn vote_state(&self, restaurant_id: &str) -> VoteState {
        self.browse.my_votes.state_for(restaurant_id)
    }

    pub async fn vote(&mut self, restaurant_id: &str, direction: VoteDirection) {
        let result = self
            .services
            .votes
            .cast(&self.session, &mut self.browse.my_votes, restaurant_id, direction)
            .await;
        match result {
            Ok(_) => {
                let kind = match direction {
                    VoteDirection::Up => "vote positif",
                    VoteDirection::Down => "vote négatif",
                };
                self.notifications.success(
                    "Vote enregistré",
                    &format!("Votre {} a été pris en compte", kind),
                );
            }
            Err(e) => {
                log::error!("Error voting: {}", e);
                self.notifications
                    .failure("Impossible d'enregistrer votre vote");
            }
        }
    }

    /// Submit the add form. On success the form is reset and the shell goes home.
    pub async fn submit(&mut self) -> Option<Restaurant> {
        let result = self
            .services
            .submission
            .submit(&self.session, &self.form, self.image.as_ref())
            .await;
        match result {
            Ok(restaurant) => {
                self.notifications.success(
                    "Restaurant ajouté !",
                    "Votre recommandation a été ajoutée avec succès",
                );
                self.form.reset();
                self.image = None;
                self.navigate(Page::Home).await;
                Some(restaurant)
            }
            Err(Error::Validation(e)) => {
                log::debug!("form refused: {}", e);
                self.notifications
                    .failure("Veuillez remplir tous les champs obligatoires");
                None
            }
            Err(e) => {
                log::error!("Error adding restaurant: {}", e);
                self.notifications
                    .failure("Impossible d'ajouter le restaurant");
                None
            }
        }
    }

    pub async fn load_mine(&mut self) {
        self.mine.loading = true;
        match self.services.restaurants.load_mine(&self.session).await {
            Ok(list) => self.mine.restaurants = list,
            Err(e) => {
                log::error!("Error loading my restaurants: {}", e);
                self.notifications
                    .failure("Impossible de charger vos recommandations");
            }
        }
        self.mine.loading = false;

        match self.services.votes.tally_all(&self.session).await {
            Ok(tally) => self.mine.tally = tally,
            Err(e) => log::error!("Error loading vote counts: {}", e),
        }
    }

    /// Delete one of the user's own restaurants from the "my recommendations" page
    pub async fn delete(&mut self, restaurant_id: &str) {
        let target = match self
            .mine
            .restaurants
            .iter()
            .find(|r| r.id == restaurant_id)
        {
            Some(restaurant) => restaurant.clone(),
            None => {
                log::warn!("restaurant {} is not among the user's own", restaurant_id);
                self.notifications
                    .failure("Impossible de supprimer le restaurant");
                return;
            }
        };

        match self
            .services
            .restaurants
            .delete_own(&self.session, &target)
            .await
        {
            Ok(()) => {
                self.mine.restaurants.retain(|r| r.id != restaurant_id);
                self.notifications.success(
                    "Restaurant supprimé",
                    "Votre recommandation a été supprimée",
                );
            }
            Err(e) => {
                log::error!("Error deleting restaurant: {}", e);
                self.notifications
                    .failure("Impossible de supprimer le restaurant");
            }
        }
    }

    /// Failures leave the stats at zero
    pub async fn load_profile(&mut self) {
        self.stats = match self.services.profile.compute_stats(&self.session).await {
            Ok(stats) => stats,
            Err(e) => {
                log::error!("Error loading user data: {}", e);
                UserStats::default()
            }
        };
    }

    /// Sign out; the gate sees the new state and shows the login prompt
    pub async fn logout(&mut self) {
        if let Err(e) = self.services.auth.logout().await {
            log::error!("Error signing out: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use chrono::Utc;

    fn session() -> Session {
        Session::new(
            "token".to_string(),
            "refresh".to_string(),
            3600,
            User {
                id: "u1".to_string(),
                email: "u1@example.com".to_string(),
                display_name: None,
                created_at: Utc::now(),
            },
        )
    }

    #[test]
    fn gate_view_for_each_state() {
        assert_eq!(GateView::from(&AuthState::loading()), GateView::Loading);
        assert_eq!(
            GateView::from(&AuthState::settled(None)),
            GateView::LoginPrompt
        );
        let s = session();
        assert_eq!(
            GateView::from(&AuthState::settled(Some(s.clone()))),
            GateView::Shell(s)
        );
        assert_eq!(GateView::Loading.caption(), "Chargement...");
        assert_eq!(GateView::LoginPrompt.caption(), "Se connecter");
    }

    #[test]
    fn home_is_the_first_page() {
        assert_eq!(Page::default(), Page::Home);
    }
}
