//! Restaurant recommendations shared between colleagues
//!
//! Colleagues sign in, recommend restaurants (with an optional photo), vote
//! them up or down, and earn a badge from the votes their recommendations
//! receive. Data lives in a Supabase project: auth, a PostgREST collection
//! store and object storage, each behind a trait with an in-memory
//! counterpart for tests and demos.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod notify;
pub mod postgrest;
pub mod profile;
pub mod restaurants;
pub mod shell;
pub mod storage;
pub mod submission;
pub mod votes;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::{AuthProvider, Session, SupabaseAuth};
use crate::config::{ClientOptions, RestoConfig};
use crate::error::Result;
use crate::model::{Restaurant, Vote};
use crate::postgrest::{Collection, CollectionStore, PostgrestStore};
use crate::profile::ProfileService;
use crate::restaurants::RestaurantStore;
use crate::shell::{App, Services, SessionGate};
use crate::storage::{ObjectStorage, SupabaseStorage};
use crate::submission::Submission;
use crate::votes::VoteService;

/// The main entry point: the three backend collaborators plus client options
#[derive(Clone)]
pub struct Resto {
    /// Client options
    pub options: ClientOptions,

    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn CollectionStore>,
    storage: Arc<dyn ObjectStorage>,
}

impl Resto {
    /// Connect to a Supabase project, restoring `stored` if it is still valid.
    ///
    /// The auth state leaves `loading` before this returns.
    ///
    /// ```no_run
    /// use resto_collegues::{config::RestoConfig, Resto};
    ///
    /// # async fn run() -> resto_collegues::error::Result<()> {
    /// let config = RestoConfig::new("https://your-project.supabase.co", "your-anon-key".to_string())?;
    /// let resto = Resto::connect(config, None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: RestoConfig, stored: Option<Session>) -> Result<Self> {
        let options = config.options.clone();
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let url = config.base_url();
        let key = config.anon_key.as_str();
        let info = options.client_info.as_str();
        let timeout = options.request_timeout;

        let auth = SupabaseAuth::new(&url, key, client.clone(), info, timeout);
        auth.initialize(stored).await;
        let store = PostgrestStore::new(&url, key, client.clone(), info, timeout);
        let storage =
            SupabaseStorage::new(&url, key, client, &options.image_bucket, info, timeout);

        Ok(Self::with_backends(
            options,
            Arc::new(auth),
            Arc::new(store),
            Arc::new(storage),
        ))
    }

    /// Assemble from arbitrary collaborators, e.g. the in-memory ones
    pub fn with_backends(
        options: ClientOptions,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn CollectionStore>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            options,
            auth,
            store,
            storage,
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthProvider> {
        Arc::clone(&self.auth)
    }

    fn restaurant_collection(&self) -> Collection<Restaurant> {
        Collection::new(Arc::clone(&self.store), &self.options.restaurants_table)
    }

    pub fn restaurants(&self) -> RestaurantStore {
        RestaurantStore::new(self.restaurant_collection())
    }

    pub fn votes(&self) -> VoteService {
        VoteService::new(Collection::<Vote>::new(
            Arc::clone(&self.store),
            &self.options.votes_table,
        ))
    }

    pub fn submission(&self) -> Submission {
        Submission::new(self.restaurant_collection(), Arc::clone(&self.storage))
    }

    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.restaurants(), self.votes())
    }

    /// Subscribe to the auth state
    pub fn gate(&self) -> SessionGate {
        SessionGate::new(self.auth())
    }

    /// The signed-in shell for a session
    pub fn app(&self, session: Session) -> App {
        let services = Services {
            auth: self.auth(),
            restaurants: self.restaurants(),
            votes: self.votes(),
            submission: self.submission(),
            profile: self.profile(),
        };
        App::new(session, services)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthProvider, Credentials, Session};
    pub use crate::config::{ClientOptions, RestoConfig};
    pub use crate::error::{Error, Result};
    pub use crate::model::{CuisineType, PriceRange, Restaurant, User, Vote, VoteDirection};
    pub use crate::shell::{App, GateView, Page};
    pub use crate::submission::{ImageFile, RestaurantForm};
    pub use crate::Resto;
}
