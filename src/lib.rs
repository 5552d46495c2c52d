//! Entity Admin Client Library
//!
//! A configuration-driven back-office client: entity schemas drive generic
//! list, detail and form screens over a REST API, behind a bearer-token
//! session.

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod entities;
pub mod entity;
pub mod error;
pub mod fetch;
pub mod form;
pub mod images;
pub mod page;
pub mod query;
pub mod render;
pub mod routes;
pub mod schema;

use reqwest::Client;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::api::ApiClient;
use crate::auth::{AuthProvider, Credentials, MemoryTokenStore, TokenStore};
use crate::config::ClientOptions;
use crate::dashboard::Dashboard;
use crate::entities::EntityKind;
use crate::error::Error;
use crate::page::EntityPage;
use crate::query::QueryCache;
use crate::routes::{Navigator, Resolution, Route};

/// The main entry point of the admin client
#[derive(Debug, Clone)]
pub struct AdminClient {
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
    api: ApiClient,
    auth: AuthProvider,
    navigator: Navigator,
    cache: QueryCache,
}

impl AdminClient {
    /// Create a client for `api_url` with an in-memory session
    ///
    /// # Example
    ///
    /// ```
    /// use entity_admin::AdminClient;
    ///
    /// let admin = AdminClient::new("http://localhost:3000").unwrap();
    /// assert!(admin.auth().identity().is_none());
    /// ```
    pub fn new(api_url: &str) -> Result<Self, Error> {
        Self::new_with_options(ClientOptions::default().with_api_url(api_url))
    }

    /// Create a client with custom options and an in-memory session
    pub fn new_with_options(options: ClientOptions) -> Result<Self, Error> {
        Self::with_token_store(options, Arc::new(MemoryTokenStore::new()))
    }

    /// Create a client whose token is persisted in `store`
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use entity_admin::{AdminClient, auth::FileTokenStore, config::ClientOptions};
    ///
    /// let dir = std::env::temp_dir().join("entity-admin-doc");
    /// let store = Arc::new(FileTokenStore::new(dir.join("session.json")));
    /// let admin = AdminClient::with_token_store(ClientOptions::default(), store).unwrap();
    /// ```
    pub fn with_token_store(options: ClientOptions, store: Arc<dyn TokenStore>) -> Result<Self, Error> {
        Url::parse(&options.api_url)?;

        let http_client = Client::new();
        let credentials = Credentials::load(store, &options.token_key)?;
        let navigator = Navigator::default();
        let cache = QueryCache::new(options.read_retries);
        let api = ApiClient::new(
            http_client.clone(),
            options.clone(),
            credentials,
            navigator.clone(),
            cache.clone(),
        );
        let auth = AuthProvider::new(api.clone());

        debug!(api_url = %options.api_url, "admin client created");

        Ok(Self {
            http_client,
            options,
            api,
            auth,
            navigator,
            cache,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Get a reference to the session provider
    pub fn auth(&self) -> &AuthProvider {
        &self.auth
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// A page controller for one entity kind, sharing this client's session and cache
    pub fn page(&self, kind: EntityKind) -> EntityPage {
        EntityPage::new(kind.config(), self.api.clone(), self.auth.clone(), self.cache.clone())
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(self.api.clone(), self.auth.clone(), self.cache.clone())
    }

    /// Navigate to `route`, applying its guard
    pub fn open(&self, route: Route) -> Resolution {
        let identity = self.auth.identity();
        self.navigator.open(route, identity.as_ref(), self.auth.is_loading())
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::entities::EntityKind;
    pub use crate::error::Error;
    pub use crate::form::{EntityForm, SubmitOutcome};
    pub use crate::page::EntityPage;
    pub use crate::routes::{Resolution, Route};
    pub use crate::AdminClient;
}
