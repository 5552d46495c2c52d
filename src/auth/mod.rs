//! Login session and identity
//!
//! [`AuthProvider`] owns the session lifecycle: [`AuthProvider::init`] restores
//! a stored token on start, [`AuthProvider::login`] and
//! [`AuthProvider::logout`] create and destroy it. Everything else reads the
//! current [`Identity`] from the provider.

mod session;
mod types;

use std::sync::{Arc, RwLock};

use regex::Regex;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::Error;

pub use session::*;
pub use types::*;

/// Minimum password length accepted by the login form
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug)]
struct AuthState {
    user: Option<UserProfile>,
    loading: bool,
}

/// Session provider shared by the pages of the back-office
#[derive(Debug, Clone)]
pub struct AuthProvider {
    api: ApiClient,
    state: Arc<RwLock<AuthState>>,
}

impl AuthProvider {
    /// Create a provider in the loading state; call [`init`](Self::init) next
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AuthState {
                user: None,
                loading: true,
            })),
        }
    }

    /// Restore the session from the stored token.
    ///
    /// Expired or undecodable tokens are discarded. A valid token triggers a
    /// profile fetch; if that fails the token is discarded as well.
    pub async fn init(&self) -> Result<Option<Identity>, Error> {
        let credentials = self.api.credentials();

        let identity = match credentials.token() {
            None => None,
            Some(token) => match decode_token(&token) {
                Ok(identity) if !identity.is_expired() => Some(identity),
                Ok(_) => {
                    info!("stored token expired");
                    credentials.clear()?;
                    None
                }
                Err(e) => {
                    warn!(error = %e, "stored token unreadable");
                    credentials.clear()?;
                    None
                }
            },
        };

        let identity = match identity {
            Some(identity) => match self.fetch_user(&identity.id).await {
                Ok(user) => {
                    self.set_user(Some(user));
                    Some(identity)
                }
                Err(e) => {
                    warn!(error = %e, "failed to restore session");
                    credentials.clear()?;
                    self.set_user(None);
                    None
                }
            },
            None => None,
        };

        self.set_loading(false);
        Ok(identity)
    }

    async fn fetch_user(&self, id: &str) -> Result<UserProfile, Error> {
        self.api
            .get::<UserProfile>(&format!("/users/{}", id))
            .await?
            .into_data()
            .ok_or_else(|| Error::auth("No user data received"))
    }

    /// Claims of the current token; `None` once logged out or expired
    pub fn identity(&self) -> Option<Identity> {
        self.api
            .credentials()
            .identity()
            .filter(|identity| !identity.is_expired())
    }

    /// Profile of the logged-in user
    pub fn user(&self) -> Option<UserProfile> {
        if self.api.credentials().token().is_none() {
            return None;
        }
        self.state.read().ok().and_then(|state| state.user.clone())
    }

    /// Whether the session is still being restored
    pub fn is_loading(&self) -> bool {
        self.state.read().map(|state| state.loading).unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.identity().map(|identity| identity.is_admin).unwrap_or(false)
    }

    /// Log in with email and password.
    ///
    /// The credentials are checked locally first; nothing is sent when they
    /// are malformed. On success the token is stored and the navigator leaves
    /// the login screen.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, Error> {
        validate_login(email, password)?;

        let body = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let result = self
            .api
            .post::<UserProfile, _>("/users/login", Some(&body))
            .await;

        let credentials = self.api.credentials();
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                credentials.clear()?;
                self.set_user(None);
                return Err(e);
            }
        };

        let Some(jwt) = response.jwt else {
            credentials.clear()?;
            self.set_user(None);
            return Err(Error::auth("No token received"));
        };

        let identity = decode_token(&jwt)?;
        credentials.set_token(&jwt)?;
        self.api.cache().clear().await;
        self.set_user(response.data);
        info!(user = %identity.id, admin = identity.is_admin, "logged in");

        self.api.navigator().complete_login();
        Ok(identity)
    }

    /// Drop the session, forget every cached list and return to the login screen
    pub async fn logout(&self) -> Result<(), Error> {
        self.api.credentials().clear()?;
        self.api.cache().clear().await;
        self.set_user(None);
        self.api.navigator().redirect_to_login(None);
        info!("logged out");
        Ok(())
    }

    fn set_user(&self, user: Option<UserProfile>) {
        if let Ok(mut state) = self.state.write() {
            state.user = user;
        }
    }

    fn set_loading(&self, loading: bool) {
        if let Ok(mut state) = self.state.write() {
            state.loading = loading;
        }
    }
}

/// Check login credentials the way the login form does
pub fn validate_login(email: &str, password: &str) -> Result<(), Error> {
    if !is_valid_email(email) {
        return Err(Error::validation("email", "Invalid email address"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

/// Loose email format check shared with the form builder
pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(value)
}
