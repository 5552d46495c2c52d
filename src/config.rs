//! Configuration options for the admin client

use std::time::Duration;

use crate::error::Error;

/// Default API location when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Key under which the bearer token is persisted
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Configuration options for the admin client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The base URL of the back-office API
    pub api_url: String,

    /// The key the bearer token is stored under
    pub token_key: String,

    /// The request timeout; `None` keeps the HTTP client default
    pub request_timeout: Option<Duration>,

    /// How many times a failed read is retried
    pub read_retries: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            request_timeout: None,
            read_retries: 1,
        }
    }
}

impl ClientOptions {
    /// Build options from `ADMIN_API_URL`, `ADMIN_TOKEN_KEY` and
    /// `ADMIN_REQUEST_TIMEOUT_SECS`, falling back to the defaults.
    pub fn from_env() -> Result<Self, Error> {
        let mut options = Self::default();

        if let Ok(url) = std::env::var("ADMIN_API_URL") {
            options = options.with_api_url(&url);
        }
        if let Ok(key) = std::env::var("ADMIN_TOKEN_KEY") {
            if key.trim().is_empty() {
                return Err(Error::config("ADMIN_TOKEN_KEY cannot be empty"));
            }
            options = options.with_token_key(&key);
        }
        if let Ok(secs) = std::env::var("ADMIN_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::config(format!("invalid ADMIN_REQUEST_TIMEOUT_SECS: {}", secs)))?;
            options = options.with_request_timeout(Some(Duration::from_secs(secs)));
        }

        Ok(options)
    }

    /// Set the API base URL; a trailing slash is dropped
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set the token storage key
    pub fn with_token_key(mut self, value: &str) -> Self {
        self.token_key = value.to_string();
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the number of read retries
    pub fn with_read_retries(mut self, value: u32) -> Self {
        self.read_retries = value;
        self
    }

    /// Build the URL for an API path such as `/users` or `users/1`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_back_office() {
        let options = ClientOptions::default();
        assert_eq!(options.api_url, "http://localhost:3000");
        assert_eq!(options.token_key, "token");
        assert_eq!(options.read_retries, 1);
        assert!(options.request_timeout.is_none());
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let options = ClientOptions::default().with_api_url("http://api.test/");
        assert_eq!(options.endpoint("/users"), "http://api.test/users");
        assert_eq!(options.endpoint("child-users/7"), "http://api.test/child-users/7");
    }
}
