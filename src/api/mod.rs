//! Gateway to the back-office REST API
//!
//! Every call goes through [`ApiClient`], which attaches the bearer token,
//! decodes the response envelope and turns a 401 into a logout.

mod types;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};
use crate::query::QueryCache;
use crate::routes::Navigator;

pub use types::*;

/// Client for the back-office API
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client used for requests
    client: Client,

    /// Client options
    options: ClientOptions,

    /// The stored bearer token
    credentials: Credentials,

    /// Navigation state, used to leave for the login screen on a 401
    navigator: Navigator,

    /// Lists read under the current session
    cache: QueryCache,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        client: Client,
        options: ClientOptions,
        credentials: Credentials,
        navigator: Navigator,
        cache: QueryCache,
    ) -> Self {
        Self {
            client,
            options,
            credentials,
            navigator,
            cache,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// `GET path`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ServerResponse<T>, Error> {
        let url = self.options.endpoint(path);
        self.send(Fetch::get(&self.client, &url), path).await
    }

    /// `POST path` with an optional JSON body
    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> Result<ServerResponse<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.options.endpoint(path);
        let mut request = Fetch::post(&self.client, &url);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request, path).await
    }

    /// `PATCH path` with an optional JSON body
    pub async fn patch<T, B>(&self, path: &str, body: Option<&B>) -> Result<ServerResponse<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.options.endpoint(path);
        let mut request = Fetch::patch(&self.client, &url);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request, path).await
    }

    /// `DELETE path` with an optional JSON body
    pub async fn delete<T, B>(&self, path: &str, body: Option<&B>) -> Result<ServerResponse<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.options.endpoint(path);
        let mut request = Fetch::delete(&self.client, &url);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request, path).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: FetchBuilder<'_>,
        path: &str,
    ) -> Result<ServerResponse<T>, Error> {
        let method = request.method().clone();
        let token = self.credentials.token();

        let response = request
            .bearer(token.as_deref())
            .timeout(self.options.request_timeout)
            .send()
            .await?;

        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "api response");

        if status == StatusCode::UNAUTHORIZED {
            warn!(%method, path, "unauthorized, clearing stored token");
            self.credentials.clear()?;
            self.cache.clear().await;
            self.navigator.redirect_to_login(None);
            return Err(Error::Unauthorized);
        }

        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ServerResponse<serde_json::Value>>(&text)
                .ok()
                .and_then(|envelope| envelope.first_message().map(str::to_string))
                .or_else(|| (!text.trim().is_empty()).then(|| text.clone()))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(ServerResponse::empty(status.as_u16()));
        }

        let mut envelope: ServerResponse<T> = serde_json::from_str(&text)?;
        if envelope.status == 0 {
            envelope.status = status.as_u16();
        }
        Ok(envelope)
    }
}
