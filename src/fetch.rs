//! HTTP request helper used by the API gateway

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response,
};
use serde::Serialize;
use std::time::Duration;
use tracing::trace;
use url::Url;

use crate::error::Error;

/// One pending request against the API
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    timeout: Option<Duration>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    pub fn new(client: &'a Client, method: Method, url: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            timeout: None,
            body: None,
        }
    }

    /// Set a header; values that are not valid header text are skipped
    pub fn header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Send `Authorization: Bearer <token>` when a token is held
    pub fn bearer(self, token: Option<&str>) -> Self {
        match token {
            Some(token) => self.header(AUTHORIZATION, &format!("Bearer {}", token)),
            None => self,
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    fn build(self) -> Result<RequestBuilder, Error> {
        let url = Url::parse(&self.url)?;
        let mut request = self.client.request(self.method, url).headers(self.headers);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = self.body {
            request = request.body(body);
        }
        Ok(request)
    }

    /// Send the request; HTTP error statuses are returned as responses
    pub async fn send(self) -> Result<Response, Error> {
        trace!(method = %self.method, url = %self.url, "sending request");
        Ok(self.build()?.send().await?)
    }
}

/// Entry points for the verbs the API uses
pub struct Fetch;

impl Fetch {
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, Method::GET, url)
    }

    pub fn post<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, Method::POST, url)
    }

    pub fn patch<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, Method::PATCH, url)
    }

    pub fn delete<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, Method::DELETE, url)
    }
}
