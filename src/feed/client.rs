//! Matches REST Client
//!
//! HTTP client for the matches endpoint.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::endpoint::Endpoints;
use super::types::Match;

/// Matches REST API client
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    endpoints: Endpoints,
}

impl FeedClient {
    /// Create a client for the given endpoints
    ///
    /// Without a timeout, requests wait as long as the transport allows.
    pub fn new(endpoints: Endpoints, request_timeout: Option<Duration>) -> Result<Self, FeedError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoints,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch the full list of matches
    pub async fn fetch_matches(&self) -> Result<Vec<Match>, FeedError> {
        let url = self.endpoints.matches_url().clone();
        self.get_json(url).await
    }

    /// Fetch one match by id
    ///
    /// Returns `Ok(None)` when the backend answers 404.
    pub async fn fetch_match(&self, id: i64) -> Result<Option<Match>, FeedError> {
        match self.get_json(self.endpoints.match_url(id)).await {
            Ok(m) => Ok(Some(m)),
            Err(FeedError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FeedError> {
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FeedError::status(status, message));
        }

        let body = response.text().await.map_err(classify)?;
        serde_json::from_str(&body).map_err(FeedError::Decode)
    }
}

fn classify(e: reqwest::Error) -> FeedError {
    if e.is_timeout() {
        FeedError::Timeout
    } else if e.is_connect() {
        FeedError::Unavailable
    } else {
        FeedError::Request(e)
    }
}

/// Errors that can occur when talking to the matches endpoint
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Matches endpoint unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FeedError {
    fn status(status: StatusCode, message: String) -> Self {
        FeedError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Whether the request never reached the endpoint
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FeedError::Unavailable | FeedError::Timeout | FeedError::Request(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FeedClient {
        let endpoints =
            Endpoints::new("http://localhost:8000", "/api/matches", "/ws/matches").unwrap();
        FeedClient::new(endpoints, None).unwrap()
    }

    #[test]
    fn test_client_keeps_endpoints() {
        let client = client();
        assert_eq!(
            client.endpoints().matches_url().as_str(),
            "http://localhost:8000/api/matches"
        );
    }

    #[test]
    fn test_error_display() {
        let err = FeedError::status(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string());
        assert_eq!(err.to_string(), "API error 500: boom");
        assert!(!err.is_transport());

        assert!(FeedError::Unavailable.is_transport());
        assert_eq!(FeedError::Timeout.to_string(), "Request timeout");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) is closed on test hosts
        let endpoints = Endpoints::new("http://127.0.0.1:9", "/api/matches", "/ws/matches").unwrap();
        let client = FeedClient::new(endpoints, Some(Duration::from_secs(2))).unwrap();

        let err = client.fetch_matches().await.unwrap_err();
        assert!(err.is_transport());
    }
}
