//! Feed Endpoints
//!
//! Resolves the polling and push URLs from a single base address.
//! Paths are host-rooted, so any path on the base address is replaced.

use thiserror::Error;
use url::Url;

use crate::config::FeedConfig;

/// Resolved URLs for one feed origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
    matches: Url,
    push: Url,
}

impl Endpoints {
    /// Resolve endpoints from a base address and the two paths
    pub fn new(base_url: &str, matches_path: &str, push_path: &str) -> Result<Self, EndpointError> {
        let base = Url::parse(base_url)?;
        let scheme = push_scheme(base.scheme())
            .ok_or_else(|| EndpointError::UnsupportedScheme(base.scheme().to_string()))?;

        if base.host_str().is_none() {
            return Err(EndpointError::MissingHost(base_url.to_string()));
        }

        let matches = base.join(matches_path)?;

        let mut push = base.join(push_path)?;
        push.set_scheme(scheme)
            .map_err(|_| EndpointError::UnsupportedScheme(scheme.to_string()))?;

        Ok(Self { base, matches, push })
    }

    /// Resolve endpoints from feed configuration
    pub fn from_config(config: &FeedConfig) -> Result<Self, EndpointError> {
        Self::new(&config.base_url, &config.matches_path, &config.push_path)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Collection endpoint (`GET` returns every match)
    pub fn matches_url(&self) -> &Url {
        &self.matches
    }

    /// Single-match endpoint below the collection
    pub fn match_url(&self, id: i64) -> Url {
        let mut url = self.matches.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }

    /// Push channel endpoint, `ws` or `wss` mirroring the base address
    pub fn push_url(&self) -> &Url {
        &self.push
    }

    /// Whether the push channel runs over TLS
    pub fn is_secure(&self) -> bool {
        self.push.scheme() == "wss"
    }
}

/// Push scheme matching the transport security of an HTTP scheme
pub fn push_scheme(http_scheme: &str) -> Option<&'static str> {
    match http_scheme {
        "https" => Some("wss"),
        "http" => Some("ws"),
        _ => None,
    }
}

/// Errors resolving feed endpoints
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported scheme: {0} (expected http or https)")]
    UnsupportedScheme(String),

    #[error("Base address has no host: {0}")]
    MissingHost(String),
}
