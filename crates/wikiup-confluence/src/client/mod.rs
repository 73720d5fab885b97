//! Confluence REST API client.
//!
//! Synchronous client for the Confluence Server / Data Center REST API.
//! Construction never touches the network; every operation is a single
//! request. With `dry_run` set, mutating operations are logged and
//! skipped while read-only lookups still run.

mod attachments;
mod labels;
mod pages;

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use ureq::Agent;

/// Global request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sent with every request.
const USER_AGENT: &str = concat!("wikiup/", env!("CARGO_PKG_VERSION"));

/// Request authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Auth {
    /// HTTP basic authentication with username and password or API token.
    Basic { username: String, password: String },
    /// Bearer personal access token.
    Bearer { token: String },
}

impl Auth {
    /// Value for the `Authorization` header.
    fn header_value(&self) -> String {
        match self {
            Self::Basic { username, password } => {
                let credentials = BASE64_STANDARD.encode(format!("{username}:{password}"));
                format!("Basic {credentials}")
            }
            Self::Bearer { token } => format!("Bearer {token}"),
        }
    }
}

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the Confluence instance, without the `/rest/api` part.
    pub base_url: String,
    /// Request authentication.
    pub auth: Auth,
    /// Extra headers sent with every request.
    pub headers: Vec<(String, String)>,
    /// Log and skip mutating calls.
    pub dry_run: bool,
}

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth: Auth,
    headers: Vec<(String, String)>,
    dry_run: bool,
}

impl ConfluenceClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth: config.auth,
            headers: config.headers,
            dry_run: config.dry_run,
        }
    }

    /// Whether mutating calls are skipped.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Root of the REST API.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(base_url: &str) -> ConfluenceClient {
        ConfluenceClient::new(ClientConfig {
            base_url: base_url.to_owned(),
            auth: Auth::Bearer {
                token: "t".to_owned(),
            },
            headers: Vec::new(),
            dry_run: false,
        })
    }

    #[test]
    fn test_basic_auth_header() {
        let auth = Auth::Basic {
            username: "u".to_owned(),
            password: "p".to_owned(),
        };
        assert_eq!(auth.header_value(), "Basic dTpw");
    }

    #[test]
    fn test_bearer_auth_header() {
        let auth = Auth::Bearer {
            token: "secret-token".to_owned(),
        };
        assert_eq!(auth.header_value(), "Bearer secret-token");
    }

    #[test]
    fn test_api_url_is_under_the_base() {
        assert_eq!(
            client("https://wiki.example.com").api_url(),
            "https://wiki.example.com/rest/api"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        assert_eq!(
            client("https://wiki.example.com/").api_url(),
            "https://wiki.example.com/rest/api"
        );
    }
}
