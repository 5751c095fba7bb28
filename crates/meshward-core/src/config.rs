// ── Runtime connection configuration ──
//
// Describes *how* to reach the management API. Carries the token and
// connection tuning, but never touches disk: the CLI constructs a
// `ClientConfig` (usually via `meshward-config`) and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Configuration for talking to one management server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Management API URL (e.g., `https://api.example.com`).
    pub url: Url,
    /// Personal access token.
    pub token: SecretString,
    /// Request timeout.
    pub timeout: Duration,
    /// Skip TLS verification (self-hosted servers with self-signed certs).
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            token,
            timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }

    pub fn transport(&self) -> meshward_api::TransportConfig {
        meshward_api::TransportConfig {
            timeout: self.timeout,
            danger_accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}
