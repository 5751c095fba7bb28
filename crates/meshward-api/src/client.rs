// Hand-crafted async HTTP client for the management REST API.
//
// Base path: /api/
// Auth: `Authorization: Token <personal access token>`

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    /// The server sends numeric codes; older builds send strings.
    #[serde(default)]
    code: Option<serde_json::Value>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the management API.
///
/// Every call is a single request; retries, caching and pagination are the
/// caller's concern.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a personal access token and transport config.
    ///
    /// Injects `Authorization: Token …` as a default header on every request.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Token {}", token.expose_secret()))
            .map_err(|e| Error::Setup(format!("invalid token header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends in `/api/` so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ErrorResponse>(&raw).ok();

        let (message, code) = match parsed {
            Some(err) => (
                err.message.unwrap_or_else(|| status.to_string()),
                err.code.map(|c| match c {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                }),
            ),
            None if raw.is_empty() => (status.to_string(), None),
            None => (raw, None),
        };

        if matches!(
            status,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        ) {
            return Error::Authentication {
                status: status.as_u16(),
                message,
            };
        }

        Error::Api {
            status: status.as_u16(),
            message,
            code,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Groups ───────────────────────────────────────────────────────

    pub async fn list_groups(&self) -> Result<Vec<types::GroupResponse>, Error> {
        self.get("groups").await
    }

    pub async fn create_group(
        &self,
        body: &types::GroupRequest,
    ) -> Result<types::GroupResponse, Error> {
        self.post("groups", body).await
    }

    pub async fn update_group(
        &self,
        group_id: &str,
        body: &types::GroupRequest,
    ) -> Result<types::GroupResponse, Error> {
        self.put(&format!("groups/{group_id}"), body).await
    }

    // ── Peers ────────────────────────────────────────────────────────

    pub async fn list_peers(&self) -> Result<Vec<types::PeerResponse>, Error> {
        self.get("peers").await
    }

    // ── Policies ─────────────────────────────────────────────────────

    pub async fn list_policies(&self) -> Result<Vec<types::PolicyResponse>, Error> {
        self.get("policies").await
    }

    // ── Posture checks ───────────────────────────────────────────────

    pub async fn list_posture_checks(&self) -> Result<Vec<types::PostureCheckResponse>, Error> {
        self.get("posture-checks").await
    }

    // ── Networks ─────────────────────────────────────────────────────

    pub async fn list_networks(&self) -> Result<Vec<types::NetworkResponse>, Error> {
        self.get("networks").await
    }

    pub async fn list_network_resources(
        &self,
        network_id: &str,
    ) -> Result<Vec<types::NetworkResourceResponse>, Error> {
        self.get(&format!("networks/{network_id}/resources")).await
    }
}
