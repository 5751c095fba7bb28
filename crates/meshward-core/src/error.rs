// ── Core error types ──
//
// User-facing errors from meshward-core. Consumers never see raw HTTP
// transport errors; the `From<meshward_api::Error>` impl translates them
// into domain-appropriate variants. Matching functions never produce these:
// only the write path and snapshot fetching can fail.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to management server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::ConnectionFailed { .. }
                | Self::Api {
                    status: Some(429 | 502..=504),
                    ..
                }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<meshward_api::Error> for CoreError {
    fn from(err: meshward_api::Error) -> Self {
        match err {
            meshward_api::Error::Authentication { message, .. } => {
                CoreError::AuthenticationFailed { message }
            }
            meshward_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            meshward_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            meshward_api::Error::Setup(message) => CoreError::Config { message },
            meshward_api::Error::Api {
                status: 404,
                message,
                ..
            } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: message,
            },
            meshward_api::Error::Api {
                status: 409,
                message,
                ..
            } => CoreError::Conflict { message },
            meshward_api::Error::Api {
                status,
                message,
                code,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            meshward_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_statuses_map_to_domain_variants() {
        let conflict: CoreError = meshward_api::Error::Api {
            status: 409,
            message: "group already exists".into(),
            code: None,
        }
        .into();
        assert!(matches!(conflict, CoreError::Conflict { .. }));

        let missing: CoreError = meshward_api::Error::Api {
            status: 404,
            message: "group g7 not found".into(),
            code: None,
        }
        .into();
        assert!(matches!(missing, CoreError::NotFound { .. }));

        let denied: CoreError = meshward_api::Error::Authentication {
            status: 403,
            message: "permission denied".into(),
        }
        .into();
        assert!(matches!(denied, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn gateway_errors_are_transient() {
        let err = CoreError::Api {
            message: "bad gateway".into(),
            code: None,
            status: Some(502),
        };
        assert!(err.is_transient());
        assert!(!CoreError::Internal("x".into()).is_transient());
    }
}
