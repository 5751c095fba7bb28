//! Async client for the mesh VPN management REST API.
//!
//! Thin, typed wrappers around the CRUD endpoints the access-control engine
//! reads from (groups, peers, policies, posture checks, network resources)
//! and the two group write endpoints it issues. Domain logic lives in
//! `meshward-core`; this crate only moves JSON.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::Error;
pub use transport::TransportConfig;
