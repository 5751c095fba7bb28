//! Access-control resolution engine between `meshward-api` and its consumers.
//!
//! This crate owns the parts of the management surface that carry real
//! invariants:
//!
//! - **Domain model** ([`model`]): `Group`, `Peer`, `Resource`, `Policy`,
//!   `Rule`, `PostureCheck`, with [`GroupRef`] / [`PeerRef`] unifying the
//!   "bare id or embedded object" references the API returns.
//!
//! - **Port-set evaluator** ([`ports`]): normalizes a rule's ports and port
//!   ranges into one ordered, de-duplicated list and answers
//!   [`covers_port`](ports::covers_port).
//!
//! - **Group membership differ** ([`membership`]): turns an edit session
//!   (initial vs. selected groups for one peer or resource) into the minimal
//!   set of create/update calls, runs them concurrently, and backfills ids of
//!   newly created groups. Partial failures are reported per group.
//!
//! - **Policy matcher** ([`matcher`]): read-only projections: which policies
//!   target a resource or group set, which resources a policy reaches, and
//!   whether a peer is reachable on a given TCP port.
//!
//! - **[`Backend`]**: fetches snapshots through the API client and
//!   implements [`GroupWriter`] for the differ's write path.

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod matcher;
pub mod membership;
pub mod model;
pub mod ports;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{Backend, Snapshot};
pub use config::ClientConfig;
pub use error::CoreError;
pub use matcher::{AssignedPolicies, PolicyTarget};
pub use membership::{
    GroupDiff, GroupOperation, GroupRequest, GroupWriter, Member, MembershipSession, SaveReport,
    SessionState,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Action, EntityId, Group, GroupRef, Network, Peer, PeerRef, Policy, PortRange, PostureCheck,
    Protocol, Resource, ResourceRef, Rule, SYSTEM_GROUP_NAME, is_system_group,
};
