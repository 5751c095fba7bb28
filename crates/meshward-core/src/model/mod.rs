// ── Unified domain model ──
//
// Canonical, immutable snapshots of the entities the engine reasons about.
// All of them are created and destroyed by the management server; the
// engine only reads them and, for groups, emits write requests.

pub mod entity_id;
pub mod group;
pub mod peer;
pub mod policy;

// ── Re-exports ──────────────────────────────────────────────────────

pub use entity_id::EntityId;
pub use group::{
    Group, GroupRef, PeerRef, ResourceRef, SYSTEM_GROUP_NAME, is_system_group, resolve_group_id,
    resolve_group_name,
};
pub use peer::{Network, Peer, Resource};
pub use policy::{Action, PortRange, Policy, PostureCheck, Protocol, Rule};
