// ── Groups and entity references ──
//
// The API returns references to groups and peers either as bare id strings
// or as embedded objects, depending on endpoint and server version. Both
// collapse to an id through a single resolver before any comparison.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::peer::Peer;

/// Name of the implicit group containing every peer.
pub const SYSTEM_GROUP_NAME: &str = "All";

/// Named collection of peers and network resources.
///
/// A group without an `id` is a draft: created client-side and not yet
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default)]
    pub peers: Vec<PeerRef>,
    #[serde(default)]
    pub resources: Vec<ResourceRef>,
}

impl Group {
    /// A persisted group with no members.
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            peers: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// A client-side group awaiting a server-assigned id.
    pub fn draft(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            peers: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn with_peers<I, P>(mut self, peers: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PeerRef>,
    {
        self.peers = peers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resources(mut self, resources: impl IntoIterator<Item = ResourceRef>) -> Self {
        self.resources = resources.into_iter().collect();
        self
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_system(&self) -> bool {
        is_system_group(self)
    }

    /// Member peer ids in first-seen order, duplicates dropped.
    pub fn peer_ids(&self) -> IndexSet<EntityId> {
        self.peers.iter().map(|p| p.id().clone()).collect()
    }

    pub fn has_peer(&self, peer_id: &EntityId) -> bool {
        self.peers.iter().any(|p| p.id() == peer_id)
    }

    pub fn has_resource(&self, resource_id: &EntityId) -> bool {
        self.resources.iter().any(|r| &r.id == resource_id)
    }

    /// Group identity: ids when both sides have one, names otherwise.
    pub fn same_group(&self, other: &Group) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name == other.name,
        }
    }
}

/// True iff `group` is the implicit "All" group.
pub fn is_system_group(group: &Group) -> bool {
    group.name == SYSTEM_GROUP_NAME
}

// ── GroupRef ────────────────────────────────────────────────────────

/// Reference to a group: bare identifier or embedded group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Id(EntityId),
    Embedded(Group),
}

impl GroupRef {
    /// The referenced group's id; `None` for an embedded draft.
    pub fn id(&self) -> Option<&EntityId> {
        match self {
            Self::Id(id) => Some(id),
            Self::Embedded(group) => group.id.as_ref(),
        }
    }
}

impl From<EntityId> for GroupRef {
    fn from(id: EntityId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for GroupRef {
    fn from(id: &str) -> Self {
        Self::Id(id.into())
    }
}

impl From<Group> for GroupRef {
    fn from(group: Group) -> Self {
        Self::Embedded(group)
    }
}

/// Resolve a group reference to its identifier.
pub fn resolve_group_id(group: &GroupRef) -> Option<&EntityId> {
    group.id()
}

/// Resolve a group reference to its display name.
///
/// Embedded references carry their own name; bare ids are looked up in
/// `groups`. Unknown ids resolve to `None`.
pub fn resolve_group_name<'a>(group: &'a GroupRef, groups: &'a [Group]) -> Option<&'a str> {
    match group {
        GroupRef::Embedded(g) => Some(g.name.as_str()),
        GroupRef::Id(id) => groups
            .iter()
            .find(|g| g.id.as_ref() == Some(id))
            .map(|g| g.name.as_str()),
    }
}

// ── PeerRef ─────────────────────────────────────────────────────────

/// Reference to a peer: bare identifier or embedded peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeerRef {
    Id(EntityId),
    Embedded(Peer),
}

impl PeerRef {
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Id(id) => id,
            Self::Embedded(peer) => &peer.id,
        }
    }
}

impl From<EntityId> for PeerRef {
    fn from(id: EntityId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for PeerRef {
    fn from(id: &str) -> Self {
        Self::Id(id.into())
    }
}

impl From<Peer> for PeerRef {
    fn from(peer: Peer) -> Self {
        Self::Embedded(peer)
    }
}

// ── ResourceRef ─────────────────────────────────────────────────────

/// Reference to a network resource (or a peer acting as one) in rules and
/// group resource lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: EntityId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ResourceRef {
    pub fn new(id: impl Into<EntityId>, kind: Option<&str>) -> Self {
        Self {
            id: id.into(),
            kind: kind.map(str::to_owned),
        }
    }
}
