// ── Peers, networks and network resources ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::group::Group;

/// A mesh endpoint (device).
///
/// Read-only from the engine's perspective; its `groups` change only as a
/// side effect of group writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub ssh_enabled: bool,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Peer {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ip: None,
            connected: false,
            ssh_enabled: false,
            groups: Vec::new(),
        }
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = Group>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }
}

/// A network: container for resources reachable through routing peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub resource_ids: Vec<EntityId>,
    pub policy_ids: Vec<EntityId>,
}

/// A network resource (host, subnet or domain) exposed through a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub network_id: Option<EntityId>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub groups: Vec<Group>,
}

fn default_enabled() -> bool {
    true
}

impl Resource {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            network_id: None,
            kind: None,
            address: None,
            enabled: true,
            groups: Vec::new(),
        }
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = Group>) -> Self {
        self.groups = groups.into_iter().collect();
        self
    }
}
