// Wire types for the management API.
//
// Field names follow the server's JSON exactly. Reference fields that the
// server returns either as a bare id or as an embedded object are modeled
// as untagged enums; `meshward-core` resolves them to ids.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── References ──────────────────────────────────────────────────────

/// Minimal group object embedded in peers, rules and resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMinimum {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub peers_count: Option<u32>,
    #[serde(default)]
    pub resources_count: Option<u32>,
}

/// A group reference: bare id string or embedded group object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupRefWire {
    Id(String),
    Object(GroupMinimum),
}

/// Minimal peer object embedded in a group's member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMinimum {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A peer reference: bare id string or embedded peer object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeerRefWire {
    Id(String),
    Object(PeerMinimum),
}

/// Reference to a network resource or peer (`{id, type}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRefWire {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ── Groups ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub peers: Vec<PeerRefWire>,
    #[serde(default)]
    pub resources: Vec<ResourceRefWire>,
    #[serde(default)]
    pub issued: Option<String>,
}

/// Body for `POST /groups` and `PUT /groups/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRequest {
    pub name: String,
    pub peers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceRefWire>,
}

// ── Peers ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PeerResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub dns_label: Option<String>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub ssh_enabled: bool,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupMinimum>,
}

// ── Policies ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortRangeWire {
    pub start: u16,
    pub end: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRuleResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub ports: Option<Vec<String>>,
    #[serde(default)]
    pub port_ranges: Option<Vec<PortRangeWire>>,
    #[serde(default)]
    pub sources: Option<Vec<GroupRefWire>>,
    #[serde(default)]
    pub destinations: Option<Vec<GroupRefWire>>,
    #[serde(rename = "sourceResource", default)]
    pub source_resource: Option<ResourceRefWire>,
    #[serde(rename = "destinationResource", default)]
    pub destination_resource: Option<ResourceRefWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub source_posture_checks: Vec<String>,
    #[serde(default)]
    pub rules: Vec<PolicyRuleResponse>,
}

fn default_true() -> bool {
    true
}

// ── Posture checks ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct PostureCheckResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Check definitions are opaque to this client.
    #[serde(default)]
    pub checks: Value,
}

// ── Networks ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub policies: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkResourceResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub groups: Vec<GroupMinimum>,
}
