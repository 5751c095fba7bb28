// ── Access policy domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::entity_id::EntityId;
use super::group::{GroupRef, ResourceRef};

/// Transport protocol a rule applies to.
///
/// Unknown protocol strings from newer servers land in `Other` rather than
/// failing the whole policy list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Protocol {
    #[default]
    All,
    Tcp,
    Udp,
    Icmp,
    #[serde(other)]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
    #[default]
    Accept,
    Drop,
}

/// Inclusive port range. `start <= end` is assumed, not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn single(port: u16) -> Self {
        Self::new(port, port)
    }

    pub fn contains(&self, port: u16) -> bool {
        self.start <= port && port <= self.end
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// The access specification inside a policy.
///
/// `ports: None` together with no port ranges means "all ports". An empty
/// `Some(vec![])` is a restriction that matches nothing on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub sources: Vec<GroupRef>,
    #[serde(default)]
    pub destinations: Vec<GroupRef>,
    #[serde(default)]
    pub source_resource: Option<ResourceRef>,
    #[serde(default)]
    pub destination_resource: Option<ResourceRef>,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub ports: Option<Vec<String>>,
    #[serde(default)]
    pub port_ranges: Vec<PortRange>,
    #[serde(default)]
    pub bidirectional: bool,
}

impl Rule {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            ..Self::default()
        }
    }

    pub fn with_sources<I, G>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupRef>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_destinations<I, G>(mut self, destinations: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupRef>,
    {
        self.destinations = destinations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ports<I, S>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ports = Some(ports.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_port_ranges(mut self, ranges: impl IntoIterator<Item = PortRange>) -> Self {
        self.port_ranges = ranges.into_iter().collect();
        self
    }

    pub fn bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }
}

/// Named, switchable container of access rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub enabled: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Posture checks gating the policy's sources. Carried, not evaluated.
    #[serde(default)]
    pub source_posture_checks: Vec<EntityId>,
}

impl Policy {
    pub fn new(id: impl Into<EntityId>, enabled: bool, rule: Rule) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: None,
            enabled,
            rules: vec![rule],
            source_posture_checks: Vec::new(),
        }
    }
}

/// Auxiliary eligibility condition attachable to policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureCheck {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Check definitions (version, OS, geolocation, …), opaque to the engine.
    #[serde(default)]
    pub checks: serde_json::Value,
}
