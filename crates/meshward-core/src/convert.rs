// ── API-to-domain type conversions ──
//
// Bridges raw `meshward_api::types` into the `model` types. Each `From`
// impl resolves wire-level unions into the model's reference enums and
// parses protocol/action strings. Unknown strings never fail a conversion.

use meshward_api::types;

use crate::membership::GroupRequest;
use crate::model::{
    Action, EntityId, Group, GroupRef, Network, Peer, PeerRef, Policy, PortRange, PostureCheck,
    Protocol, Resource, ResourceRef, Rule,
};

// ── References ─────────────────────────────────────────────────────

impl From<types::GroupMinimum> for Group {
    fn from(g: types::GroupMinimum) -> Self {
        Self {
            id: g.id.map(EntityId::from),
            name: g.name,
            peers: Vec::new(),
            resources: Vec::new(),
        }
    }
}

impl From<types::GroupRefWire> for GroupRef {
    fn from(r: types::GroupRefWire) -> Self {
        match r {
            types::GroupRefWire::Id(id) => Self::Id(id.into()),
            types::GroupRefWire::Object(g) => Self::Embedded(g.into()),
        }
    }
}

impl From<types::PeerRefWire> for PeerRef {
    fn from(r: types::PeerRefWire) -> Self {
        match r {
            types::PeerRefWire::Id(id) => Self::Id(id.into()),
            types::PeerRefWire::Object(p) => {
                Self::Embedded(Peer::new(p.id, p.name.unwrap_or_default()))
            }
        }
    }
}

impl From<types::ResourceRefWire> for ResourceRef {
    fn from(r: types::ResourceRefWire) -> Self {
        Self {
            id: r.id.into(),
            kind: r.kind,
        }
    }
}

impl From<&ResourceRef> for types::ResourceRefWire {
    fn from(r: &ResourceRef) -> Self {
        Self {
            id: r.id.to_string(),
            kind: r.kind.clone(),
        }
    }
}

// ── Groups ─────────────────────────────────────────────────────────

impl From<types::GroupResponse> for Group {
    fn from(g: types::GroupResponse) -> Self {
        Self {
            id: Some(g.id.into()),
            name: g.name,
            peers: g.peers.into_iter().map(PeerRef::from).collect(),
            resources: g.resources.into_iter().map(ResourceRef::from).collect(),
        }
    }
}

impl From<&GroupRequest> for types::GroupRequest {
    fn from(r: &GroupRequest) -> Self {
        Self {
            name: r.name.clone(),
            peers: r.peers.iter().map(ToString::to_string).collect(),
            resources: r.resources.iter().map(types::ResourceRefWire::from).collect(),
        }
    }
}

// ── Peers ──────────────────────────────────────────────────────────

impl From<types::PeerResponse> for Peer {
    fn from(p: types::PeerResponse) -> Self {
        Self {
            id: p.id.into(),
            name: p.name,
            ip: p.ip,
            connected: p.connected,
            ssh_enabled: p.ssh_enabled,
            groups: p.groups.into_iter().map(Group::from).collect(),
        }
    }
}

// ── Policies ───────────────────────────────────────────────────────

/// Missing protocol means "all"; unrecognized values become `Other`.
fn parse_protocol(raw: Option<&str>) -> Protocol {
    raw.map_or(Protocol::All, |s| s.parse().unwrap_or(Protocol::Other))
}

fn parse_action(raw: Option<&str>) -> Action {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

impl From<types::PolicyRuleResponse> for Rule {
    fn from(r: types::PolicyRuleResponse) -> Self {
        Self {
            id: r.id.map(EntityId::from),
            name: r.name,
            description: r.description,
            action: parse_action(r.action.as_deref()),
            sources: r
                .sources
                .unwrap_or_default()
                .into_iter()
                .map(GroupRef::from)
                .collect(),
            destinations: r
                .destinations
                .unwrap_or_default()
                .into_iter()
                .map(GroupRef::from)
                .collect(),
            source_resource: r.source_resource.map(ResourceRef::from),
            destination_resource: r.destination_resource.map(ResourceRef::from),
            protocol: parse_protocol(r.protocol.as_deref()),
            ports: r.ports,
            port_ranges: r
                .port_ranges
                .unwrap_or_default()
                .into_iter()
                .map(|range| PortRange::new(range.start, range.end))
                .collect(),
            bidirectional: r.bidirectional,
        }
    }
}

impl From<types::PolicyResponse> for Policy {
    fn from(p: types::PolicyResponse) -> Self {
        Self {
            id: p.id.into(),
            name: p.name,
            description: p.description,
            enabled: p.enabled,
            rules: p.rules.into_iter().map(Rule::from).collect(),
            source_posture_checks: p
                .source_posture_checks
                .into_iter()
                .map(EntityId::from)
                .collect(),
        }
    }
}

impl From<types::PostureCheckResponse> for PostureCheck {
    fn from(c: types::PostureCheckResponse) -> Self {
        Self {
            id: c.id.into(),
            name: c.name,
            description: c.description,
            checks: c.checks,
        }
    }
}

// ── Networks ───────────────────────────────────────────────────────

impl From<types::NetworkResponse> for Network {
    fn from(n: types::NetworkResponse) -> Self {
        Self {
            id: n.id.into(),
            name: n.name,
            description: n.description,
            resource_ids: n.resources.into_iter().map(EntityId::from).collect(),
            policy_ids: n.policies.into_iter().map(EntityId::from).collect(),
        }
    }
}

/// The resource endpoint does not echo the owning network; the caller
/// supplies it.
pub fn resource_from_wire(r: types::NetworkResourceResponse, network_id: &EntityId) -> Resource {
    Resource {
        id: r.id.into(),
        name: r.name,
        network_id: Some(network_id.clone()),
        kind: r.kind,
        address: r.address,
        enabled: r.enabled,
        groups: r.groups.into_iter().map(Group::from).collect(),
    }
}
