// ── Policy matching ──
//
// Read-only projections over a policy snapshot. Every function here is
// total: missing policies, rules, groups or resources produce empty or
// false results, never errors. Only a policy's first rule is consulted.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{EntityId, Group, GroupRef, Peer, Policy, Protocol, Resource, ResourceRef, Rule};
use crate::ports;

/// Port queried by [`peer_ssh_reachable`].
pub const SSH_PORT: u16 = 22;

/// What a policy is matched against.
#[derive(Debug, Clone, Copy)]
pub enum PolicyTarget<'a> {
    /// Matches on the rule's destination resource id or the resource's groups.
    Resource(&'a Resource),
    /// Matches on group intersection only.
    Groups(&'a [Group]),
    /// Matches like a resource, using the peer's id and groups.
    Peer(&'a Peer),
}

impl PolicyTarget<'_> {
    fn id(&self) -> Option<&EntityId> {
        match self {
            Self::Resource(r) => Some(&r.id),
            Self::Peer(p) => Some(&p.id),
            Self::Groups(_) => None,
        }
    }

    fn groups(&self) -> &[Group] {
        match self {
            Self::Resource(r) => &r.groups,
            Self::Peer(p) => &p.groups,
            Self::Groups(groups) => groups,
        }
    }

    /// True if the target is on the destination side of `rule`.
    fn is_destination_of(&self, rule: &Rule) -> bool {
        side_matches(
            self.id(),
            self.groups(),
            rule.destination_resource.as_ref(),
            &rule.destinations,
        )
    }

    /// True if the target is on the source side of `rule`.
    fn is_source_of(&self, rule: &Rule) -> bool {
        side_matches(
            self.id(),
            self.groups(),
            rule.source_resource.as_ref(),
            &rule.sources,
        )
    }
}

/// Policies targeting something, enabled ones first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignedPolicies<'a> {
    pub policies: Vec<&'a Policy>,
    pub enabled_policies: Vec<&'a Policy>,
    pub count: usize,
}

impl AssignedPolicies<'_> {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// The rule every matching helper evaluates.
///
/// Policies may carry several rules, but only the first takes part in
/// matching. A policy without rules matches nothing.
pub fn first_rule(policy: &Policy) -> Option<&Rule> {
    policy.rules.first()
}

/// Policies whose first rule targets `target`.
///
/// Enabled policies precede disabled ones; input order is kept within each
/// partition.
pub fn assigned_policies<'a>(
    target: PolicyTarget<'_>,
    policies: &'a [Policy],
) -> AssignedPolicies<'a> {
    let (enabled, disabled): (Vec<&Policy>, Vec<&Policy>) = policies
        .iter()
        .filter(|policy| first_rule(policy).is_some_and(|rule| target.is_destination_of(rule)))
        .partition(|policy| policy.enabled);

    let enabled_policies = enabled.clone();
    let mut ordered = enabled;
    ordered.extend(disabled);

    AssignedPolicies {
        count: ordered.len(),
        policies: ordered,
        enabled_policies,
    }
}

/// Resources whose groups intersect the destinations of `policy`'s first
/// rule. Each resource id appears once, in input order.
pub fn destination_resources_of<'a>(
    policy: &Policy,
    resources: &'a [Resource],
) -> Vec<&'a Resource> {
    let Some(rule) = first_rule(policy) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    resources
        .iter()
        .filter(|resource| groups_intersect(&resource.groups, &rule.destinations))
        .filter(|resource| seen.insert(resource.id.clone()))
        .collect()
}

/// True if some enabled policy lets traffic reach `peer` on TCP `port`.
///
/// A policy counts when its first rule is not ICMP or UDP, the peer sits on
/// the rule's destination side (or source side for bidirectional rules),
/// and the rule's ports cover `port`. Protocol `all` skips the port test.
pub fn peer_has_reachable_port(peer: &Peer, policies: &[Policy], port: u16) -> bool {
    let target = PolicyTarget::Peer(peer);
    policies
        .iter()
        .filter(|policy| policy.enabled)
        .filter_map(first_rule)
        .any(|rule| rule_reaches(target, rule, port))
}

/// [`peer_has_reachable_port`] on the SSH port.
pub fn peer_ssh_reachable(peer: &Peer, policies: &[Policy]) -> bool {
    peer_has_reachable_port(peer, policies, SSH_PORT)
}

fn rule_reaches(target: PolicyTarget<'_>, rule: &Rule, port: u16) -> bool {
    if matches!(rule.protocol, Protocol::Icmp | Protocol::Udp) {
        return false;
    }

    let on_path =
        target.is_destination_of(rule) || (rule.bidirectional && target.is_source_of(rule));
    if !on_path {
        return false;
    }

    rule.protocol == Protocol::All || ports::covers_port(rule, port)
}

fn side_matches(
    id: Option<&EntityId>,
    groups: &[Group],
    resource: Option<&ResourceRef>,
    refs: &[GroupRef],
) -> bool {
    let resource_hit = match (id, resource) {
        (Some(id), Some(resource)) => &resource.id == id,
        _ => false,
    };
    resource_hit || groups_intersect(groups, refs)
}

/// True if any group id in `groups` appears among `refs`.
fn groups_intersect(groups: &[Group], refs: &[GroupRef]) -> bool {
    groups
        .iter()
        .filter_map(|g| g.id.as_ref())
        .any(|id| refs.iter().any(|r| r.id() == Some(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PortRange;

    fn g(id: &str) -> Group {
        Group::new(id, id.to_uppercase())
    }

    fn ssh_policy(protocol: Protocol) -> Policy {
        Policy::new(
            "pol1",
            true,
            Rule::new(protocol)
                .with_sources(["g0"])
                .with_destinations(["g1"])
                .with_ports(["22"]),
        )
    }

    #[test]
    fn tcp_ssh_rule_reaches_destination_member() {
        let peer = Peer::new("p1", "bastion").with_groups([g("g1")]);

        assert!(peer_has_reachable_port(&peer, &[ssh_policy(Protocol::Tcp)], 22));
        assert!(peer_ssh_reachable(&peer, &[ssh_policy(Protocol::Tcp)]));
        assert!(!peer_has_reachable_port(&peer, &[ssh_policy(Protocol::Udp)], 22));
        assert!(!peer_has_reachable_port(&peer, &[ssh_policy(Protocol::Icmp)], 22));
    }

    #[test]
    fn port_outside_rule_is_not_reachable() {
        let peer = Peer::new("p1", "bastion").with_groups([g("g1")]);
        assert!(!peer_has_reachable_port(&peer, &[ssh_policy(Protocol::Tcp)], 2222));
    }

    #[test]
    fn protocol_all_skips_port_test() {
        let peer = Peer::new("p1", "bastion").with_groups([g("g1")]);
        assert!(peer_has_reachable_port(&peer, &[ssh_policy(Protocol::All)], 2222));
    }

    #[test]
    fn unknown_protocol_still_checks_ports() {
        let peer = Peer::new("p1", "bastion").with_groups([g("g1")]);
        assert!(peer_ssh_reachable(&peer, &[ssh_policy(Protocol::Other)]));
        assert!(!peer_has_reachable_port(&peer, &[ssh_policy(Protocol::Other)], 80));
    }

    #[test]
    fn disabled_policy_never_counts() {
        let peer = Peer::new("p1", "bastion").with_groups([g("g1")]);
        let mut policy = ssh_policy(Protocol::All);
        policy.enabled = false;
        assert!(!peer_ssh_reachable(&peer, &[policy]));
    }

    #[test]
    fn destination_resource_matches_peer_id() {
        let peer = Peer::new("p7", "db");
        let mut rule = Rule::new(Protocol::Tcp).with_port_ranges([PortRange::new(20, 25)]);
        rule.destination_resource = Some(ResourceRef::new("p7", Some("peer")));
        let policy = Policy::new("pol1", true, rule);

        assert!(peer_ssh_reachable(&peer, &[policy]));
    }

    #[test]
    fn source_side_only_counts_when_bidirectional() {
        let peer = Peer::new("p1", "laptop").with_groups([g("g0")]);
        let one_way = ssh_policy(Protocol::Tcp);
        let mut both_ways = one_way.clone();
        both_ways.rules[0].bidirectional = true;

        assert!(!peer_ssh_reachable(&peer, &[one_way]));
        assert!(peer_ssh_reachable(&peer, std::slice::from_ref(&both_ways)));

        // Swapping the peer back to the destination side keeps the answer.
        let peer = Peer::new("p1", "laptop").with_groups([g("g1")]);
        assert!(peer_ssh_reachable(&peer, &[both_ways]));
    }

    #[test]
    fn bidirectional_source_resource_matches() {
        let peer = Peer::new("p3", "router");
        let mut rule = Rule::new(Protocol::All).bidirectional(true);
        rule.source_resource = Some(ResourceRef::new("p3", Some("peer")));
        assert!(peer_ssh_reachable(&peer, &[Policy::new("pol1", true, rule)]));
    }

    #[test]
    fn only_first_rule_is_evaluated() {
        let peer = Peer::new("p1", "bastion").with_groups([g("g1")]);
        let mut policy = ssh_policy(Protocol::Udp);
        policy.rules.push(
            Rule::new(Protocol::Tcp)
                .with_destinations(["g1"])
                .with_ports(["22"]),
        );
        assert!(!peer_ssh_reachable(&peer, &[policy]));

        let empty = Policy {
            rules: Vec::new(),
            ..ssh_policy(Protocol::All)
        };
        assert!(!peer_ssh_reachable(&peer, &[empty]));
    }

    #[test]
    fn resource_matches_by_group_and_drops_when_removed() {
        let policy = Policy::new("pol1", true, Rule::new(Protocol::Tcp).with_destinations(["g2"]));
        let policies = vec![policy];

        let mut resource = Resource::new("r1", "db").with_groups([g("g1"), g("g2")]);
        let assigned = assigned_policies(PolicyTarget::Resource(&resource), &policies);
        assert_eq!(assigned.count, 1);
        assert_eq!(assigned.policies[0].id.as_str(), "pol1");

        resource.groups.retain(|group| group.name != "G2");
        let assigned = assigned_policies(PolicyTarget::Resource(&resource), &policies);
        assert!(assigned.is_empty());
        assert!(assigned.enabled_policies.is_empty());
    }

    #[test]
    fn resource_matches_by_destination_resource_id() {
        let mut rule = Rule::new(Protocol::Tcp);
        rule.destination_resource = Some(ResourceRef::new("r1", Some("host")));
        let policies = vec![Policy::new("pol1", true, rule)];

        let resource = Resource::new("r1", "db");
        assert_eq!(
            assigned_policies(PolicyTarget::Resource(&resource), &policies).count,
            1
        );

        // A bare group set has no id to compare against.
        assert!(assigned_policies(PolicyTarget::Groups(&[]), &policies).is_empty());
    }

    #[test]
    fn enabled_policies_come_first_in_stable_order() {
        let rule = || Rule::new(Protocol::All).with_destinations(["g1"]);
        let policies = vec![
            Policy::new("a", false, rule()),
            Policy::new("b", true, rule()),
            Policy::new("c", false, rule()),
            Policy::new("d", true, rule()),
            Policy::new("e", true, Rule::new(Protocol::All).with_destinations(["g9"])),
        ];

        let groups = [g("g1")];
        let assigned = assigned_policies(PolicyTarget::Groups(&groups), &policies);
        let order: Vec<&str> = assigned.policies.iter().map(|p| p.id.as_str()).collect();
        let enabled: Vec<&str> = assigned.enabled_policies.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(order, vec!["b", "d", "a", "c"]);
        assert_eq!(enabled, vec!["b", "d"]);
        assert_eq!(assigned.count, 4);
    }

    #[test]
    fn embedded_group_refs_match_like_ids() {
        let policy = Policy::new(
            "pol1",
            true,
            Rule::new(Protocol::All).with_destinations([Group::new("g1", "Eng")]),
        );
        let groups = [g("g1")];
        assert_eq!(
            assigned_policies(PolicyTarget::Groups(&groups), std::slice::from_ref(&policy)).count,
            1
        );
    }

    #[test]
    fn destination_resources_follow_group_membership() {
        let policy = Policy::new("pol1", true, Rule::new(Protocol::Tcp).with_destinations(["g2"]));
        let resources = vec![
            Resource::new("r1", "db").with_groups([g("g2")]),
            Resource::new("r2", "web").with_groups([g("g1")]),
            Resource::new("r3", "cache").with_groups([g("g1"), g("g2")]),
            Resource::new("r1", "db").with_groups([g("g2")]),
        ];

        let ids: Vec<&str> = destination_resources_of(&policy, &resources)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["r1", "r3"]);
    }

    #[test]
    fn empty_inputs_yield_empty_results() {
        let peer = Peer::new("p1", "x");
        assert!(!peer_ssh_reachable(&peer, &[]));
        assert!(assigned_policies(PolicyTarget::Peer(&peer), &[]).is_empty());
        let policy = Policy {
            rules: Vec::new(),
            ..Policy::new("pol1", true, Rule::default())
        };
        assert!(destination_resources_of(&policy, &[]).is_empty());
    }
}
