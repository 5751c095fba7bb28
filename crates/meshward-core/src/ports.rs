//! Port-set evaluation for policy rules.
//!
//! A rule restricts ports through two fields: discrete `ports` (strings, as
//! the API sends them) and inclusive `port_ranges`. [`normalize`] folds both
//! into one display list ordered by starting port; [`covers_port`] answers
//! whether a concrete port is allowed.

use indexmap::IndexSet;

use crate::model::Rule;

/// Merge a rule's ports and port ranges into one ordered, de-duplicated list.
///
/// Entries sort ascending by their leading number (`"80-90"` sorts as 80).
/// On ties, exact ports come before ranges. Entries without a leading number
/// are kept verbatim and sort last. An empty result means "all ports".
pub fn normalize(rule: &Rule) -> Vec<String> {
    let entries: IndexSet<String> = rule
        .ports
        .iter()
        .flatten()
        .cloned()
        .chain(rule.port_ranges.iter().map(ToString::to_string))
        .collect();

    let mut entries: Vec<String> = entries.into_iter().collect();
    entries.sort_by_key(|entry| sort_key(entry));
    entries
}

/// True if the rule allows traffic to `port`.
///
/// A rule with `ports` unset and no port ranges places no restriction and
/// covers every port.
pub fn covers_port(rule: &Rule, port: u16) -> bool {
    if is_unrestricted(rule) {
        return true;
    }

    let wanted = port.to_string();
    let in_ports = rule
        .ports
        .iter()
        .flatten()
        .any(|p| p.trim() == wanted);

    in_ports || rule.port_ranges.iter().any(|range| range.contains(port))
}

/// True if the rule declares no port restriction at all.
pub fn is_unrestricted(rule: &Rule) -> bool {
    rule.ports.is_none() && rule.port_ranges.is_empty()
}

/// Numeric value preceding any `-` in an entry.
fn leading_port(entry: &str) -> Option<u32> {
    entry.split('-').next()?.trim().parse().ok()
}

/// Sort key: numbered entries first by value, unparseable entries after.
fn sort_key(entry: &str) -> (bool, u32) {
    leading_port(entry).map_or((true, 0), |n| (false, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PortRange, Protocol};

    fn rule() -> Rule {
        Rule::new(Protocol::Tcp)
    }

    #[test]
    fn ranges_and_ports_merge_by_start() {
        let r = rule()
            .with_ports(["8080"])
            .with_port_ranges([PortRange::new(20, 25)]);
        assert_eq!(normalize(&r), vec!["20-25", "8080"]);
    }

    #[test]
    fn single_value_range_renders_as_port() {
        let r = rule().with_port_ranges([PortRange::single(443)]);
        assert_eq!(normalize(&r), vec!["443"]);
    }

    #[test]
    fn duplicates_collapse() {
        let r = rule()
            .with_ports(["22", "443", "22"])
            .with_port_ranges([PortRange::single(443)]);
        assert_eq!(normalize(&r), vec!["22", "443"]);
    }

    #[test]
    fn exact_port_precedes_range_with_same_start() {
        let r = rule()
            .with_ports(["80"])
            .with_port_ranges([PortRange::new(80, 90), PortRange::new(53, 53)]);
        assert_eq!(normalize(&r), vec!["53", "80", "80-90"]);
    }

    #[test]
    fn output_is_non_decreasing_by_leading_number() {
        let r = rule()
            .with_ports(["9000", "22", "3389", "1"])
            .with_port_ranges([
                PortRange::new(5000, 5100),
                PortRange::new(10, 20),
                PortRange::new(65000, 65535),
            ]);

        let keys: Vec<u32> = normalize(&r)
            .iter()
            .filter_map(|e| leading_port(e))
            .collect();
        assert_eq!(keys.len(), 7);
        assert!(keys.windows(2).all(|w| w[0] <= w[1]), "{keys:?}");
    }

    #[test]
    fn malformed_entries_pass_through_last() {
        let r = rule()
            .with_ports(["http", "80"])
            .with_port_ranges([PortRange::new(30, 10)]);
        assert_eq!(normalize(&r), vec!["30-10", "80", "http"]);
    }

    #[test]
    fn unrestricted_rule_normalizes_empty_and_covers_everything() {
        let r = rule();
        assert!(normalize(&r).is_empty());
        for port in [0, 1, 22, 443, 8080, u16::MAX] {
            assert!(covers_port(&r, port));
        }
    }

    #[test]
    fn explicit_empty_port_list_is_a_restriction() {
        let r = rule().with_ports(Vec::<String>::new());
        assert!(!covers_port(&r, 22));
    }

    #[test]
    fn coverage_checks_ports_and_ranges() {
        let r = rule()
            .with_ports(["22"])
            .with_port_ranges([PortRange::new(8000, 8100)]);
        assert!(covers_port(&r, 22));
        assert!(covers_port(&r, 8000));
        assert!(covers_port(&r, 8100));
        assert!(!covers_port(&r, 23));
        assert!(!covers_port(&r, 8101));
    }

    #[test]
    fn ranges_alone_restrict() {
        let r = rule().with_port_ranges([PortRange::new(20, 25)]);
        assert!(covers_port(&r, 22));
        assert!(!covers_port(&r, 80));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::model::{PortRange, Protocol};
    use proptest::prelude::*;

    prop_compose! {
        fn arb_port_range()(start in any::<u16>(), end in any::<u16>()) -> PortRange {
            PortRange::new(start.min(end), start.max(end))
        }
    }

    prop_compose! {
        fn arb_restricted_rule()(
            ports in proptest::collection::vec(any::<u16>(), 0..6),
            ranges in proptest::collection::vec(arb_port_range(), 0..6),
        ) -> Rule {
            Rule::new(Protocol::Tcp)
                .with_ports(ports.iter().map(ToString::to_string))
                .with_port_ranges(ranges)
        }
    }

    proptest! {
        #[test]
        fn unrestricted_rule_covers_any_port(port in any::<u16>()) {
            prop_assert!(covers_port(&Rule::new(Protocol::Tcp), port));
            prop_assert!(covers_port(&Rule::new(Protocol::All), port));
        }

        #[test]
        fn normalized_entries_ascend_by_leading_port(rule in arb_restricted_rule()) {
            let entries = normalize(&rule);
            let keys: Vec<u32> = entries.iter().filter_map(|e| leading_port(e)).collect();
            prop_assert_eq!(keys.len(), entries.len());
            prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]), "{:?}", keys);
        }

        #[test]
        fn coverage_agrees_with_ports_and_ranges(
            rule in arb_restricted_rule(),
            port in any::<u16>(),
        ) {
            let expected = rule.ports.iter().flatten().any(|p| p == &port.to_string())
                || rule.port_ranges.iter().any(|r| r.start <= port && port <= r.end);
            prop_assert_eq!(covers_port(&rule, port), expected);
        }
    }
}
