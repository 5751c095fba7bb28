//! Shared helpers for command handlers.

use meshward_core::{EntityId, Group, GroupRef, Peer, Policy, Resource, Snapshot};

use crate::error::CliError;

/// Resolve a peer identifier (ID or name) via snapshot lookup.
pub fn resolve_peer<'a>(snapshot: &'a Snapshot, identifier: &str) -> Result<&'a Peer, CliError> {
    snapshot.find_peer(identifier).ok_or_else(|| CliError::NotFound {
        resource_type: "peer".into(),
        identifier: identifier.into(),
        list_command: "peers list".into(),
    })
}

/// Resolve a resource identifier (ID or name) within a network.
pub fn resolve_resource<'a>(
    snapshot: &'a Snapshot,
    network: &str,
    identifier: &str,
) -> Result<&'a Resource, CliError> {
    snapshot
        .find_resource(&EntityId::from(network), identifier)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "resource".into(),
            identifier: format!("{network}/{identifier}"),
            list_command: "resources list".into(),
        })
}

/// Resolve a policy identifier (ID or name).
pub fn resolve_policy<'a>(
    snapshot: &'a Snapshot,
    identifier: &str,
) -> Result<&'a Policy, CliError> {
    snapshot.find_policy(identifier).ok_or_else(|| CliError::NotFound {
        resource_type: "policy".into(),
        identifier: identifier.into(),
        list_command: "policies list".into(),
    })
}

/// Display names for group references, falling back to the raw id.
pub fn group_ref_names(refs: &[GroupRef], groups: &[Group]) -> Vec<String> {
    refs.iter()
        .map(|r| {
            meshward_core::model::resolve_group_name(r, groups).map_or_else(
                || r.id().map(ToString::to_string).unwrap_or_default(),
                str::to_owned,
            )
        })
        .collect()
}

pub fn group_names(groups: &[Group]) -> Vec<&str> {
    groups.iter().map(|g| g.name.as_str()).collect()
}
