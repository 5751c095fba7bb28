// ── Group membership reconciliation ──
//
// An edit session compares the groups a peer (or resource) was in when the
// editor opened against the groups the user selected, and turns the
// difference into create/update calls. The "All" group never takes part.

mod diff;
mod session;

use std::future::Future;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{EntityId, Group, ResourceRef};

pub use diff::GroupDiff;
pub use session::{AppliedOperation, FailedOperation, MembershipSession, SaveReport, SessionState};

// ── Member ──────────────────────────────────────────────────────────

/// The entity whose group memberships are being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Member {
    Peer(EntityId),
    Resource(ResourceRef),
}

impl Member {
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Peer(id) => id,
            Self::Resource(r) => &r.id,
        }
    }

    /// True if `group` lists this member.
    pub fn is_in(&self, group: &Group) -> bool {
        match self {
            Self::Peer(id) => group.has_peer(id),
            Self::Resource(r) => group.has_resource(&r.id),
        }
    }
}

// ── GroupRequest ────────────────────────────────────────────────────

/// Write payload for a group: full name and member lists, ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRequest {
    pub name: String,
    pub peers: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceRef>,
}

impl GroupRequest {
    /// Payload that keeps every current member of `group` and adds `member`.
    pub fn with_member(group: &Group, member: &Member) -> Self {
        let mut peers = group.peer_ids();
        let mut resources: IndexSet<ResourceRef> = group.resources.iter().cloned().collect();
        match member {
            Member::Peer(id) => {
                peers.insert(id.clone());
            }
            Member::Resource(r) => {
                if !group.has_resource(&r.id) {
                    resources.insert(r.clone());
                }
            }
        }
        Self {
            name: group.name.clone(),
            peers: peers.into_iter().collect(),
            resources: resources.into_iter().collect(),
        }
    }

    /// Payload that drops exactly `member` and leaves everyone else.
    pub fn without_member(group: &Group, member: &Member) -> Self {
        let mut peers = group.peer_ids();
        let mut resources: Vec<ResourceRef> = group.resources.clone();
        match member {
            Member::Peer(id) => {
                peers.shift_remove(id);
            }
            Member::Resource(r) => resources.retain(|existing| existing.id != r.id),
        }
        Self {
            name: group.name.clone(),
            peers: peers.into_iter().collect(),
            resources,
        }
    }
}

// ── GroupOperation ──────────────────────────────────────────────────

/// A single backend write produced by the differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GroupOperation {
    /// Persist a draft group with the member as its first member.
    Create { request: GroupRequest },
    /// Add the member to an existing group.
    AddMember {
        group_id: EntityId,
        request: GroupRequest,
    },
    /// Remove the member from an existing group.
    RemoveMember {
        group_id: EntityId,
        request: GroupRequest,
    },
}

impl GroupOperation {
    pub fn group_name(&self) -> &str {
        &self.request().name
    }

    pub fn group_id(&self) -> Option<&EntityId> {
        match self {
            Self::Create { .. } => None,
            Self::AddMember { group_id, .. } | Self::RemoveMember { group_id, .. } => {
                Some(group_id)
            }
        }
    }

    pub fn request(&self) -> &GroupRequest {
        match self {
            Self::Create { request }
            | Self::AddMember { request, .. }
            | Self::RemoveMember { request, .. } => request,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, Self::RemoveMember { .. })
    }

    /// Issue this operation through `writer`.
    pub async fn apply<W: GroupWriter + Sync>(&self, writer: &W) -> Result<Group, CoreError> {
        match self {
            Self::Create { request } => writer.create_group(request).await,
            Self::AddMember { group_id, request } | Self::RemoveMember { group_id, request } => {
                writer.update_group(group_id, request).await
            }
        }
    }
}

// ── GroupWriter ─────────────────────────────────────────────────────

/// Backend seam for group writes. The engine never deletes groups.
pub trait GroupWriter {
    /// `POST /groups`; returns the persisted group including its new id.
    fn create_group(
        &self,
        request: &GroupRequest,
    ) -> impl Future<Output = Result<Group, CoreError>> + Send;

    /// `PUT /groups/{id}` with the full member list.
    fn update_group(
        &self,
        id: &EntityId,
        request: &GroupRequest,
    ) -> impl Future<Output = Result<Group, CoreError>> + Send;
}
