// ── Membership edit session ──
//
// Owns the editor state for one peer or resource: the groups it was in,
// the groups the user selected, and the ids the server assigned to drafts
// created during this session. A save fans out every planned write,
// waits for all of them, and folds the results into one report.

use std::collections::HashMap;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::diff::find_authoritative;
use super::{GroupDiff, GroupOperation, GroupWriter, Member};
use crate::error::CoreError;
use crate::model::{EntityId, Group};

/// Lifecycle of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// Editing; nothing issued yet.
    Idle,
    /// Writes in flight.
    Computing,
    /// Every write of the last save resolved.
    Success,
    /// At least one write of the last save failed; the rest stay applied.
    PartialFailure,
}

/// A write the server accepted, with the group it returned.
#[derive(Debug, Clone)]
pub struct AppliedOperation {
    pub operation: GroupOperation,
    pub group: Group,
}

/// A write the server rejected, with the cause.
#[derive(Debug)]
pub struct FailedOperation {
    pub operation: GroupOperation,
    pub error: CoreError,
}

impl FailedOperation {
    pub fn group_name(&self) -> &str {
        self.operation.group_name()
    }
}

/// Outcome of one save: what was applied and what was not.
///
/// Nothing is rolled back on failure.
#[derive(Debug)]
pub struct SaveReport {
    pub state: SessionState,
    pub applied: Vec<AppliedOperation>,
    pub failed: Vec<FailedOperation>,
}

impl SaveReport {
    pub fn is_success(&self) -> bool {
        self.state == SessionState::Success
    }

    pub fn failed_group_names(&self) -> Vec<&str> {
        self.failed.iter().map(FailedOperation::group_name).collect()
    }

    /// True when something failed and every failure was transient
    /// (timeout, refused connection, rate limit, gateway error).
    pub fn is_retryable(&self) -> bool {
        !self.failed.is_empty() && self.failed.iter().all(|f| f.error.is_transient())
    }
}

/// Editor state for one member's group memberships.
#[derive(Debug, Clone)]
pub struct MembershipSession {
    member: Member,
    initial: Vec<Group>,
    selected: Vec<Group>,
    /// Draft name -> id assigned by the server on create.
    created: HashMap<String, EntityId>,
    state: SessionState,
}

impl MembershipSession {
    /// Open a session on `member`, whose current groups are `initial`.
    /// The selection starts out equal to `initial`.
    pub fn new(member: Member, initial: Vec<Group>) -> Self {
        Self {
            member,
            selected: initial.clone(),
            initial,
            created: HashMap::new(),
            state: SessionState::Idle,
        }
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn initial(&self) -> &[Group] {
        &self.initial
    }

    pub fn selected(&self) -> &[Group] {
        &self.selected
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Replace the whole selection.
    pub fn set_selected(&mut self, groups: Vec<Group>) {
        self.selected = groups;
    }

    /// Add a group to the selection unless it is already selected.
    pub fn select(&mut self, group: Group) {
        let group = self.resolve(&group);
        if !self.selected.iter().any(|g| g.same_group(&group)) {
            self.selected.push(group);
        }
    }

    /// Drop every selected group with this name.
    pub fn deselect(&mut self, name: &str) {
        self.selected.retain(|g| g.name != name);
    }

    // ── Id backfill ──────────────────────────────────────────────────

    /// Id the server assigned to the draft called `name` in this session.
    pub fn resolve_group(&self, name: &str) -> Option<&EntityId> {
        self.created.get(name)
    }

    /// `group` with its id filled in if it is a draft created this session.
    pub fn resolve(&self, group: &Group) -> Group {
        let mut resolved = group.clone();
        if resolved.id.is_none() {
            resolved.id = self.created.get(&resolved.name).cloned();
        }
        resolved
    }

    fn backfill(&mut self, name: &str, id: &EntityId) {
        self.created.insert(name.to_owned(), id.clone());
        for group in self.selected.iter_mut().chain(self.initial.iter_mut()) {
            if group.id.is_none() && group.name == name {
                group.id = Some(id.clone());
            }
        }
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Plan the writes for the current selection without issuing them.
    pub fn plan(&self, authoritative: &[Group]) -> GroupDiff {
        let initial: Vec<Group> = self.initial.iter().map(|g| self.resolve(g)).collect();
        let selected: Vec<Group> = self.selected.iter().map(|g| self.resolve(g)).collect();
        GroupDiff::compute(&self.member, &initial, &selected, authoritative)
    }

    /// Issue every planned write concurrently and wait for all of them.
    ///
    /// `authoritative` should be the latest group list from the server; on
    /// retry after a partial failure it is what turns a re-attempted create
    /// into an update when the name now exists. Successful writes advance
    /// `initial`, so the next plan contains only what is still missing.
    pub async fn save<W: GroupWriter + Sync>(
        &mut self,
        writer: &W,
        authoritative: &[Group],
    ) -> SaveReport {
        self.adopt_upstream_memberships(authoritative);
        let operations = self.plan(authoritative).into_operations();
        self.state = SessionState::Computing;

        for op in &operations {
            debug!(group = op.group_name(), op = ?op, "issuing group write");
        }

        let results = join_all(operations.into_iter().map(|operation| async move {
            let result = operation.apply(writer).await;
            (operation, result)
        }))
        .await;

        let mut applied = Vec::new();
        let mut failed = Vec::new();
        for (operation, result) in results {
            match result {
                Ok(group) => {
                    self.record_applied(&operation, &group);
                    applied.push(AppliedOperation { operation, group });
                }
                Err(error) => {
                    warn!(group = operation.group_name(), error = %error, "group write failed");
                    failed.push(FailedOperation { operation, error });
                }
            }
        }

        self.state = if failed.is_empty() {
            SessionState::Success
        } else {
            SessionState::PartialFailure
        };
        info!(
            member = %self.member.id(),
            applied = applied.len(),
            failed = failed.len(),
            state = %self.state,
            "membership save finished"
        );

        SaveReport {
            state: self.state,
            applied,
            failed,
        }
    }

    /// Record in `initial` every selected group the server already lists
    /// the member in, so deselecting it later plans a removal.
    fn adopt_upstream_memberships(&mut self, authoritative: &[Group]) {
        let upstream: Vec<Group> = self
            .selected
            .iter()
            .map(|g| self.resolve(g))
            .filter_map(|g| find_authoritative(&g, authoritative))
            .filter(|current| self.member.is_in(current))
            .cloned()
            .collect();
        for group in upstream {
            self.replace_initial(group);
        }
    }

    fn record_applied(&mut self, operation: &GroupOperation, returned: &Group) {
        let name = operation.group_name();
        match operation {
            // A draft may also land as an update when its name already existed.
            GroupOperation::Create { .. } | GroupOperation::AddMember { .. } => {
                let draft_selected = self
                    .selected
                    .iter()
                    .any(|g| g.id.is_none() && g.name == name);
                if let (true, Some(id)) = (draft_selected, &returned.id) {
                    self.backfill(name, id);
                }
                self.mark_member_of(name, returned);
            }
            GroupOperation::RemoveMember { group_id, .. } => {
                self.initial.retain(|g| {
                    g.id.as_ref().map_or(g.name != name, |id| id != group_id)
                });
            }
        }
    }

    /// Put the server's copy of the group called `name` into `initial`.
    fn mark_member_of(&mut self, name: &str, returned: &Group) {
        let group = if returned.id.is_some() {
            returned.clone()
        } else {
            let Some(selected) = self.selected.iter().find(|g| g.name == name) else {
                return;
            };
            self.resolve(selected)
        };
        self.replace_initial(group);
    }

    fn replace_initial(&mut self, group: Group) {
        self.initial.retain(|g| !g.same_group(&group));
        self.initial.push(group);
    }
}
