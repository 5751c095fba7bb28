// ── Membership diff ──
//
// Pure planning step: no I/O. Given what the member was in, what the user
// selected, and the latest authoritative group list, produce the writes
// that make the backend match the selection.

use tracing::debug;

use super::{GroupOperation, GroupRequest, Member};
use crate::model::Group;

/// Ordered list of writes for one save: additions (in selection order)
/// followed by removals (in initial order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDiff {
    operations: Vec<GroupOperation>,
}

impl GroupDiff {
    /// Plan the writes that move `member` from `initial` to `selected`.
    ///
    /// A selected group is added to unless its latest known copy already
    /// lists the member; an unselected group from `initial` is removed from
    /// only if it does. `authoritative` is the server's current group list
    /// and may be empty. When it knows a group (by id, or by name for
    /// drafts) it is the latest copy and the base of the update payload.
    /// A draft whose name already exists there becomes an update of the
    /// existing group, never a second create.
    pub fn compute(
        member: &Member,
        initial: &[Group],
        selected: &[Group],
        authoritative: &[Group],
    ) -> Self {
        let initial: Vec<&Group> = initial.iter().filter(|g| !g.is_system()).collect();
        let selected: Vec<&Group> = selected.iter().filter(|g| !g.is_system()).collect();

        // A group is settled when its latest known copy (server, else the
        // one the member started from) already has the member in it.
        let holds_member = |group: &Group| {
            find_authoritative(group, authoritative)
                .or_else(|| initial.iter().copied().find(|g| g.same_group(group)))
                .is_some_and(|current| member.is_in(current))
        };

        let mut to_add: Vec<&Group> = Vec::new();
        for group in &selected {
            let duplicate = to_add.iter().any(|g| g.same_group(group));
            if !duplicate && !holds_member(*group) {
                to_add.push(group);
            }
        }

        let mut to_remove: Vec<&Group> = Vec::new();
        for group in &initial {
            let still_selected = selected.iter().any(|g| g.same_group(group));
            let duplicate = to_remove.iter().any(|g| g.same_group(group));
            if !still_selected && !duplicate && holds_member(*group) {
                to_remove.push(group);
            }
        }

        let mut operations = Vec::with_capacity(to_add.len() + to_remove.len());
        operations.extend(
            to_add
                .into_iter()
                .filter_map(|g| plan_add(member, g, authoritative)),
        );
        operations.extend(
            to_remove
                .into_iter()
                .filter_map(|g| plan_remove(member, g, authoritative)),
        );

        debug!(
            member = %member.id(),
            operations = operations.len(),
            "membership diff computed"
        );
        Self { operations }
    }

    pub fn operations(&self) -> &[GroupOperation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<GroupOperation> {
        self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

/// The server's copy of `group`: by id, else by (unique) name.
pub(super) fn find_authoritative<'a>(
    group: &Group,
    authoritative: &'a [Group],
) -> Option<&'a Group> {
    match &group.id {
        Some(id) => authoritative.iter().find(|g| g.id.as_ref() == Some(id)),
        None => authoritative
            .iter()
            .find(|g| g.id.is_some() && g.name == group.name),
    }
}

fn plan_add(member: &Member, group: &Group, authoritative: &[Group]) -> Option<GroupOperation> {
    if let Some(current) = find_authoritative(group, authoritative) {
        if member.is_in(current) {
            return None;
        }
        let group_id = current.id.clone()?;
        return Some(GroupOperation::AddMember {
            group_id,
            request: GroupRequest::with_member(current, member),
        });
    }

    match &group.id {
        Some(group_id) => Some(GroupOperation::AddMember {
            group_id: group_id.clone(),
            request: GroupRequest::with_member(group, member),
        }),
        None => Some(GroupOperation::Create {
            request: GroupRequest::with_member(group, member),
        }),
    }
}

fn plan_remove(member: &Member, group: &Group, authoritative: &[Group]) -> Option<GroupOperation> {
    if let Some(current) = find_authoritative(group, authoritative) {
        if !member.is_in(current) {
            return None;
        }
        let group_id = current.id.clone()?;
        return Some(GroupOperation::RemoveMember {
            group_id,
            request: GroupRequest::without_member(current, member),
        });
    }

    // A draft that was never persisted has nothing to remove from.
    let group_id = group.id.clone()?;
    Some(GroupOperation::RemoveMember {
        group_id,
        request: GroupRequest::without_member(group, member),
    })
}
