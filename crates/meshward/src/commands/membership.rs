//! Shared `set-groups` flow for peers and resources.
//!
//! Opens a membership session on the member's current groups, selects the
//! requested names (unknown names become drafts), and either prints the
//! plan or saves it. Failed groups are listed and turn into a
//! `PartialFailure` error; successful writes stay applied.

use serde::Serialize;
use tabled::Tabled;

use meshward_core::{
    Backend, Group, GroupOperation, Member, MembershipSession, SaveReport, Snapshot,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// One row of a plan or save report.
#[derive(Debug, Clone, Serialize, Tabled)]
struct OperationOutcome {
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Operation")]
    op: &'static str,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Group ID")]
    group_id: String,
    #[tabled(rename = "Members")]
    members: usize,
    #[tabled(rename = "Error")]
    #[serde(skip_serializing_if = "String::is_empty")]
    error: String,
}

impl OperationOutcome {
    fn new(status: &'static str, operation: &GroupOperation) -> Self {
        let op = match operation {
            GroupOperation::Create { .. } => "create",
            GroupOperation::AddMember { .. } => "add",
            GroupOperation::RemoveMember { .. } => "remove",
        };
        let request = operation.request();
        Self {
            status,
            op,
            group: request.name.clone(),
            group_id: operation
                .group_id()
                .map_or_else(|| "-".into(), ToString::to_string),
            members: request.peers.len() + request.resources.len(),
            error: String::new(),
        }
    }

    fn applied(operation: &GroupOperation, returned: &Group) -> Self {
        let mut row = Self::new("applied", operation);
        if let Some(id) = &returned.id {
            row.group_id = id.to_string();
        }
        row
    }
}

fn report_rows(report: &SaveReport) -> Vec<OperationOutcome> {
    let applied = report
        .applied
        .iter()
        .map(|a| OperationOutcome::applied(&a.operation, &a.group));
    let failed = report.failed.iter().map(|f| {
        let mut row = OperationOutcome::new("failed", &f.operation);
        row.error = f.error.to_string();
        row
    });
    applied.chain(failed).collect()
}

fn render(rows: &[OperationOutcome], global: &GlobalOpts) {
    let out = output::render_list(
        &global.output,
        rows,
        OperationOutcome::clone,
        |r| format!("{} {} {}", r.op, r.group, r.status),
    );
    output::print_output(&out, global.quiet);
}

/// Make `member` belong to exactly the groups called `names`.
pub async fn set_groups(
    backend: &Backend,
    snapshot: &Snapshot,
    member: Member,
    current: &[Group],
    names: &[String],
    dry_run: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let initial = snapshot.expand_groups(current);
    let mut session = MembershipSession::new(member, initial);
    session.set_selected(snapshot.groups_named(names));

    let plan = session.plan(&snapshot.groups);
    let color = output::should_color(&global.color);

    if plan.is_empty() {
        if !global.quiet {
            eprintln!("{}", output::status_ok("Memberships already up to date", color));
        }
        return Ok(());
    }

    if dry_run {
        let rows: Vec<OperationOutcome> = plan
            .operations()
            .iter()
            .map(|op| OperationOutcome::new("planned", op))
            .collect();
        render(&rows, global);
        return Ok(());
    }

    let report = session.save(backend, &snapshot.groups).await;
    render(&report_rows(&report), global);

    if report.is_success() {
        if !global.quiet {
            let msg = format!("{} group update(s) applied", report.applied.len());
            eprintln!("{}", output::status_ok(&msg, color));
        }
        return Ok(());
    }

    for failed in &report.failed {
        let msg = format!("{}: {}", failed.group_name(), failed.error);
        eprintln!("{}", output::status_err(&msg, color));
    }
    let retry_hint = if report.is_retryable() {
        "The failures look temporary. Re-run the same command to retry only the failed groups."
    } else {
        "Fix the cause above, then re-run the same command to retry only the failed groups."
    };
    Err(CliError::PartialFailure {
        failed: report.failed.len(),
        applied: report.applied.len(),
        groups: report.failed_group_names().join(", "),
        retry_hint: retry_hint.into(),
    })
}
