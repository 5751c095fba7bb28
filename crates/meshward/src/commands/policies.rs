//! Policy command handlers.

use tabled::Tabled;

use meshward_core::matcher::{self, PolicyTarget};
use meshward_core::{Backend, Group, Policy, ports};

use crate::cli::{AssignedArgs, GlobalOpts, PoliciesArgs, PoliciesCommand};
use crate::error::CliError;
use crate::output;

use super::resources::ResourceRow;
use super::util;

// ── Policy table row ────────────────────────────────────────────────

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Sources")]
    sources: String,
    #[tabled(rename = "Destinations")]
    destinations: String,
}

impl PolicyRow {
    fn new(p: &Policy, groups: &[Group]) -> Self {
        let rule = matcher::first_rule(p);
        let dash = || "-".to_owned();
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            enabled: output::yes_no(p.enabled),
            action: rule.map_or_else(dash, |r| r.action.to_string()),
            protocol: rule.map_or_else(dash, |r| r.protocol.to_string()),
            ports: rule.map_or_else(dash, |r| {
                if ports::is_unrestricted(r) {
                    "all".into()
                } else {
                    output::join_or_dash(ports::normalize(r))
                }
            }),
            sources: rule.map_or_else(dash, |r| {
                let mut names = util::group_ref_names(&r.sources, groups);
                if let Some(res) = &r.source_resource {
                    names.push(res.id.to_string());
                }
                output::join_or_dash(names)
            }),
            destinations: rule.map_or_else(dash, |r| {
                let mut names = util::group_ref_names(&r.destinations, groups);
                if let Some(res) = &r.destination_resource {
                    names.push(res.id.to_string());
                }
                output::join_or_dash(names)
            }),
        }
    }
}

fn render_policies(policies: &[&Policy], groups: &[Group], global: &GlobalOpts) {
    let out = output::render_list(
        &global.output,
        policies,
        |p| PolicyRow::new(p, groups),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backend: &Backend,
    args: PoliciesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PoliciesCommand::List => {
            let (policies, groups) = tokio::try_join!(backend.policies(), backend.groups())?;
            let refs: Vec<&Policy> = policies.iter().collect();
            render_policies(&refs, &groups, global);
            Ok(())
        }

        PoliciesCommand::Assigned(target) => assigned(backend, target, global).await,

        PoliciesCommand::Destinations { policy } => {
            let snapshot = backend.snapshot().await?;
            let found = util::resolve_policy(&snapshot, &policy)?;
            let reached = matcher::destination_resources_of(found, &snapshot.resources);
            let out = output::render_list(
                &global.output,
                &reached,
                |r| ResourceRow::from(*r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn assigned(
    backend: &Backend,
    args: AssignedArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = backend.snapshot().await?;

    let assigned = match (&args.resource, &args.network, &args.groups) {
        (Some(resource), Some(network), _) => {
            let found = util::resolve_resource(&snapshot, network, resource)?;
            matcher::assigned_policies(PolicyTarget::Resource(found), &snapshot.policies)
        }
        (_, _, Some(names)) => {
            let groups: Vec<Group> = snapshot
                .groups_named(names)
                .into_iter()
                .filter(|g| !g.is_draft())
                .collect();
            if groups.is_empty() {
                return Err(CliError::NotFound {
                    resource_type: "group".into(),
                    identifier: names.join(", "),
                    list_command: "groups list".into(),
                });
            }
            matcher::assigned_policies(PolicyTarget::Groups(&groups), &snapshot.policies)
        }
        _ => {
            return Err(CliError::Validation {
                field: "target".into(),
                reason: "pass --resource with --network, or --groups".into(),
            });
        }
    };

    render_policies(&assigned.policies, &snapshot.groups, global);
    if !global.quiet && matches!(global.output, crate::cli::OutputFormat::Table) {
        eprintln!(
            "{} assigned, {} enabled",
            assigned.count,
            assigned.enabled_policies.len()
        );
    }
    Ok(())
}
