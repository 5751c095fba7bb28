//! Network resource command handlers.

use tabled::Tabled;

use meshward_core::{Backend, Member, Resource, ResourceRef};

use crate::cli::{GlobalOpts, ResourcesArgs, ResourcesCommand};
use crate::error::CliError;
use crate::output;

use super::{membership, util};

#[derive(Tabled)]
pub(super) struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Groups")]
    groups: String,
}

impl From<&Resource> for ResourceRow {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id.to_string(),
            name: r.name.clone(),
            network: r
                .network_id
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string),
            kind: r.kind.clone().unwrap_or_else(|| "-".into()),
            address: r.address.clone().unwrap_or_else(|| "-".into()),
            enabled: output::yes_no(r.enabled),
            groups: output::join_or_dash(util::group_names(&r.groups)),
        }
    }
}

pub async fn handle(
    backend: &Backend,
    args: ResourcesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResourcesCommand::List => {
            let networks = backend.networks().await?;
            let resources = backend.resources_of(&networks).await;
            let out = output::render_list(
                &global.output,
                &resources,
                |r| ResourceRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ResourcesCommand::SetGroups {
            network,
            resource,
            groups,
            dry_run,
        } => {
            let snapshot = backend.snapshot().await?;
            let found = util::resolve_resource(&snapshot, &network, &resource)?;
            let member =
                Member::Resource(ResourceRef::new(found.id.clone(), found.kind.as_deref()));
            membership::set_groups(
                backend,
                &snapshot,
                member,
                &found.groups,
                &groups,
                dry_run,
                global,
            )
            .await
        }
    }
}
