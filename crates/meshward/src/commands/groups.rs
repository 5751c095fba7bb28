//! Group command handlers.

use tabled::Tabled;

use meshward_core::{Backend, Group};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Peers")]
    peers: usize,
    #[tabled(rename = "Resources")]
    resources: usize,
}

impl From<&Group> for GroupRow {
    fn from(g: &Group) -> Self {
        Self {
            id: g.id.as_ref().map_or_else(|| "-".into(), ToString::to_string),
            name: g.name.clone(),
            peers: g.peer_ids().len(),
            resources: g.resources.len(),
        }
    }
}

pub async fn handle(
    backend: &Backend,
    args: GroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        GroupsCommand::List => {
            let groups = backend.groups().await?;
            let out = output::render_list(&global.output, &groups, |g| GroupRow::from(g), |g| {
                g.id.as_ref().map(ToString::to_string).unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
