//! Posture check command handlers.

use tabled::Tabled;

use meshward_core::{Backend, PostureCheck};

use crate::cli::{GlobalOpts, PostureChecksArgs, PostureChecksCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PostureCheckRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&PostureCheck> for PostureCheckRow {
    fn from(c: &PostureCheck) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            description: c.description.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

pub async fn handle(
    backend: &Backend,
    args: PostureChecksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PostureChecksCommand::List => {
            let checks = backend.posture_checks().await?;
            let out = output::render_list(
                &global.output,
                &checks,
                |c| PostureCheckRow::from(c),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
