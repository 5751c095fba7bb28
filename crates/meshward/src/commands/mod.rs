//! Command dispatch: bridges CLI args -> core engine -> output formatting.

pub mod config_cmd;
pub mod groups;
pub mod membership;
pub mod peers;
pub mod policies;
pub mod posture_checks;
pub mod resources;
pub mod util;

use meshward_core::Backend;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    backend: &Backend,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Groups(args) => groups::handle(backend, args, global).await,
        Command::Peers(args) => peers::handle(backend, args, global).await,
        Command::Resources(args) => resources::handle(backend, args, global).await,
        Command::Policies(args) => policies::handle(backend, args, global).await,
        Command::PostureChecks(args) => posture_checks::handle(backend, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
