//! Peer command handlers.

use serde::Serialize;
use tabled::Tabled;

use meshward_core::{Backend, Member, Peer, Policy, matcher};

use crate::cli::{GlobalOpts, PeersArgs, PeersCommand};
use crate::error::CliError;
use crate::output;

use super::{membership, util};

// ── Peer table row ──────────────────────────────────────────────────

#[derive(Tabled)]
struct PeerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Connected")]
    connected: String,
    #[tabled(rename = "SSH")]
    ssh: String,
    #[tabled(rename = "Groups")]
    groups: String,
}

impl PeerRow {
    fn new(p: &Peer, policies: &[Policy]) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            ip: p.ip.clone().unwrap_or_else(|| "-".into()),
            connected: output::yes_no(p.connected),
            ssh: output::yes_no(p.ssh_enabled && matcher::peer_ssh_reachable(p, policies)),
            groups: output::join_or_dash(util::group_names(&p.groups)),
        }
    }
}

// ── Reachability report ─────────────────────────────────────────────

#[derive(Serialize)]
struct Reachability {
    peer_id: String,
    peer_name: String,
    port: u16,
    reachable: bool,
    ssh_enabled: bool,
}

fn reachability_detail(r: &Reachability) -> String {
    [
        format!("Peer:        {} ({})", r.peer_name, r.peer_id),
        format!("Port:        {}/tcp", r.port),
        format!("Reachable:   {}", output::yes_no(r.reachable)),
        format!("SSH server:  {}", output::yes_no(r.ssh_enabled)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    backend: &Backend,
    args: PeersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PeersCommand::List => {
            let (peers, policies) = tokio::try_join!(backend.peers(), backend.policies())?;
            let out = output::render_list(
                &global.output,
                &peers,
                |p| PeerRow::new(p, &policies),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PeersCommand::Ssh { peer, port } => {
            let snapshot = backend.snapshot().await?;
            let found = util::resolve_peer(&snapshot, &peer)?;
            let report = Reachability {
                peer_id: found.id.to_string(),
                peer_name: found.name.clone(),
                port,
                reachable: matcher::peer_has_reachable_port(found, &snapshot.policies, port),
                ssh_enabled: found.ssh_enabled,
            };
            let out = output::render_single(&global.output, &report, reachability_detail, |r| {
                r.reachable.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PeersCommand::SetGroups {
            peer,
            groups,
            dry_run,
        } => {
            let snapshot = backend.snapshot().await?;
            let found = util::resolve_peer(&snapshot, &peer)?;
            membership::set_groups(
                backend,
                &snapshot,
                Member::Peer(found.id.clone()),
                &found.groups,
                &groups,
                dry_run,
                global,
            )
            .await
        }
    }
}
