//! Clap derive structures for the `meshward` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// meshward -- access control for mesh VPN networks
#[derive(Debug, Parser)]
#[command(
    name = "meshward",
    version,
    about = "Inspect and edit mesh VPN access control from the command line",
    long_about = "Manage group memberships of peers and network resources, and\n\
        answer which access policies apply to them.\n\n\
        Membership edits are computed as a diff against the server's current\n\
        groups and applied concurrently; failed groups are reported by name.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "MESHWARD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Management API URL (overrides profile)
    #[arg(long, short = 'u', env = "MESHWARD_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Personal access token (overrides profile)
    #[arg(long, env = "MESHWARD_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MESHWARD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "MESHWARD_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MESHWARD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List groups
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// List peers, check SSH reachability, edit group membership
    #[command(alias = "p")]
    Peers(PeersArgs),

    /// List network resources and edit their group membership
    #[command(alias = "res", alias = "r")]
    Resources(ResourcesArgs),

    /// List access policies and resolve which ones apply
    #[command(alias = "pol")]
    Policies(PoliciesArgs),

    /// List posture checks
    #[command(name = "posture-checks", alias = "pc")]
    PostureChecks(PostureChecksArgs),

    /// Inspect the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List all groups
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PEERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PeersArgs {
    #[command(subcommand)]
    pub command: PeersCommand,
}

#[derive(Debug, Subcommand)]
pub enum PeersCommand {
    /// List all peers
    #[command(alias = "ls")]
    List,

    /// Check whether any enabled policy admits TCP traffic to a peer's port
    Ssh {
        /// Peer ID or name
        peer: String,

        /// Port to check
        #[arg(long, default_value = "22")]
        port: u16,
    },

    /// Replace a peer's group memberships
    ///
    /// Groups not yet on the server are created with the peer as their
    /// first member. The "All" group is implicit and never edited.
    #[command(name = "set-groups")]
    SetGroups {
        /// Peer ID or name
        peer: String,

        /// Group names the peer should belong to
        groups: Vec<String>,

        /// Print the planned operations without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResourcesArgs {
    #[command(subcommand)]
    pub command: ResourcesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourcesCommand {
    /// List resources across all networks
    #[command(alias = "ls")]
    List,

    /// Replace a network resource's group memberships
    #[command(name = "set-groups")]
    SetGroups {
        /// Network ID
        network: String,

        /// Resource ID or name within the network
        resource: String,

        /// Group names the resource should belong to
        groups: Vec<String>,

        /// Print the planned operations without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POLICIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PoliciesArgs {
    #[command(subcommand)]
    pub command: PoliciesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoliciesCommand {
    /// List all policies
    #[command(alias = "ls")]
    List,

    /// Show policies whose destinations include a resource or group set
    Assigned(AssignedArgs),

    /// Show resources reached by a policy's destination groups
    Destinations {
        /// Policy ID or name
        policy: String,
    },
}

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("target")
        .required(true)
        .args(["resource", "groups"])
))]
pub struct AssignedArgs {
    /// Resource ID or name
    #[arg(long, requires = "network")]
    pub resource: Option<String>,

    /// Network ID owning the resource
    #[arg(long)]
    pub network: Option<String>,

    /// Group names to match against policy destinations
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub groups: Option<Vec<String>>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  POSTURE CHECKS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PostureChecksArgs {
    #[command(subcommand)]
    pub command: PostureChecksCommand,
}

#[derive(Debug, Subcommand)]
pub enum PostureChecksCommand {
    /// List all posture checks
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current configuration (tokens masked)
    Show,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
