mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use palace_core::config::ConfigLoader;

#[derive(Debug, Parser)]
#[command(name = "palace", version, about = "Index markdown vaults, walk their link graph and link mentions")]
struct Cli {
    /// Config file (default: ~/.config/palace/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vault alias to operate on (default: `default_vault` from config)
    #[arg(long, global = true)]
    vault: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sync the vault index with the files on disk
    Reindex(ReindexArgs),

    /// Show index statistics
    Stats(StatsArgs),

    /// Show incoming and outgoing links of a note
    Links(LinksArgs),

    /// Walk the link graph from a note
    Graph(GraphArgs),

    /// Preview unlinked mentions of a note elsewhere in the vault
    Mentions(MentionsArgs),

    /// Turn unlinked mentions of a note into wiki-links
    LinkMentions(LinkMentionsArgs),

    /// Full-text search, optionally across vaults
    Search(SearchArgs),

    /// List notes matching metadata filters, optionally across vaults
    Query(QueryArgs),
}

#[derive(Debug, Args)]
pub struct ReindexArgs {
    /// Clear the index and rebuild it from scratch
    #[arg(long)]
    pub full: bool,

    /// Print every file as it is indexed
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LinksArgs {
    /// Note path relative to the vault root
    pub note: String,

    /// Only show incoming links
    #[arg(long, conflicts_with = "outgoing")]
    pub incoming: bool,

    /// Only show outgoing links
    #[arg(long)]
    pub outgoing: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Start note, relative to the vault root
    pub note: String,

    /// incoming, outgoing or both
    #[arg(long, default_value = "both")]
    pub direction: String,

    /// Maximum hop distance
    #[arg(long, default_value_t = 2)]
    pub depth: usize,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct MentionsArgs {
    /// Target note, relative to the vault root
    pub note: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct LinkMentionsArgs {
    /// Target note, relative to the vault root
    pub note: String,

    /// Write the changes (otherwise only preview)
    #[arg(long)]
    pub confirm: bool,

    /// Maximum notes to rewrite (default: retro_linking.max_notes)
    #[arg(long)]
    pub max_notes: Option<usize>,

    #[arg(long)]
    pub json: bool,
}

/// Which vaults a read command covers.
#[derive(Debug, Args)]
pub struct VaultSelection {
    /// Cover every configured vault
    #[arg(long)]
    pub all_vaults: bool,

    /// Only these vaults (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub vaults: Option<Vec<String>>,

    /// Skip these vaults (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude_vaults: Option<Vec<String>>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Words to search for
    pub text: String,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[command(flatten)]
    pub selection: VaultSelection,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Filter by note type
    #[arg(long = "type")]
    pub note_type: Option<String>,

    /// Filter by status (active, stub, archived)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Filter by path prefix
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Modified on or after (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    #[command(flatten)]
    pub selection: VaultSelection,

    #[arg(long)]
    pub json: bool,
}

fn main() {
    let cli = Cli::parse();

    let rc = match ConfigLoader::load(cli.config.as_deref(), cli.vault.as_deref()) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&rc);
    tracing::debug!("using vault '{}'", rc.default_vault);

    match cli.command {
        Commands::Reindex(args) => cmd::reindex::run(&rc, args),
        Commands::Stats(args) => cmd::stats::run(&rc, args),
        Commands::Links(args) => cmd::links::run(&rc, args),
        Commands::Graph(args) => cmd::graph::run(&rc, args),
        Commands::Mentions(args) => cmd::mentions::run_preview(&rc, args),
        Commands::LinkMentions(args) => cmd::mentions::run_apply(&rc, args),
        Commands::Search(args) => cmd::search::run(&rc, args),
        Commands::Query(args) => cmd::query::run(&rc, args),
    }

    logging::flush();
}
