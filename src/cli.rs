use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "netform")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative connector state for network fabrics", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/netform/config.toml)
    #[arg(long, global = true, env = "NETFORM_CONFIG")]
    pub config: Option<String>,

    /// State file (default: ~/.local/state/netform/state.toml)
    #[arg(long, global = true, env = "NETFORM_STATE")]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build request payloads from config and diff them against recorded state
    Plan(PlanArgs),

    /// Read observed connectors and record them as the new state
    Refresh(RefreshArgs),

    /// Show recorded state
    Show(ShowArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Only plan this connector
    #[arg(short, long)]
    pub connector: Option<String>,

    /// Print request payloads as JSON instead of a diff
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct RefreshArgs {
    /// Only refresh this connector
    #[arg(short, long)]
    pub connector: Option<String>,

    /// Read the observed connector from a saved JSON response instead of the API
    #[arg(short, long)]
    pub response: Option<String>,

    /// Show what would be recorded without writing state
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Only show this connector
    #[arg(short, long)]
    pub connector: Option<String>,
}
