use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "bigip-provider")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative configuration for BIG-IP load balancers", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/bigip-provider/config.toml)
    #[arg(long, global = true, env = "BIGIP_PROVIDER_CONFIG")]
    pub config: Option<String>,

    /// State file (default: ~/.local/state/bigip-provider/state.json)
    #[arg(long, global = true, env = "BIGIP_PROVIDER_STATE")]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan(PlanArgs),

    /// Converge the appliance to the declared configuration
    Apply(ApplyArgs),

    /// Read tracked objects and update the state file
    Refresh {
        /// Number of parallel reads
        #[arg(short, long, default_value = "4")]
        jobs: usize,
    },

    /// Start tracking an existing object
    Import {
        /// Resource type (e.g. bigip_ltm_pool)
        type_name: String,

        /// Label to track it under
        label: String,

        /// Object identity (e.g. /Common/web)
        id: String,
    },

    /// Delete tracked objects in reverse dependency order
    Destroy {
        /// Only destroy matching resources (type, type.label, or short form like pool)
        target: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Number of parallel jobs per tier
        #[arg(short, long, default_value = "4")]
        jobs: usize,
    },

    /// List resource types, or the attributes of one type
    Schema {
        /// Resource type to describe
        type_name: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Only plan matching resources (type, type.label, or short form like pool)
    pub target: Option<String>,

    /// Number of parallel reads
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only apply matching resources (type, type.label, or short form like pool)
    pub target: Option<String>,

    /// Dry run - show what would be done
    #[arg(short, long)]
    pub dry_run: bool,

    /// Number of parallel jobs per tier
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
