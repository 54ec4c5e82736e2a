use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan",
    version,
    about = "itpkit CLI - Delete atoms from GROMACS include-topology (.itp) files while keeping ids contiguous and the net charge unchanged.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Delete atoms, renumber the remainder, and redistribute the removed charge.
    Trim(TrimArgs),
    /// Print a summary of a topology file.
    Inspect(InspectArgs),
}

/// Arguments for the `trim` subcommand.
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Path to the input topology file (e.g., ligand.itp).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output topology file. May equal the input path.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Atom ids to delete, as a comma-separated list of ids and ranges (e.g., 15,20-22).
    /// Can be used multiple times.
    #[arg(short, long = "delete", value_name = "IDS")]
    pub delete: Vec<String>,

    /// Divide the removed charge over this many atoms instead of over all survivors.
    #[arg(long, value_name = "INT")]
    pub normalize_over: Option<usize>,

    /// Leave sections without a known layout (e.g., exclusions) out of the output.
    #[arg(long)]
    pub drop_unknown_sections: bool,

    /// Write the old-to-new atom id mapping to this path as TOML.
    #[arg(long, value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S charge.normalize-over=19
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the topology file to summarize.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// List every line the reader skipped, with its reason.
    #[arg(long)]
    pub skipped: bool,
}
