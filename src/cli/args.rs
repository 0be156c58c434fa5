//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Curriculum map capture explorer: rebuild captured curriculum trees and
/// flatten them into spreadsheet exports
#[derive(Parser, Debug)]
#[command(name = "currimap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (-d, -dd, -ddd)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the curriculum items come from: a discovered capture + step, or a
/// direct items file + root id.
#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    /// Capture epoch (folder responses_<epoch>)
    #[arg(long, conflicts_with_all = ["items", "root"])]
    pub capture: Option<String>,

    /// Step index within the capture's user document
    #[arg(long, requires = "capture")]
    pub step: Option<usize>,

    /// Items JSON file (id -> record map)
    #[arg(long, value_hint = ValueHint::FilePath, requires = "root")]
    pub items: Option<PathBuf>,

    /// Root node id to start from
    #[arg(long)]
    pub root: Option<String>,

    /// Capture directory (default: from config)
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discovered captures with their timestamps
    List {
        /// Capture directory (default: from config)
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Show the steps (curriculum roots) of a capture
    Steps {
        /// Capture epoch
        #[arg(long)]
        capture: String,

        /// Capture directory (default: from config)
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Render the curriculum tree
    Tree {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Export a (selected) subtree as spreadsheet sheets
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory (default: from config)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: Option<PathBuf>,

        /// Output format: csv | workbook
        #[arg(short, long)]
        format: Option<String>,

        /// Row sort order: none | asc | desc
        #[arg(short, long)]
        sort: Option<String>,

        /// Exclude the learning objectives side channel
        #[arg(long)]
        no_objectives: bool,

        /// Node ids marking the selected subtree (default: everything)
        #[arg(long, num_args = 1..)]
        select: Vec<String>,

        /// Subtree root id to export (default: the tree root)
        #[arg(long)]
        subtree: Option<String>,
    },

    /// Summarize the key paths of a JSON document
    Survey {
        /// JSON file to survey
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Init,

    /// Show config file path
    Path,
}
