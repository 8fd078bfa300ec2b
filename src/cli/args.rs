//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Reactive fraction trees: every parent is recomputed from its children
#[derive(Parser, Debug)]
#[command(name = "fractree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print trees as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Also write the resulting tree as JSON to this file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a tree (built-in sample if no file)
    Show {
        /// Tree descriptor (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Set a node's value and recalculate its ancestors
    Set {
        /// Tree descriptor (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Node id
        #[arg(long)]
        id: i64,
        /// Numerator (omit for unknown)
        #[arg(long, allow_negative_numbers = true)]
        num: Option<f64>,
        /// Denominator (omit for unknown)
        #[arg(long, allow_negative_numbers = true)]
        denom: Option<f64>,
        /// Exponent
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        exp: f64,
    },

    /// Insert a subtree under a node
    Add {
        /// Tree descriptor (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Parent node id
        #[arg(long)]
        parent: i64,
        /// Descriptor of the subtree to insert
        #[arg(long, value_hint = ValueHint::FilePath)]
        child: PathBuf,
        /// Position among the parent's children (default: last)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Detach a node from its parent
    Remove {
        /// Tree descriptor (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Node id
        #[arg(long)]
        id: i64,
    },

    /// Recalculate every parent from its children
    Recalc {
        /// Tree descriptor (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
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
    /// Show effective settings
    Show,
    /// Print a commented config template
    Template,
    /// Show the global config file location
    Path,
}
