//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::RenderStyle;
use crate::domain::MergeMode;

/// Inspect and restructure EMD-style data trees stored in directory containers
#[derive(Parser, Debug)]
#[command(name = "emdtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, env = "EMDTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a container holding a single empty root
    Init {
        /// Container directory
        #[arg(value_hint = ValueHint::DirPath)]
        container: PathBuf,
        /// Root name (default: root_name setting)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Draw a tree
    Show {
        #[command(flatten)]
        source: TreeLocation,
        /// Draw from the root even when a path is given
        #[arg(long)]
        from_root: bool,
        /// Drawing style (default: render setting)
        #[arg(long, value_enum)]
        style: Option<RenderStyle>,
    },

    /// Describe one node: path, class, children and metadata
    Get {
        #[command(flatten)]
        source: TreeLocation,
    },

    /// Add an empty node below an existing one
    Add {
        /// Container directory
        #[arg(value_hint = ValueHint::DirPath)]
        container: PathBuf,
        /// Path of the parent node ("/" is the root)
        parent: String,
        /// Name of the new node
        name: String,
        /// Tree to open, when the container holds several
        #[arg(short, long)]
        tree: Option<String>,
    },

    /// Split a branch off into a tree of its own, stored in a new container
    Cut {
        #[command(flatten)]
        source: TreeLocation,
        /// Container that receives the new tree
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: PathBuf,
        /// What to do with the old root's metadata: true, false or copy
        #[arg(short, long)]
        metadata: Option<MergeMode>,
    },

    /// Move a branch below a node of another (or the same) tree
    Graft {
        #[command(flatten)]
        source: TreeLocation,
        /// Container holding the target node (default: the source container)
        #[arg(long, value_hint = ValueHint::DirPath)]
        onto: Option<PathBuf>,
        /// Tree holding the target node, when its container holds several
        #[arg(long)]
        onto_tree: Option<String>,
        /// Path of the target node
        #[arg(long, default_value = "/")]
        at: String,
        /// What to do with the old root's metadata: true, false or copy
        #[arg(short, long)]
        metadata: Option<MergeMode>,
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

/// A node inside a tree inside a container.
#[derive(clap::Args, Debug, Clone)]
pub struct TreeLocation {
    /// Container directory
    #[arg(value_hint = ValueHint::DirPath)]
    pub container: PathBuf,
    /// Node path from the root ("/" is the root itself)
    #[arg(default_value = "/")]
    pub path: String,
    /// Tree to open, when the container holds several
    #[arg(short, long)]
    pub tree: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Print the global config file location
    Path,
}
