//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wfs - Shell-style access to a sandboxed storage directory
#[derive(Parser, Debug)]
#[command(name = "wfs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (.toml, .json, .yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Host directory serving as the storage root
    #[arg(long, global = true, env = "WFS_SANDBOX", default_value = ".wfs")]
    pub sandbox: PathBuf,

    /// Repository inside the storage root that scopes every path
    #[arg(long, global = true, env = "WFS_REPOSITORY")]
    pub repository: Option<String>,

    /// Chunk size for reads, in bytes
    #[arg(long, global = true)]
    pub buffer_size: Option<usize>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List a directory
    Ls {
        /// Directory to list
        #[arg(default_value = "/")]
        path: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print a file to stdout
    Cat {
        path: String,
    },

    /// Replace a file's content
    ///
    /// Reads stdin when no content is given.
    ///
    /// Examples:
    ///   wfs write /notes.txt "hello"
    ///   echo hello | wfs write /notes.txt
    ///   wfs write /logo.png --base64 iVBORw0KGgo=
    Write {
        path: String,

        /// Content to write
        content: Option<String>,

        /// Decode the content as base64
        #[arg(long)]
        base64: bool,
    },

    /// Append to a file, creating it if needed
    Append {
        path: String,

        /// Content to append (stdin when absent)
        content: Option<String>,

        /// Decode the content as base64
        #[arg(long)]
        base64: bool,
    },

    /// Create a directory
    Mkdir {
        path: String,

        /// Create missing parent directories
        #[arg(short, long)]
        parents: bool,
    },

    /// Remove a file or directory
    Rm {
        path: String,

        /// Remove directories and their contents
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show size and modification time
    Stat {
        path: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print a retrievable URL for an entry
    Url {
        path: String,
    },

    /// Print the effective configuration as TOML
    Config,
}
