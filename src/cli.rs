use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "specimen-intake")]
#[command(about = "Move staged specimen image folders into the collection tree", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/specimen-intake/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process every row of the staging sheet
    Run {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show where each staged folder would go, without moving anything
    Preview {
        /// Write the plan as JSON instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rows left in the staging sheet and folders left in the staging directory
    Status,

    /// Show or create the config file
    Config {
        /// Write a template config file
        #[arg(long)]
        init: bool,

        /// Print the current settings
        #[arg(long)]
        show: bool,
    },
}
