//! CLI argument definitions using clap
//!
//! Commands:
//! - anchorframe simulate [--config <path>] [--role host|follower|none] ...
//! - anchorframe check-config --config <path>

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::sim::SimRole;

/// anchorframe - authority-gated shared spatial frame coordination
#[derive(Parser, Debug)]
#[command(name = "anchorframe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Simulated participant role
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleArg {
    /// Session server
    Host,
    /// Session peer
    Follower,
    /// No networked session
    None,
}

impl From<RoleArg> for SimRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Host => SimRole::Host,
            RoleArg::Follower => SimRole::Follower,
            RoleArg::None => SimRole::NoSession,
        }
    }
}

/// Options for a scripted simulation run
#[derive(clap::Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Role of the simulated participant
    #[arg(long, value_enum, default_value_t = RoleArg::Host)]
    pub role: RoleArg,

    /// Answer the spatial mapping permission request with a denial
    #[arg(long)]
    pub deny_permission: bool,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 8.0)]
    pub duration: f32,

    /// Seconds per scheduling tick
    #[arg(long, default_value_t = 0.016)]
    pub tick: f32,

    /// Simulated second at which the map localizes
    #[arg(long, default_value_t = 1.0)]
    pub localize_at: f32,

    /// Initial height of the snap target
    #[arg(long, default_value_t = 1.0)]
    pub start_height: f32,

    /// Simulate a world without any floor collider
    #[arg(long)]
    pub no_ground: bool,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            config: None,
            role: RoleArg::Host,
            deny_permission: false,
            duration: 8.0,
            tick: 0.016,
            localize_at: 1.0,
            start_height: 1.0,
            no_ground: false,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scripted session against in-memory collaborators
    Simulate(SimulateArgs),

    /// Validate a configuration file and print the effective values
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./anchorframe.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
