//! CLI module for anchorframe
//!
//! Provides command-line interface for:
//! - simulate: Run a scripted session against in-memory collaborators
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, RoleArg, SimulateArgs};
pub use commands::{check_config, run, run_command, simulate, SimulationSummary};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
