//! CLI command definitions and argument parsing.
//!
//! This module defines all the CLI commands and their arguments using the clap crate.
//! It provides a structured way to define the command-line interface for the Nimbus
//! Cloud CLI. The implementation has been modularized into separate files for better
//! maintainability.

use clap::{ArgMatches, Command};

pub mod params;

pub mod ai;
pub mod baremetal;
pub mod config;
pub mod instance;
pub mod k8s;
pub mod server_group;
pub mod task;
pub mod volume;

use params::{
    debug_parameter, format_parameter, format_pretty_parameter, format_with_headers_parameter,
    wait_parameter,
};

/// Build the full command tree without parsing.
pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(debug_parameter())
        .arg(wait_parameter())
        .arg(format_parameter())
        .arg(format_pretty_parameter())
        .arg(format_with_headers_parameter())
        .subcommand(instance::instance_command())
        .subcommand(volume::volume_command())
        .subcommand(ai::ai_command())
        .subcommand(baremetal::baremetal_command())
        .subcommand(k8s::k8s_command())
        .subcommand(server_group::server_group_command())
        .subcommand(task::task_command())
        .subcommand(config::config_command())
}

/// Create and configure all CLI commands and parse the process arguments.
///
/// # Returns
///
/// An `ArgMatches` instance containing the parsed command-line arguments.
pub fn create_cli_commands() -> ArgMatches {
    build_cli().get_matches()
}
