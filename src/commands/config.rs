//! Configuration command definitions.
//!
//! This module defines CLI commands related to configuration management.

use crate::commands::params::{
    COMMAND_CONFIG, COMMAND_PATH, COMMAND_SET, COMMAND_SHOW, PARAMETER_ACCESS_TOKEN,
    PARAMETER_API_KEY, PARAMETER_API_URL, PARAMETER_AUTH_URL, PARAMETER_PROJECT,
    PARAMETER_REFRESH_TOKEN, PARAMETER_REGION,
};
use clap::{Arg, Command};

/// Create the config command with all its subcommands.
pub fn config_command() -> Command {
    Command::new(COMMAND_CONFIG)
        .about("Configuration management")
        .subcommand_required(true)
        .subcommand(Command::new(COMMAND_SHOW).about("Show the current configuration"))
        .subcommand(Command::new(COMMAND_PATH).about("Show the configuration file path"))
        .subcommand(
            Command::new(COMMAND_SET)
                .about("Update configuration values")
                .arg(
                    Arg::new(PARAMETER_API_URL)
                        .long(PARAMETER_API_URL)
                        .num_args(1)
                        .required(false)
                        .help("Base API URL"),
                )
                .arg(
                    Arg::new(PARAMETER_AUTH_URL)
                        .long(PARAMETER_AUTH_URL)
                        .num_args(1)
                        .required(false)
                        .help("Authentication service URL"),
                )
                .arg(
                    Arg::new(PARAMETER_PROJECT)
                        .long(PARAMETER_PROJECT)
                        .num_args(1)
                        .required(false)
                        .value_parser(clap::value_parser!(u64))
                        .help("Project identifier"),
                )
                .arg(
                    Arg::new(PARAMETER_REGION)
                        .long(PARAMETER_REGION)
                        .num_args(1)
                        .required(false)
                        .value_parser(clap::value_parser!(u64))
                        .help("Region identifier"),
                )
                .arg(
                    Arg::new(PARAMETER_API_KEY)
                        .long(PARAMETER_API_KEY)
                        .num_args(1)
                        .required(false)
                        .help("Permanent API key"),
                )
                .arg(
                    Arg::new(PARAMETER_ACCESS_TOKEN)
                        .long(PARAMETER_ACCESS_TOKEN)
                        .num_args(1)
                        .required(false)
                        .help("JWT access token"),
                )
                .arg(
                    Arg::new(PARAMETER_REFRESH_TOKEN)
                        .long(PARAMETER_REFRESH_TOKEN)
                        .num_args(1)
                        .required(false)
                        .help("JWT refresh token"),
                ),
        )
}
