//! Bare metal server command definitions.

use crate::commands::params::{
    flavor_parameter, id_parameter, image_id_parameter, interface_type_parameter, limit_parameter,
    name_parameter, offset_parameter, snapshot_id_parameter, subnet_id_parameter,
    COMMAND_BAREMETAL, COMMAND_CREATE, COMMAND_FLAVORS, COMMAND_GET, COMMAND_LIST,
    COMMAND_REBUILD, PARAMETER_PASSWORD, PARAMETER_SOURCE, PARAMETER_SSH_KEY, PARAMETER_STATUS,
};
use clap::{Arg, Command};

/// Create the baremetal command with all its subcommands.
pub fn baremetal_command() -> Command {
    Command::new(COMMAND_BAREMETAL)
        .about("Manage bare metal servers")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List bare metal servers")
                .visible_alias("ls")
                .arg(name_parameter())
                .arg(
                    Arg::new(PARAMETER_STATUS)
                        .long(PARAMETER_STATUS)
                        .num_args(1)
                        .required(false)
                        .help("Filter by server status"),
                )
                .arg(limit_parameter())
                .arg(offset_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get bare metal server details")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Provision a new bare metal server")
                .arg(name_parameter().required(true))
                .arg(flavor_parameter().required(true))
                .arg(
                    Arg::new(PARAMETER_SOURCE)
                        .long(PARAMETER_SOURCE)
                        .num_args(1)
                        .required(true)
                        .value_parser(["image", "snapshot"])
                        .help("Boot source"),
                )
                .arg(image_id_parameter())
                .arg(snapshot_id_parameter())
                .arg(
                    Arg::new(PARAMETER_PASSWORD)
                        .long(PARAMETER_PASSWORD)
                        .num_args(1)
                        .required(false)
                        .help("Root password (mutually exclusive with --ssh-key)"),
                )
                .arg(
                    Arg::new(PARAMETER_SSH_KEY)
                        .long(PARAMETER_SSH_KEY)
                        .num_args(1)
                        .required(false)
                        .help("Name of an uploaded SSH key"),
                )
                .arg(interface_type_parameter())
                .arg(subnet_id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_REBUILD)
                .about("Reinstall a bare metal server from an image")
                .arg(id_parameter())
                .arg(image_id_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_FLAVORS).about("List available bare metal flavors"),
        )
}
