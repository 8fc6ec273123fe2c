//! Compute instance command definitions.

use crate::commands::params::{
    flavor_parameter, id_parameter, image_id_parameter, interface_type_parameter, limit_parameter,
    name_parameter, offset_parameter, snapshot_id_parameter, subnet_id_parameter, COMMAND_CONSOLE,
    COMMAND_CREATE, COMMAND_DELETE, COMMAND_GET, COMMAND_INSTANCE, COMMAND_INTERFACES,
    COMMAND_LIST, COMMAND_RESIZE, COMMAND_START, COMMAND_STOP, PARAMETER_PASSWORD,
    PARAMETER_SOURCE, PARAMETER_SSH_KEY, PARAMETER_STATUS, PARAMETER_VOLUME_ID,
};
use clap::{Arg, Command};
use uuid::Uuid;

/// Create the instance command with all its subcommands.
pub fn instance_command() -> Command {
    Command::new(COMMAND_INSTANCE)
        .about("Manage compute instances")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List instances")
                .visible_alias("ls")
                .arg(name_parameter())
                .arg(
                    Arg::new(PARAMETER_STATUS)
                        .long(PARAMETER_STATUS)
                        .num_args(1)
                        .required(false)
                        .help("Filter by instance status"),
                )
                .arg(flavor_parameter())
                .arg(limit_parameter())
                .arg(offset_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get instance details")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Create a new instance")
                .arg(name_parameter().required(true))
                .arg(flavor_parameter().required(true))
                .arg(
                    Arg::new(PARAMETER_SOURCE)
                        .long(PARAMETER_SOURCE)
                        .num_args(1)
                        .required(true)
                        .value_parser(["image", "snapshot", "volume"])
                        .help("Boot source"),
                )
                .arg(image_id_parameter())
                .arg(snapshot_id_parameter())
                .arg(
                    Arg::new(PARAMETER_VOLUME_ID)
                        .long(PARAMETER_VOLUME_ID)
                        .num_args(1)
                        .required(false)
                        .value_parser(clap::value_parser!(Uuid))
                        .help("Boot volume UUID"),
                )
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
            Command::new(COMMAND_DELETE)
                .about("Delete an instance")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_RESIZE)
                .about("Change the instance flavor")
                .arg(id_parameter())
                .arg(flavor_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_START)
                .about("Start a stopped instance")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_STOP)
                .about("Stop a running instance")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_INTERFACES)
                .about("List network interfaces of an instance")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CONSOLE)
                .about("Get the remote console descriptor")
                .arg(id_parameter()),
        )
}
