//! Block storage volume command definitions.

use crate::commands::params::{
    id_parameter, image_id_parameter, instance_id_parameter, limit_parameter, name_parameter,
    offset_parameter, snapshot_id_parameter, COMMAND_ATTACH, COMMAND_CREATE, COMMAND_DELETE,
    COMMAND_DETACH, COMMAND_EXTEND, COMMAND_GET, COMMAND_LIST, COMMAND_RETYPE, COMMAND_VOLUME,
    PARAMETER_SIZE, PARAMETER_SOURCE, PARAMETER_VOLUME_TYPE,
};
use clap::{Arg, Command};

fn size_parameter() -> Arg {
    Arg::new(PARAMETER_SIZE)
        .long(PARAMETER_SIZE)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(u64))
        .help("Volume size in gigabytes")
}

fn volume_type_parameter() -> Arg {
    Arg::new(PARAMETER_VOLUME_TYPE)
        .long(PARAMETER_VOLUME_TYPE)
        .num_args(1)
        .required(false)
        .help("Volume type")
}

/// Create the volume command with all its subcommands.
pub fn volume_command() -> Command {
    Command::new(COMMAND_VOLUME)
        .about("Manage block storage volumes")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List volumes")
                .visible_alias("ls")
                .arg(instance_id_parameter())
                .arg(name_parameter())
                .arg(limit_parameter())
                .arg(offset_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get volume details")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Create a new volume")
                .arg(name_parameter().required(true))
                .arg(
                    Arg::new(PARAMETER_SOURCE)
                        .long(PARAMETER_SOURCE)
                        .num_args(1)
                        .required(true)
                        .value_parser(["new-volume", "image", "snapshot"])
                        .help("Volume source"),
                )
                .arg(size_parameter())
                .arg(image_id_parameter())
                .arg(snapshot_id_parameter())
                .arg(volume_type_parameter().value_parser([
                    "standard",
                    "ssd_hiiops",
                    "cold",
                    "ultra",
                ])),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete a volume")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_ATTACH)
                .about("Attach a volume to an instance")
                .arg(id_parameter())
                .arg(instance_id_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_DETACH)
                .about("Detach a volume from its instance")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_EXTEND)
                .about("Grow a volume to a new size")
                .arg(id_parameter())
                .arg(size_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_RETYPE)
                .about("Change the volume type")
                .arg(id_parameter())
                .arg(
                    volume_type_parameter()
                        .required(true)
                        .value_parser(["standard", "ssd_hiiops"]),
                ),
        )
}
