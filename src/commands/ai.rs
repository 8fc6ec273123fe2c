//! GPU cluster command definitions.

use crate::commands::params::{
    flavor_parameter, id_parameter, image_id_parameter, interface_type_parameter, limit_parameter,
    name_parameter, offset_parameter, subnet_id_parameter, COMMAND_AI, COMMAND_CREATE,
    COMMAND_DELETE, COMMAND_GET, COMMAND_LIST, COMMAND_RESIZE, PARAMETER_COUNT,
};
use clap::{Arg, Command};

fn count_parameter() -> Arg {
    Arg::new(PARAMETER_COUNT)
        .long(PARAMETER_COUNT)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(u32))
        .help("Number of GPU nodes")
}

/// Create the ai command with all its subcommands.
pub fn ai_command() -> Command {
    Command::new(COMMAND_AI)
        .about("Manage GPU clusters for AI workloads")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List GPU clusters")
                .visible_alias("ls")
                .arg(limit_parameter())
                .arg(offset_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get GPU cluster details")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Create a new GPU cluster")
                .arg(name_parameter().required(true))
                .arg(flavor_parameter().required(true))
                .arg(image_id_parameter().required(true))
                .arg(interface_type_parameter())
                .arg(subnet_id_parameter())
                .arg(count_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete a GPU cluster")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_RESIZE)
                .about("Change the number of GPU nodes")
                .arg(id_parameter())
                .arg(count_parameter().required(true)),
        )
}
