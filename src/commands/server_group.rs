//! Server placement group command definitions.

use crate::commands::params::{
    id_parameter, limit_parameter, name_parameter, offset_parameter, COMMAND_CREATE,
    COMMAND_DELETE, COMMAND_GET, COMMAND_LIST, COMMAND_SERVER_GROUP, PARAMETER_POLICY,
};
use crate::resources::server_groups::POLICY_VALUES;
use clap::{Arg, Command};

/// Create the server-group command with all its subcommands.
pub fn server_group_command() -> Command {
    Command::new(COMMAND_SERVER_GROUP)
        .about("Manage server placement groups")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List server groups")
                .visible_alias("ls")
                .arg(limit_parameter())
                .arg(offset_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get server group details")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Create a new server group")
                .arg(name_parameter().required(true))
                .arg(
                    Arg::new(PARAMETER_POLICY)
                        .long(PARAMETER_POLICY)
                        .num_args(1)
                        .required(true)
                        .value_parser(POLICY_VALUES.to_vec())
                        .help("Placement policy"),
                ),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete a server group")
                .arg(id_parameter()),
        )
}
