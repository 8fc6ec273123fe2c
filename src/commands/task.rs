//! Provider task command definitions.

use crate::commands::params::{
    COMMAND_ACTIVE, COMMAND_GET, COMMAND_TASK, COMMAND_WAIT, PARAMETER_TASK_ID,
};
use clap::{Arg, Command};

fn task_id_parameter() -> Arg {
    Arg::new(PARAMETER_TASK_ID)
        .long(PARAMETER_TASK_ID)
        .num_args(1)
        .required(true)
        .help("Task identifier")
}

/// Create the task command with all its subcommands.
pub fn task_command() -> Command {
    Command::new(COMMAND_TASK)
        .about("Inspect asynchronous provider tasks")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get task details")
                .arg(task_id_parameter()),
        )
        .subcommand(Command::new(COMMAND_ACTIVE).about("List active tasks"))
        .subcommand(
            Command::new(COMMAND_WAIT)
                .about("Block until a task reaches a terminal state")
                .arg(task_id_parameter()),
        )
}
