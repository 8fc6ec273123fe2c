//! Provider task actions.

use clap::ArgMatches;

use crate::actions::{output_format, print_formatted, CliActionError};
use crate::client::ProviderClient;
use crate::commands::params::PARAMETER_TASK_ID;
use crate::resources::tasks::TasksService;

fn required_task_id(sub_matches: &ArgMatches) -> Result<String, CliActionError> {
    sub_matches
        .get_one::<String>(PARAMETER_TASK_ID)
        .cloned()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_TASK_ID.to_string()))
}

pub async fn get(client: &ProviderClient, sub_matches: &ArgMatches) -> Result<(), CliActionError> {
    let task_id = required_task_id(sub_matches)?;
    let task = TasksService::new(client).get(&task_id).await?;
    print_formatted(&task, &output_format(sub_matches)?)
}

pub async fn list_active(
    client: &ProviderClient,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let tasks = TasksService::new(client).list_active().await?;
    print_formatted(&tasks, &output_format(sub_matches)?)
}

pub async fn wait(client: &ProviderClient, sub_matches: &ArgMatches) -> Result<(), CliActionError> {
    let task_id = required_task_id(sub_matches)?;
    let task = TasksService::new(client).wait_for_task(&task_id).await?;
    print_formatted(&task, &output_format(sub_matches)?)
}
