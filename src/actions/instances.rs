//! Compute instance actions.

use clap::ArgMatches;
use tracing::trace;
use uuid::Uuid;

use crate::actions::{
    confirm_deletion, handle_task_results, output_format, print_formatted, CliActionError,
};
use crate::client::ProviderClient;
use crate::commands::params::{
    PARAMETER_FLAVOR, PARAMETER_ID, PARAMETER_IMAGE_ID, PARAMETER_INTERFACE_TYPE, PARAMETER_LIMIT,
    PARAMETER_NAME, PARAMETER_OFFSET, PARAMETER_PASSWORD, PARAMETER_SNAPSHOT_ID, PARAMETER_SOURCE,
    PARAMETER_SSH_KEY, PARAMETER_STATUS, PARAMETER_SUBNET_ID, PARAMETER_VOLUME_ID,
};
use crate::resources::instances::{
    InstanceCreateOptions, InstanceListOptions, InstanceResizeOptions, InstancesService,
    InterfaceOptions,
};
use crate::validation::Validator;

fn required_id(sub_matches: &ArgMatches) -> Result<Uuid, CliActionError> {
    sub_matches
        .get_one::<Uuid>(PARAMETER_ID)
        .copied()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_ID.to_string()))
}

/// Build the interface list shared by create-style commands.
pub(crate) fn interfaces_from_flags(sub_matches: &ArgMatches) -> Vec<InterfaceOptions> {
    vec![InterfaceOptions {
        interface_type: sub_matches
            .get_one::<String>(PARAMETER_INTERFACE_TYPE)
            .cloned()
            .unwrap_or_else(|| "external".to_string()),
        subnet_id: sub_matches.get_one::<Uuid>(PARAMETER_SUBNET_ID).copied(),
    }]
}

pub async fn list(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("executing 'instance list'");
    let opts = InstanceListOptions {
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        status: sub_matches.get_one::<String>(PARAMETER_STATUS).cloned(),
        flavor: sub_matches.get_one::<String>(PARAMETER_FLAVOR).cloned(),
        limit: sub_matches.get_one::<u32>(PARAMETER_LIMIT).copied(),
        offset: sub_matches.get_one::<u32>(PARAMETER_OFFSET).copied(),
    };
    let instances = InstancesService::new(client, validator).list(&opts).await?;
    print_formatted(&instances, &output_format(sub_matches)?)
}

pub async fn get(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let instance = InstancesService::new(client, validator).get(&id).await?;
    print_formatted(&instance, &output_format(sub_matches)?)
}

pub async fn create(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let opts = InstanceCreateOptions {
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        flavor: sub_matches.get_one::<String>(PARAMETER_FLAVOR).cloned(),
        source: sub_matches.get_one::<String>(PARAMETER_SOURCE).cloned(),
        image_id: sub_matches.get_one::<Uuid>(PARAMETER_IMAGE_ID).copied(),
        snapshot_id: sub_matches.get_one::<Uuid>(PARAMETER_SNAPSHOT_ID).copied(),
        volume_id: sub_matches.get_one::<Uuid>(PARAMETER_VOLUME_ID).copied(),
        password: sub_matches.get_one::<String>(PARAMETER_PASSWORD).cloned(),
        ssh_key_name: sub_matches.get_one::<String>(PARAMETER_SSH_KEY).cloned(),
        interfaces: interfaces_from_flags(sub_matches),
    };
    let results = InstancesService::new(client, validator).create(&opts).await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn delete(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let service = InstancesService::new(client, validator);
    let resource_url = service.instance_url(&id)?;
    let results = service.delete(&id).await?;
    handle_task_results(client, &results, sub_matches).await?;
    confirm_deletion(client, resource_url, sub_matches).await
}

pub async fn resize(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let opts = InstanceResizeOptions {
        flavor: sub_matches.get_one::<String>(PARAMETER_FLAVOR).cloned(),
    };
    let results = InstancesService::new(client, validator).resize(&id, &opts).await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn start(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let instance = InstancesService::new(client, validator).start(&id).await?;
    print_formatted(&instance, &output_format(sub_matches)?)
}

pub async fn stop(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let instance = InstancesService::new(client, validator).stop(&id).await?;
    print_formatted(&instance, &output_format(sub_matches)?)
}

pub async fn list_interfaces(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let interfaces = InstancesService::new(client, validator)
        .list_interfaces(&id)
        .await?;
    print_formatted(&interfaces, &output_format(sub_matches)?)
}

pub async fn console(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let console = InstancesService::new(client, validator)
        .remote_console(&id)
        .await?;
    println!("{}", serde_json::to_string_pretty(&console)?);
    Ok(())
}
