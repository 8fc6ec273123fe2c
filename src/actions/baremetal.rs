//! Bare metal server actions.

use clap::ArgMatches;
use uuid::Uuid;

use crate::actions::instances::interfaces_from_flags;
use crate::actions::{handle_task_results, output_format, print_formatted, CliActionError};
use crate::client::ProviderClient;
use crate::commands::params::{
    PARAMETER_FLAVOR, PARAMETER_ID, PARAMETER_IMAGE_ID, PARAMETER_LIMIT, PARAMETER_NAME,
    PARAMETER_OFFSET, PARAMETER_PASSWORD, PARAMETER_SNAPSHOT_ID, PARAMETER_SOURCE,
    PARAMETER_SSH_KEY, PARAMETER_STATUS,
};
use crate::resources::baremetal::{
    BaremetalCreateOptions, BaremetalListOptions, BaremetalRebuildOptions, BaremetalService,
};
use crate::validation::Validator;

fn required_id(sub_matches: &ArgMatches) -> Result<Uuid, CliActionError> {
    sub_matches
        .get_one::<Uuid>(PARAMETER_ID)
        .copied()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_ID.to_string()))
}

pub async fn list(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let opts = BaremetalListOptions {
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        status: sub_matches.get_one::<String>(PARAMETER_STATUS).cloned(),
        limit: sub_matches.get_one::<u32>(PARAMETER_LIMIT).copied(),
        offset: sub_matches.get_one::<u32>(PARAMETER_OFFSET).copied(),
    };
    let servers = BaremetalService::new(client, validator).list(&opts).await?;
    print_formatted(&servers, &output_format(sub_matches)?)
}

pub async fn get(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let server = BaremetalService::new(client, validator).get(&id).await?;
    print_formatted(&server, &output_format(sub_matches)?)
}

pub async fn create(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let opts = BaremetalCreateOptions {
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        flavor: sub_matches.get_one::<String>(PARAMETER_FLAVOR).cloned(),
        source: sub_matches.get_one::<String>(PARAMETER_SOURCE).cloned(),
        image_id: sub_matches.get_one::<Uuid>(PARAMETER_IMAGE_ID).copied(),
        snapshot_id: sub_matches.get_one::<Uuid>(PARAMETER_SNAPSHOT_ID).copied(),
        password: sub_matches.get_one::<String>(PARAMETER_PASSWORD).cloned(),
        ssh_key_name: sub_matches.get_one::<String>(PARAMETER_SSH_KEY).cloned(),
        interfaces: interfaces_from_flags(sub_matches),
    };
    let results = BaremetalService::new(client, validator).create(&opts).await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn rebuild(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let opts = BaremetalRebuildOptions {
        image_id: sub_matches.get_one::<Uuid>(PARAMETER_IMAGE_ID).copied(),
    };
    let results = BaremetalService::new(client, validator)
        .rebuild(&id, &opts)
        .await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn list_flavors(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let flavors = BaremetalService::new(client, validator).list_flavors().await?;
    print_formatted(&flavors, &output_format(sub_matches)?)
}
