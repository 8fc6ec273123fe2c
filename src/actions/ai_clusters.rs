//! GPU cluster actions.

use clap::ArgMatches;
use uuid::Uuid;

use crate::actions::instances::interfaces_from_flags;
use crate::actions::{handle_task_results, output_format, print_formatted, CliActionError};
use crate::client::ProviderClient;
use crate::commands::params::{
    PARAMETER_COUNT, PARAMETER_FLAVOR, PARAMETER_ID, PARAMETER_IMAGE_ID, PARAMETER_LIMIT,
    PARAMETER_NAME, PARAMETER_OFFSET,
};
use crate::resources::ai_clusters::{
    AiClusterCreateOptions, AiClusterListOptions, AiClusterResizeOptions, AiClustersService,
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
    let opts = AiClusterListOptions {
        limit: sub_matches.get_one::<u32>(PARAMETER_LIMIT).copied(),
        offset: sub_matches.get_one::<u32>(PARAMETER_OFFSET).copied(),
    };
    let clusters = AiClustersService::new(client, validator).list(&opts).await?;
    print_formatted(&clusters, &output_format(sub_matches)?)
}

pub async fn get(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let cluster = AiClustersService::new(client, validator).get(&id).await?;
    print_formatted(&cluster, &output_format(sub_matches)?)
}

pub async fn create(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let opts = AiClusterCreateOptions {
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        flavor: sub_matches.get_one::<String>(PARAMETER_FLAVOR).cloned(),
        image_id: sub_matches.get_one::<Uuid>(PARAMETER_IMAGE_ID).copied(),
        interfaces: interfaces_from_flags(sub_matches),
        instances_count: sub_matches.get_one::<u32>(PARAMETER_COUNT).copied(),
    };
    let results = AiClustersService::new(client, validator).create(&opts).await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn delete(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let results = AiClustersService::new(client, validator).delete(&id).await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn resize(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let opts = AiClusterResizeOptions {
        instances_count: sub_matches.get_one::<u32>(PARAMETER_COUNT).copied(),
    };
    let results = AiClustersService::new(client, validator)
        .resize(&id, &opts)
        .await?;
    handle_task_results(client, &results, sub_matches).await
}
