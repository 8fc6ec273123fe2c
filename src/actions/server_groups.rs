//! Server placement group actions.

use clap::ArgMatches;
use uuid::Uuid;

use crate::actions::{output_format, print_formatted, CliActionError};
use crate::client::ProviderClient;
use crate::commands::params::{
    PARAMETER_ID, PARAMETER_LIMIT, PARAMETER_NAME, PARAMETER_OFFSET, PARAMETER_POLICY,
};
use crate::resources::server_groups::{
    ServerGroupCreateOptions, ServerGroupListOptions, ServerGroupsService,
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
    let opts = ServerGroupListOptions {
        limit: sub_matches.get_one::<u32>(PARAMETER_LIMIT).copied(),
        offset: sub_matches.get_one::<u32>(PARAMETER_OFFSET).copied(),
    };
    let groups = ServerGroupsService::new(client, validator).list(&opts).await?;
    print_formatted(&groups, &output_format(sub_matches)?)
}

pub async fn get(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let group = ServerGroupsService::new(client, validator).get(&id).await?;
    print_formatted(&group, &output_format(sub_matches)?)
}

pub async fn create(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let opts = ServerGroupCreateOptions {
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        policy: sub_matches.get_one::<String>(PARAMETER_POLICY).cloned(),
    };
    let group = ServerGroupsService::new(client, validator).create(&opts).await?;
    print_formatted(&group, &output_format(sub_matches)?)
}

pub async fn delete(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    ServerGroupsService::new(client, validator).delete(&id).await?;
    Ok(())
}
