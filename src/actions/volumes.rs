//! Block storage volume actions.

use clap::ArgMatches;
use tracing::trace;
use uuid::Uuid;

use crate::actions::{
    confirm_deletion, handle_task_results, output_format, print_formatted, CliActionError,
};
use crate::client::ProviderClient;
use crate::commands::params::{
    PARAMETER_ID, PARAMETER_IMAGE_ID, PARAMETER_INSTANCE_ID, PARAMETER_LIMIT, PARAMETER_NAME,
    PARAMETER_OFFSET, PARAMETER_SIZE, PARAMETER_SNAPSHOT_ID, PARAMETER_SOURCE,
    PARAMETER_VOLUME_TYPE,
};
use crate::resources::volumes::{
    VolumeAttachOptions, VolumeCreateOptions, VolumeExtendOptions, VolumeListOptions,
    VolumeRetypeOptions, VolumesService,
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
    trace!("executing 'volume list'");
    let opts = VolumeListOptions {
        instance_id: sub_matches.get_one::<Uuid>(PARAMETER_INSTANCE_ID).copied(),
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        limit: sub_matches.get_one::<u32>(PARAMETER_LIMIT).copied(),
        offset: sub_matches.get_one::<u32>(PARAMETER_OFFSET).copied(),
    };
    let volumes = VolumesService::new(client, validator).list(&opts).await?;
    print_formatted(&volumes, &output_format(sub_matches)?)
}

pub async fn get(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let volume = VolumesService::new(client, validator).get(&id).await?;
    print_formatted(&volume, &output_format(sub_matches)?)
}

pub async fn create(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let opts = VolumeCreateOptions {
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        source: sub_matches.get_one::<String>(PARAMETER_SOURCE).cloned(),
        size: sub_matches.get_one::<u64>(PARAMETER_SIZE).copied(),
        image_id: sub_matches.get_one::<Uuid>(PARAMETER_IMAGE_ID).copied(),
        snapshot_id: sub_matches.get_one::<Uuid>(PARAMETER_SNAPSHOT_ID).copied(),
        volume_type: sub_matches.get_one::<String>(PARAMETER_VOLUME_TYPE).cloned(),
    };
    let results = VolumesService::new(client, validator).create(&opts).await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn delete(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let service = VolumesService::new(client, validator);
    let resource_url = service.volume_url(&id)?;
    let results = service.delete(&id).await?;
    handle_task_results(client, &results, sub_matches).await?;
    confirm_deletion(client, resource_url, sub_matches).await
}

pub async fn attach(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let instance_id = sub_matches
        .get_one::<Uuid>(PARAMETER_INSTANCE_ID)
        .copied()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_INSTANCE_ID.to_string()))?;
    let volume = VolumesService::new(client, validator)
        .attach(&id, &VolumeAttachOptions { instance_id })
        .await?;
    print_formatted(&volume, &output_format(sub_matches)?)
}

pub async fn detach(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let volume = VolumesService::new(client, validator).detach(&id).await?;
    print_formatted(&volume, &output_format(sub_matches)?)
}

pub async fn extend(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let size = sub_matches
        .get_one::<u64>(PARAMETER_SIZE)
        .copied()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_SIZE.to_string()))?;
    let results = VolumesService::new(client, validator)
        .extend(&id, &VolumeExtendOptions { size })
        .await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn retype(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let opts = VolumeRetypeOptions {
        volume_type: sub_matches.get_one::<String>(PARAMETER_VOLUME_TYPE).cloned(),
    };
    let volume = VolumesService::new(client, validator).retype(&id, &opts).await?;
    print_formatted(&volume, &output_format(sub_matches)?)
}
