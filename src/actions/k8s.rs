//! Managed Kubernetes actions.

use clap::ArgMatches;
use uuid::Uuid;

use crate::actions::{
    confirm_deletion, handle_task_results, output_format, print_formatted, CliActionError,
};
use crate::client::ProviderClient;
use crate::commands::params::{
    PARAMETER_CSR, PARAMETER_FIXED_NETWORK, PARAMETER_FIXED_SUBNET, PARAMETER_ID, PARAMETER_LIMIT,
    PARAMETER_MAX_NODES, PARAMETER_MIN_NODES, PARAMETER_NAME, PARAMETER_NODE_COUNT,
    PARAMETER_OFFSET, PARAMETER_POOL_FLAVOR, PARAMETER_POOL_ID, PARAMETER_POOL_NAME,
    PARAMETER_VERSION,
};
use crate::resources::k8s::{
    K8sClusterCreateOptions, K8sClusterListOptions, K8sPoolOptions, K8sPoolResizeOptions,
    K8sService,
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
    let opts = K8sClusterListOptions {
        limit: sub_matches.get_one::<u32>(PARAMETER_LIMIT).copied(),
        offset: sub_matches.get_one::<u32>(PARAMETER_OFFSET).copied(),
    };
    let clusters = K8sService::new(client, validator).list(&opts).await?;
    print_formatted(&clusters, &output_format(sub_matches)?)
}

pub async fn get(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let cluster = K8sService::new(client, validator).get(&id).await?;
    print_formatted(&cluster, &output_format(sub_matches)?)
}

pub async fn create(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let pool = K8sPoolOptions {
        name: sub_matches.get_one::<String>(PARAMETER_POOL_NAME).cloned(),
        flavor_id: sub_matches.get_one::<String>(PARAMETER_POOL_FLAVOR).cloned(),
        node_count: sub_matches.get_one::<u32>(PARAMETER_NODE_COUNT).copied(),
        min_node_count: sub_matches.get_one::<u32>(PARAMETER_MIN_NODES).copied(),
        max_node_count: sub_matches.get_one::<u32>(PARAMETER_MAX_NODES).copied(),
    };
    let opts = K8sClusterCreateOptions {
        name: sub_matches.get_one::<String>(PARAMETER_NAME).cloned(),
        version: sub_matches.get_one::<String>(PARAMETER_VERSION).cloned(),
        fixed_network: sub_matches.get_one::<Uuid>(PARAMETER_FIXED_NETWORK).copied(),
        fixed_subnet: sub_matches.get_one::<Uuid>(PARAMETER_FIXED_SUBNET).copied(),
        pools: vec![pool],
    };
    let results = K8sService::new(client, validator).create(&opts).await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn delete(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let service = K8sService::new(client, validator);
    let resource_url = service.cluster_url(&id)?;
    let results = service.delete(&id).await?;
    handle_task_results(client, &results, sub_matches).await?;
    confirm_deletion(client, resource_url, sub_matches).await
}

pub async fn list_pools(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let pools = K8sService::new(client, validator).list_pools(&id).await?;
    print_formatted(&pools, &output_format(sub_matches)?)
}

pub async fn resize_pool(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let pool_id = sub_matches
        .get_one::<Uuid>(PARAMETER_POOL_ID)
        .copied()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_POOL_ID.to_string()))?;
    let opts = K8sPoolResizeOptions {
        node_count: sub_matches.get_one::<u32>(PARAMETER_NODE_COUNT).copied(),
    };
    let results = K8sService::new(client, validator)
        .resize_pool(&id, &pool_id, &opts)
        .await?;
    handle_task_results(client, &results, sub_matches).await
}

pub async fn kubeconfig(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let config = K8sService::new(client, validator).kubeconfig(&id).await?;
    println!("{}", config);
    Ok(())
}

pub async fn certificates(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let id = required_id(sub_matches)?;
    let service = K8sService::new(client, validator);
    let certificate = match sub_matches.get_one::<String>(PARAMETER_CSR) {
        Some(csr) => service.sign_certificate(&id, csr).await?,
        None => service.certificates(&id).await?,
    };
    print_formatted(&certificate, &output_format(sub_matches)?)
}
