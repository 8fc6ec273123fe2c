//! Dispatch parsed command-line matches to the action implementations.

use clap::ArgMatches;

use crate::actions::{self, provider_client, CliActionError};
use crate::client::ProviderClient;
use crate::commands::params::{
    COMMAND_ACTIVE, COMMAND_AI, COMMAND_ATTACH, COMMAND_BAREMETAL, COMMAND_CERTIFICATES,
    COMMAND_CONFIG, COMMAND_CONSOLE, COMMAND_CREATE, COMMAND_DELETE, COMMAND_DETACH,
    COMMAND_EXTEND, COMMAND_FLAVORS, COMMAND_GET, COMMAND_INSTANCE, COMMAND_INTERFACES,
    COMMAND_K8S, COMMAND_KUBECONFIG, COMMAND_LIST, COMMAND_PATH, COMMAND_POOLS,
    COMMAND_POOL_RESIZE, COMMAND_REBUILD, COMMAND_RESIZE, COMMAND_RETYPE, COMMAND_SERVER_GROUP,
    COMMAND_SET, COMMAND_SHOW, COMMAND_START, COMMAND_STOP, COMMAND_TASK, COMMAND_VOLUME,
    COMMAND_WAIT, PARAMETER_DEBUG,
};
use crate::commands::create_cli_commands;
use crate::configuration::Configuration;
use crate::validation::Validator;

fn unsupported(sub_matches: &ArgMatches) -> CliActionError {
    let name = match sub_matches.subcommand() {
        Some((name, _)) => name,
        None => "unknown",
    };
    CliActionError::MissingRequiredArgument(format!("subcommand: {}", name))
}

/// Parse the process arguments and run the matching action.
pub async fn execute_command(mut configuration: Configuration) -> Result<(), CliActionError> {
    let matches = create_cli_commands();

    // Configuration commands work without credentials or scope.
    if let Some((COMMAND_CONFIG, sub_matches)) = matches.subcommand() {
        return match sub_matches.subcommand() {
            Some((COMMAND_SHOW, action_matches)) => {
                actions::config::show(&configuration, action_matches)
            }
            Some((COMMAND_PATH, _)) => actions::config::path(),
            Some((COMMAND_SET, action_matches)) => {
                actions::config::set(&mut configuration, action_matches)
            }
            _ => Err(unsupported(sub_matches)),
        };
    }

    let debug = matches.get_flag(PARAMETER_DEBUG);
    let client = provider_client(&configuration, debug)?;
    let validator = Validator::new();

    match matches.subcommand() {
        Some((COMMAND_INSTANCE, sub_matches)) => {
            dispatch_instance(&client, &validator, sub_matches).await
        }
        Some((COMMAND_VOLUME, sub_matches)) => {
            dispatch_volume(&client, &validator, sub_matches).await
        }
        Some((COMMAND_AI, sub_matches)) => dispatch_ai(&client, &validator, sub_matches).await,
        Some((COMMAND_BAREMETAL, sub_matches)) => {
            dispatch_baremetal(&client, &validator, sub_matches).await
        }
        Some((COMMAND_K8S, sub_matches)) => dispatch_k8s(&client, &validator, sub_matches).await,
        Some((COMMAND_SERVER_GROUP, sub_matches)) => {
            dispatch_server_group(&client, &validator, sub_matches).await
        }
        Some((COMMAND_TASK, sub_matches)) => dispatch_task(&client, sub_matches).await,
        _ => Err(unsupported(&matches)),
    }
}

async fn dispatch_instance(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_LIST, m)) => actions::instances::list(client, validator, m).await,
        Some((COMMAND_GET, m)) => actions::instances::get(client, validator, m).await,
        Some((COMMAND_CREATE, m)) => actions::instances::create(client, validator, m).await,
        Some((COMMAND_DELETE, m)) => actions::instances::delete(client, validator, m).await,
        Some((COMMAND_RESIZE, m)) => actions::instances::resize(client, validator, m).await,
        Some((COMMAND_START, m)) => actions::instances::start(client, validator, m).await,
        Some((COMMAND_STOP, m)) => actions::instances::stop(client, validator, m).await,
        Some((COMMAND_INTERFACES, m)) => {
            actions::instances::list_interfaces(client, validator, m).await
        }
        Some((COMMAND_CONSOLE, m)) => actions::instances::console(client, validator, m).await,
        _ => Err(unsupported(sub_matches)),
    }
}

async fn dispatch_volume(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_LIST, m)) => actions::volumes::list(client, validator, m).await,
        Some((COMMAND_GET, m)) => actions::volumes::get(client, validator, m).await,
        Some((COMMAND_CREATE, m)) => actions::volumes::create(client, validator, m).await,
        Some((COMMAND_DELETE, m)) => actions::volumes::delete(client, validator, m).await,
        Some((COMMAND_ATTACH, m)) => actions::volumes::attach(client, validator, m).await,
        Some((COMMAND_DETACH, m)) => actions::volumes::detach(client, validator, m).await,
        Some((COMMAND_EXTEND, m)) => actions::volumes::extend(client, validator, m).await,
        Some((COMMAND_RETYPE, m)) => actions::volumes::retype(client, validator, m).await,
        _ => Err(unsupported(sub_matches)),
    }
}

async fn dispatch_ai(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_LIST, m)) => actions::ai_clusters::list(client, validator, m).await,
        Some((COMMAND_GET, m)) => actions::ai_clusters::get(client, validator, m).await,
        Some((COMMAND_CREATE, m)) => actions::ai_clusters::create(client, validator, m).await,
        Some((COMMAND_DELETE, m)) => actions::ai_clusters::delete(client, validator, m).await,
        Some((COMMAND_RESIZE, m)) => actions::ai_clusters::resize(client, validator, m).await,
        _ => Err(unsupported(sub_matches)),
    }
}

async fn dispatch_baremetal(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_LIST, m)) => actions::baremetal::list(client, validator, m).await,
        Some((COMMAND_GET, m)) => actions::baremetal::get(client, validator, m).await,
        Some((COMMAND_CREATE, m)) => actions::baremetal::create(client, validator, m).await,
        Some((COMMAND_REBUILD, m)) => actions::baremetal::rebuild(client, validator, m).await,
        Some((COMMAND_FLAVORS, m)) => actions::baremetal::list_flavors(client, validator, m).await,
        _ => Err(unsupported(sub_matches)),
    }
}

async fn dispatch_k8s(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_LIST, m)) => actions::k8s::list(client, validator, m).await,
        Some((COMMAND_GET, m)) => actions::k8s::get(client, validator, m).await,
        Some((COMMAND_CREATE, m)) => actions::k8s::create(client, validator, m).await,
        Some((COMMAND_DELETE, m)) => actions::k8s::delete(client, validator, m).await,
        Some((COMMAND_POOLS, m)) => actions::k8s::list_pools(client, validator, m).await,
        Some((COMMAND_POOL_RESIZE, m)) => actions::k8s::resize_pool(client, validator, m).await,
        Some((COMMAND_KUBECONFIG, m)) => actions::k8s::kubeconfig(client, validator, m).await,
        Some((COMMAND_CERTIFICATES, m)) => actions::k8s::certificates(client, validator, m).await,
        _ => Err(unsupported(sub_matches)),
    }
}

async fn dispatch_server_group(
    client: &ProviderClient,
    validator: &Validator,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_LIST, m)) => actions::server_groups::list(client, validator, m).await,
        Some((COMMAND_GET, m)) => actions::server_groups::get(client, validator, m).await,
        Some((COMMAND_CREATE, m)) => actions::server_groups::create(client, validator, m).await,
        Some((COMMAND_DELETE, m)) => actions::server_groups::delete(client, validator, m).await,
        _ => Err(unsupported(sub_matches)),
    }
}

async fn dispatch_task(
    client: &ProviderClient,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    match sub_matches.subcommand() {
        Some((COMMAND_GET, m)) => actions::tasks::get(client, m).await,
        Some((COMMAND_ACTIVE, m)) => actions::tasks::list_active(client, m).await,
        Some((COMMAND_WAIT, m)) => actions::tasks::wait(client, m).await,
        _ => Err(unsupported(sub_matches)),
    }
}
