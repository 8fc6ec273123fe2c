//! CLI action implementations.
//!
//! Each resource has a module translating parsed flags into option structs,
//! calling the resource services and printing formatted results. Shared
//! plumbing for format resolution, client construction and task waiting
//! lives here.

use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthClient;
use crate::client::{Credentials, ProviderClient};
use crate::commands::params::{PARAMETER_FORMAT, PARAMETER_HEADERS, PARAMETER_PRETTY, PARAMETER_WAIT};
use crate::configuration::Configuration;
use crate::error::ApiError;
use crate::exit_codes::NimbusExitCode;
use crate::format::{Formattable, OutputFormat, OutputFormatOptions};
use crate::resources::tasks::{TaskResults, TasksService, DEFAULT_POLL_INTERVAL};

pub mod ai_clusters;
pub mod baremetal;
pub mod config;
pub mod instances;
pub mod k8s;
pub mod server_groups;
pub mod tasks;
pub mod volumes;

#[derive(Debug, Error)]
pub enum CliActionError {
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    ApiError(#[from] crate::error::ApiError),

    #[error("{0}")]
    AuthError(#[from] crate::auth::AuthError),

    #[error("{0}")]
    ConfigurationError(#[from] crate::configuration::ConfigurationError),

    #[error("{0}")]
    FormattingError(#[from] crate::format::FormattingError),

    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CliActionError {
    /// Map the failure to the process exit code taxonomy.
    pub fn exit_code(&self) -> NimbusExitCode {
        match self {
            CliActionError::ApiError(err) => api_exit_code(err),
            CliActionError::AuthError(_) => NimbusExitCode::AuthError,
            CliActionError::ConfigurationError(_) => NimbusExitCode::ConfigError,
            CliActionError::JsonError(_) | CliActionError::FormattingError(_) => {
                NimbusExitCode::DataError
            }
            CliActionError::MissingRequiredArgument(_) => NimbusExitCode::UsageError,
            CliActionError::IoError(_) => NimbusExitCode::SoftwareError,
        }
    }
}

fn api_exit_code(err: &ApiError) -> NimbusExitCode {
    if err.is_not_found() {
        return NimbusExitCode::NotFound;
    }
    match err {
        ApiError::Transport(_) => NimbusExitCode::NetworkError,
        ApiError::ReauthFailed { .. } => NimbusExitCode::AuthError,
        ApiError::AfterReauth { source } => api_exit_code(source),
        ApiError::Validation(_) => NimbusExitCode::UsageError,
        ApiError::TaskFailed { .. } | ApiError::TaskMissingResource { .. } => {
            NimbusExitCode::TaskError
        }
        _ => match err.status() {
            Some(401) | Some(403) => NimbusExitCode::AuthError,
            Some(status) if status >= 500 => NimbusExitCode::TempFail,
            _ => NimbusExitCode::ApiError,
        },
    }
}

/// Resolve the output format from the global format flags.
pub fn output_format(matches: &ArgMatches) -> Result<OutputFormat, CliActionError> {
    let format_str = matches
        .get_one::<String>(PARAMETER_FORMAT)
        .cloned()
        .unwrap_or_else(|| "json".to_string());
    let options = OutputFormatOptions {
        with_headers: matches.get_flag(PARAMETER_HEADERS),
        pretty: matches.get_flag(PARAMETER_PRETTY),
    };
    let format = OutputFormat::from_string_with_options(&format_str, options)?;
    Ok(format)
}

/// Build the provider client from the configuration. Token credentials get
/// a refresh handler wired to the auth service; API keys are permanent and
/// get none.
pub fn provider_client(
    configuration: &Configuration,
    debug_requests: bool,
) -> Result<ProviderClient, CliActionError> {
    let credentials = configuration.credentials()?;
    let mut builder = ProviderClient::builder()
        .endpoint(configuration.api_url())
        .project(configuration.project()?)
        .region(configuration.region()?)
        .debug(debug_requests);
    if matches!(credentials, Credentials::Token { .. }) {
        let auth = AuthClient::new(configuration.auth_url());
        builder = builder.reauth_handler(auth.into_reauth_handler());
    }
    let client = builder.credentials(credentials).build()?;
    Ok(client)
}

/// Print a formatted value to stdout.
pub fn print_formatted<T: Formattable>(
    value: &T,
    format: &OutputFormat,
) -> Result<(), CliActionError> {
    println!("{}", value.format(format)?);
    Ok(())
}

/// Report scheduled tasks and, when `--wait` was given, poll each one to
/// completion behind a spinner.
pub async fn handle_task_results(
    client: &ProviderClient,
    results: &TaskResults,
    matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let format = output_format(matches)?;
    if !matches.get_flag(PARAMETER_WAIT) {
        print_formatted(results, &format)?;
        return Ok(());
    }

    let service = TasksService::new(client);
    for task_id in &results.tasks {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        spinner.set_message(format!("Waiting for task {}...", task_id));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let task = service.wait_for_task(task_id).await;
        spinner.finish_and_clear();
        let task = task?;
        debug!("task {} finished in state {}", task.id, task.state);
        print_formatted(&task, &format)?;
    }
    Ok(())
}

/// With `--wait`, poll the resource URL after a delete until it answers 404.
pub async fn confirm_deletion(
    client: &ProviderClient,
    resource_url: url::Url,
    matches: &ArgMatches,
) -> Result<(), CliActionError> {
    if !matches.get_flag(PARAMETER_WAIT) {
        return Ok(());
    }
    TasksService::new(client)
        .confirm_deleted(resource_url, Duration::from_secs(DEFAULT_POLL_INTERVAL))
        .await?;
    Ok(())
}
