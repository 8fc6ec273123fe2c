//! Configuration actions.

use clap::ArgMatches;

use crate::actions::{output_format, print_formatted, CliActionError};
use crate::commands::params::{
    PARAMETER_ACCESS_TOKEN, PARAMETER_API_KEY, PARAMETER_API_URL, PARAMETER_AUTH_URL,
    PARAMETER_PROJECT, PARAMETER_REFRESH_TOKEN, PARAMETER_REGION,
};
use crate::configuration::Configuration;

pub fn show(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    print_formatted(configuration, &output_format(sub_matches)?)
}

pub fn path() -> Result<(), CliActionError> {
    let path = Configuration::get_default_configuration_file_path()?;
    println!("{}", path.display());
    Ok(())
}

pub fn set(
    configuration: &mut Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    if let Some(api_url) = sub_matches.get_one::<String>(PARAMETER_API_URL) {
        configuration.set_api_url(api_url);
    }
    if let Some(auth_url) = sub_matches.get_one::<String>(PARAMETER_AUTH_URL) {
        configuration.set_auth_url(auth_url);
    }
    if let Some(project) = sub_matches.get_one::<u64>(PARAMETER_PROJECT) {
        configuration.set_project(*project);
    }
    if let Some(region) = sub_matches.get_one::<u64>(PARAMETER_REGION) {
        configuration.set_region(*region);
    }
    if let Some(key) = sub_matches.get_one::<String>(PARAMETER_API_KEY) {
        configuration.set_api_key(key);
    }
    if let (Some(access), Some(refresh)) = (
        sub_matches.get_one::<String>(PARAMETER_ACCESS_TOKEN),
        sub_matches.get_one::<String>(PARAMETER_REFRESH_TOKEN),
    ) {
        configuration.set_tokens(access, refresh);
    }
    configuration.save_to_default()?;
    Ok(())
}
