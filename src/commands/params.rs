//! Shared command parameters for all CLI commands.
//!
//! This module defines common parameters that are used across multiple command modules.
//! It provides a centralized place to define parameter names and common argument configurations.

use crate::format::OutputFormat;
use clap::{Arg, ArgAction};
use uuid::Uuid;

// CRUD operations
pub const COMMAND_CREATE: &str = "create";
pub const COMMAND_GET: &str = "get";
pub const COMMAND_LIST: &str = "list";
pub const COMMAND_DELETE: &str = "delete";

// Resource commands
pub const COMMAND_INSTANCE: &str = "instance";
pub const COMMAND_VOLUME: &str = "volume";
pub const COMMAND_AI: &str = "ai";
pub const COMMAND_BAREMETAL: &str = "baremetal";
pub const COMMAND_K8S: &str = "k8s";
pub const COMMAND_SERVER_GROUP: &str = "server-group";
pub const COMMAND_TASK: &str = "task";

// Resource actions
pub const COMMAND_RESIZE: &str = "resize";
pub const COMMAND_START: &str = "start";
pub const COMMAND_STOP: &str = "stop";
pub const COMMAND_INTERFACES: &str = "interfaces";
pub const COMMAND_CONSOLE: &str = "console";
pub const COMMAND_ATTACH: &str = "attach";
pub const COMMAND_DETACH: &str = "detach";
pub const COMMAND_EXTEND: &str = "extend";
pub const COMMAND_RETYPE: &str = "retype";
pub const COMMAND_REBUILD: &str = "rebuild";
pub const COMMAND_FLAVORS: &str = "flavors";
pub const COMMAND_POOLS: &str = "pools";
pub const COMMAND_POOL_RESIZE: &str = "pool-resize";
pub const COMMAND_KUBECONFIG: &str = "kubeconfig";
pub const COMMAND_CERTIFICATES: &str = "certificates";

// Task commands
pub const COMMAND_ACTIVE: &str = "active";
pub const COMMAND_WAIT: &str = "wait";

// Config commands
pub const COMMAND_CONFIG: &str = "config";
pub const COMMAND_SHOW: &str = "show";
pub const COMMAND_PATH: &str = "path";
pub const COMMAND_SET: &str = "set";

// Global parameter names
pub const PARAMETER_FORMAT: &str = "format";
pub const PARAMETER_PRETTY: &str = "pretty";
pub const PARAMETER_HEADERS: &str = "headers";
pub const PARAMETER_WAIT: &str = "wait";
pub const PARAMETER_DEBUG: &str = "debug";

// Parameter names
pub const PARAMETER_ID: &str = "id";
pub const PARAMETER_NAME: &str = "name";
pub const PARAMETER_STATUS: &str = "status";
pub const PARAMETER_FLAVOR: &str = "flavor";
pub const PARAMETER_SOURCE: &str = "source";
pub const PARAMETER_IMAGE_ID: &str = "image-id";
pub const PARAMETER_SNAPSHOT_ID: &str = "snapshot-id";
pub const PARAMETER_VOLUME_ID: &str = "volume-id";
pub const PARAMETER_INSTANCE_ID: &str = "instance-id";
pub const PARAMETER_PASSWORD: &str = "password";
pub const PARAMETER_SSH_KEY: &str = "ssh-key";
pub const PARAMETER_INTERFACE_TYPE: &str = "interface-type";
pub const PARAMETER_SUBNET_ID: &str = "subnet-id";
pub const PARAMETER_SIZE: &str = "size";
pub const PARAMETER_VOLUME_TYPE: &str = "type";
pub const PARAMETER_COUNT: &str = "count";
pub const PARAMETER_LIMIT: &str = "limit";
pub const PARAMETER_OFFSET: &str = "offset";
pub const PARAMETER_POLICY: &str = "policy";
pub const PARAMETER_VERSION: &str = "version";
pub const PARAMETER_FIXED_NETWORK: &str = "fixed-network";
pub const PARAMETER_FIXED_SUBNET: &str = "fixed-subnet";
pub const PARAMETER_POOL_ID: &str = "pool-id";
pub const PARAMETER_POOL_NAME: &str = "pool-name";
pub const PARAMETER_POOL_FLAVOR: &str = "pool-flavor";
pub const PARAMETER_NODE_COUNT: &str = "node-count";
pub const PARAMETER_MIN_NODES: &str = "min-nodes";
pub const PARAMETER_MAX_NODES: &str = "max-nodes";
pub const PARAMETER_CSR: &str = "csr";
pub const PARAMETER_TASK_ID: &str = "task-id";

// Config parameter names
pub const PARAMETER_API_URL: &str = "api-url";
pub const PARAMETER_AUTH_URL: &str = "auth-url";
pub const PARAMETER_PROJECT: &str = "project";
pub const PARAMETER_REGION: &str = "region";
pub const PARAMETER_API_KEY: &str = "api-key";
pub const PARAMETER_ACCESS_TOKEN: &str = "access-token";
pub const PARAMETER_REFRESH_TOKEN: &str = "refresh-token";

/// Create the global format parameter.
///
/// This parameter is used across all commands for output formatting.
pub fn format_parameter() -> Arg {
    Arg::new(PARAMETER_FORMAT)
        .short('f')
        .long(PARAMETER_FORMAT)
        .num_args(1)
        .required(false)
        .env("NIMBUSCLI_FORMAT")
        .default_value("json")
        .global(true)
        .help("Output data format")
        .value_parser(OutputFormat::names())
}

pub fn format_pretty_parameter() -> Arg {
    Arg::new(PARAMETER_PRETTY)
        .long(PARAMETER_PRETTY)
        .action(ArgAction::SetTrue)
        .required(false)
        .global(true)
        .help("Format the output pretty")
}

pub fn format_with_headers_parameter() -> Arg {
    Arg::new(PARAMETER_HEADERS)
        .long(PARAMETER_HEADERS)
        .action(ArgAction::SetTrue)
        .required(false)
        .env("NIMBUSCLI_HEADERS")
        .global(true)
        .help("Format the output with headers")
}

/// Create the global task-wait flag.
pub fn wait_parameter() -> Arg {
    Arg::new(PARAMETER_WAIT)
        .short('w')
        .long(PARAMETER_WAIT)
        .action(ArgAction::SetTrue)
        .required(false)
        .global(true)
        .help("Wait for the scheduled task to finish before returning")
}

/// Create the global debug flag.
pub fn debug_parameter() -> Arg {
    Arg::new(PARAMETER_DEBUG)
        .short('d')
        .long(PARAMETER_DEBUG)
        .action(ArgAction::SetTrue)
        .required(false)
        .global(true)
        .help("Log requests and responses for debugging")
}

/// Create the resource ID parameter.
pub fn id_parameter() -> Arg {
    Arg::new(PARAMETER_ID)
        .short('i')
        .long(PARAMETER_ID)
        .num_args(1)
        .required(true)
        .value_parser(clap::value_parser!(Uuid))
        .help("Resource UUID")
}

/// Create the resource name parameter.
pub fn name_parameter() -> Arg {
    Arg::new(PARAMETER_NAME)
        .short('n')
        .long(PARAMETER_NAME)
        .num_args(1)
        .required(false)
        .help("Resource name")
}

pub fn flavor_parameter() -> Arg {
    Arg::new(PARAMETER_FLAVOR)
        .long(PARAMETER_FLAVOR)
        .num_args(1)
        .required(false)
        .help("Flavor name")
}

pub fn image_id_parameter() -> Arg {
    Arg::new(PARAMETER_IMAGE_ID)
        .long(PARAMETER_IMAGE_ID)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(Uuid))
        .help("Image UUID")
}

pub fn snapshot_id_parameter() -> Arg {
    Arg::new(PARAMETER_SNAPSHOT_ID)
        .long(PARAMETER_SNAPSHOT_ID)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(Uuid))
        .help("Snapshot UUID")
}

pub fn instance_id_parameter() -> Arg {
    Arg::new(PARAMETER_INSTANCE_ID)
        .long(PARAMETER_INSTANCE_ID)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(Uuid))
        .help("Instance UUID")
}

pub fn subnet_id_parameter() -> Arg {
    Arg::new(PARAMETER_SUBNET_ID)
        .long(PARAMETER_SUBNET_ID)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(Uuid))
        .help("Subnet UUID for the network interface")
}

pub fn interface_type_parameter() -> Arg {
    Arg::new(PARAMETER_INTERFACE_TYPE)
        .long(PARAMETER_INTERFACE_TYPE)
        .num_args(1)
        .required(false)
        .default_value("external")
        .value_parser(["external", "subnet", "any_subnet"])
        .help("Network interface type")
}

pub fn limit_parameter() -> Arg {
    Arg::new(PARAMETER_LIMIT)
        .long(PARAMETER_LIMIT)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(u32))
        .help("Maximum number of records per page")
}

pub fn offset_parameter() -> Arg {
    Arg::new(PARAMETER_OFFSET)
        .long(PARAMETER_OFFSET)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(u32))
        .help("Number of records to skip")
}
