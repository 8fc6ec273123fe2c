//! Managed Kubernetes command definitions.

use crate::commands::params::{
    id_parameter, limit_parameter, name_parameter, offset_parameter, COMMAND_CERTIFICATES,
    COMMAND_CREATE, COMMAND_DELETE, COMMAND_GET, COMMAND_K8S, COMMAND_KUBECONFIG, COMMAND_LIST,
    COMMAND_POOLS, COMMAND_POOL_RESIZE, PARAMETER_CSR, PARAMETER_FIXED_NETWORK,
    PARAMETER_FIXED_SUBNET, PARAMETER_MAX_NODES, PARAMETER_MIN_NODES, PARAMETER_NODE_COUNT,
    PARAMETER_POOL_FLAVOR, PARAMETER_POOL_ID, PARAMETER_POOL_NAME, PARAMETER_VERSION,
};
use clap::{Arg, Command};
use uuid::Uuid;

fn node_count_parameter() -> Arg {
    Arg::new(PARAMETER_NODE_COUNT)
        .long(PARAMETER_NODE_COUNT)
        .num_args(1)
        .required(false)
        .value_parser(clap::value_parser!(u32))
        .help("Number of worker nodes")
}

/// Create the k8s command with all its subcommands.
pub fn k8s_command() -> Command {
    Command::new(COMMAND_K8S)
        .about("Manage Kubernetes clusters")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_LIST)
                .about("List Kubernetes clusters")
                .visible_alias("ls")
                .arg(limit_parameter())
                .arg(offset_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get cluster details")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CREATE)
                .about("Create a new Kubernetes cluster")
                .arg(name_parameter().required(true))
                .arg(
                    Arg::new(PARAMETER_VERSION)
                        .long(PARAMETER_VERSION)
                        .num_args(1)
                        .required(true)
                        .help("Kubernetes version"),
                )
                .arg(
                    Arg::new(PARAMETER_FIXED_NETWORK)
                        .long(PARAMETER_FIXED_NETWORK)
                        .num_args(1)
                        .required(true)
                        .value_parser(clap::value_parser!(Uuid))
                        .help("Network UUID for the cluster nodes"),
                )
                .arg(
                    Arg::new(PARAMETER_FIXED_SUBNET)
                        .long(PARAMETER_FIXED_SUBNET)
                        .num_args(1)
                        .required(true)
                        .value_parser(clap::value_parser!(Uuid))
                        .help("Subnet UUID for the cluster nodes"),
                )
                .arg(
                    Arg::new(PARAMETER_POOL_NAME)
                        .long(PARAMETER_POOL_NAME)
                        .num_args(1)
                        .required(true)
                        .help("Name of the initial node pool"),
                )
                .arg(
                    Arg::new(PARAMETER_POOL_FLAVOR)
                        .long(PARAMETER_POOL_FLAVOR)
                        .num_args(1)
                        .required(true)
                        .help("Flavor of the initial node pool"),
                )
                .arg(node_count_parameter().required(true))
                .arg(
                    Arg::new(PARAMETER_MIN_NODES)
                        .long(PARAMETER_MIN_NODES)
                        .num_args(1)
                        .required(false)
                        .value_parser(clap::value_parser!(u32))
                        .help("Autoscaler lower bound for the initial pool"),
                )
                .arg(
                    Arg::new(PARAMETER_MAX_NODES)
                        .long(PARAMETER_MAX_NODES)
                        .num_args(1)
                        .required(false)
                        .value_parser(clap::value_parser!(u32))
                        .help("Autoscaler upper bound for the initial pool"),
                ),
        )
        .subcommand(
            Command::new(COMMAND_DELETE)
                .about("Delete a Kubernetes cluster")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_POOLS)
                .about("List node pools of a cluster")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_POOL_RESIZE)
                .about("Resize a node pool")
                .arg(id_parameter())
                .arg(
                    Arg::new(PARAMETER_POOL_ID)
                        .long(PARAMETER_POOL_ID)
                        .num_args(1)
                        .required(true)
                        .value_parser(clap::value_parser!(Uuid))
                        .help("Node pool UUID"),
                )
                .arg(node_count_parameter().required(true)),
        )
        .subcommand(
            Command::new(COMMAND_KUBECONFIG)
                .about("Print the kubeconfig for a cluster")
                .arg(id_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CERTIFICATES)
                .about("Show cluster CA certificate or sign a CSR")
                .arg(id_parameter())
                .arg(
                    Arg::new(PARAMETER_CSR)
                        .long(PARAMETER_CSR)
                        .num_args(1)
                        .required(false)
                        .help("PEM-encoded certificate signing request to sign"),
                ),
        )
}
