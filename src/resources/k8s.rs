//! Managed Kubernetes clusters and node pools.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ProviderClient, RequestOpts};
use crate::error::{ApiError, ErrorContext};
use crate::format::{format_output, CsvRecordProducer, Formattable, FormattingError, OutputFormat};
use crate::pagination::Pager;
use crate::resources::tasks::TaskResults;
use crate::resources::{list_url, scoped_base};
use crate::validation::{Rule, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K8sCluster {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub version: String,
    #[serde(default)]
    pub pools: Vec<K8sPool>,
}

impl CsvRecordProducer for K8sCluster {
    fn csv_header() -> Vec<String> {
        vec![
            "ID".to_string(),
            "NAME".to_string(),
            "STATUS".to_string(),
            "VERSION".to_string(),
            "POOLS".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id.to_string(),
            self.name.clone(),
            self.status.clone(),
            self.version.clone(),
            self.pools.len().to_string(),
        ]]
    }
}

impl Formattable for K8sCluster {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K8sPool {
    pub id: Uuid,
    pub name: String,
    pub flavor_id: String,
    pub node_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_node_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_node_count: Option<u32>,
}

impl CsvRecordProducer for K8sPool {
    fn csv_header() -> Vec<String> {
        vec![
            "ID".to_string(),
            "NAME".to_string(),
            "FLAVOR".to_string(),
            "NODES".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id.to_string(),
            self.name.clone(),
            self.flavor_id.clone(),
            self.node_count.to_string(),
        ]]
    }
}

impl Formattable for K8sPool {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

/// Cluster credentials, unwrapped from the `config` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K8sConfig {
    pub config: String,
}

/// CA and signed certificate material for a cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K8sCertificate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub certificate: String,
}

impl CsvRecordProducer for K8sCertificate {
    fn csv_header() -> Vec<String> {
        vec!["CERTIFICATE".to_string()]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![self.certificate.clone()]]
    }
}

impl Formattable for K8sCertificate {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct K8sClusterListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct K8sPoolOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_node_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_node_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct K8sClusterCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_network: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_subnet: Option<Uuid>,
    pub pools: Vec<K8sPoolOptions>,
}

impl K8sClusterCreateOptions {
    pub const RULES: &'static [Rule] = &[
        Rule::Required { field: "name" },
        Rule::Regex {
            field: "name",
            pattern: "^[a-zA-Z0-9][a-zA-Z0-9._-]*$",
        },
        Rule::Required { field: "version" },
        Rule::Required {
            field: "fixed_network",
        },
        Rule::Required {
            field: "fixed_subnet",
        },
    ];
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct K8sPoolResizeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u32>,
}

impl K8sPoolResizeOptions {
    pub const RULES: &'static [Rule] = &[Rule::Required {
        field: "node_count",
    }];
}

pub struct K8sService<'a> {
    client: &'a ProviderClient,
    validator: &'a Validator,
}

impl<'a> K8sService<'a> {
    pub fn new(client: &'a ProviderClient, validator: &'a Validator) -> Self {
        K8sService { client, validator }
    }

    fn base(&self) -> String {
        scoped_base(self.client, "k8s/clusters")
    }

    pub fn cluster_url(&self, cluster_id: &Uuid) -> Result<url::Url, ApiError> {
        self.client
            .resource_url(&format!("{}/{}", self.base(), cluster_id))
    }

    pub async fn list(&self, opts: &K8sClusterListOptions) -> Result<Vec<K8sCluster>, ApiError> {
        let url = list_url(self.client, &self.base(), opts)?;
        Pager::new(self.client, url).all_pages().await
    }

    pub async fn get(&self, cluster_id: &Uuid) -> Result<K8sCluster, ApiError> {
        let response = self
            .client
            .get(self.cluster_url(cluster_id)?, RequestOpts::default())
            .await?;
        response.extract_into()
    }

    pub async fn create(&self, opts: &K8sClusterCreateOptions) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, K8sClusterCreateOptions::RULES)?;
        let url = self.client.resource_url(&self.base())?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn delete(&self, cluster_id: &Uuid) -> Result<TaskResults, ApiError> {
        let context =
            ErrorContext::new().with_message(404, format!("cluster {} does not exist", cluster_id));
        let response = self
            .client
            .delete(
                self.cluster_url(cluster_id)?,
                RequestOpts::new().with_error_context(context),
            )
            .await?;
        response.extract_into()
    }

    pub async fn list_pools(&self, cluster_id: &Uuid) -> Result<Vec<K8sPool>, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/pools", self.base(), cluster_id))?;
        let response = self.client.get(url, RequestOpts::default()).await?;
        response.extract_list("results")
    }

    pub async fn resize_pool(
        &self,
        cluster_id: &Uuid,
        pool_id: &Uuid,
        opts: &K8sPoolResizeOptions,
    ) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, K8sPoolResizeOptions::RULES)?;
        let url = self.client.resource_url(&format!(
            "{}/{}/pools/{}/resize",
            self.base(),
            cluster_id,
            pool_id
        ))?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    /// Fetch the kubeconfig for a cluster. The server wraps the YAML
    /// document in a `config` envelope.
    pub async fn kubeconfig(&self, cluster_id: &Uuid) -> Result<String, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/config", self.base(), cluster_id))?;
        let response = self.client.get(url, RequestOpts::default()).await?;
        let config: String = response.extract_labeled("config")?;
        Ok(config)
    }

    pub async fn certificates(&self, cluster_id: &Uuid) -> Result<K8sCertificate, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/certificates", self.base(), cluster_id))?;
        let response = self.client.get(url, RequestOpts::default()).await?;
        response.extract_into()
    }

    /// Sign a certificate signing request against the cluster CA.
    pub async fn sign_certificate(
        &self,
        cluster_id: &Uuid,
        csr: &str,
    ) -> Result<K8sCertificate, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/certificates", self.base(), cluster_id))?;
        let body = serde_json::json!({ "csr": csr });
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(&body)?)
            .await?;
        response.extract_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules_require_network_and_subnet() {
        let opts = K8sClusterCreateOptions {
            name: Some("prod".to_string()),
            version: Some("1.28.1".to_string()),
            ..K8sClusterCreateOptions::default()
        };
        let err = Validator::new()
            .validate(&opts, K8sClusterCreateOptions::RULES)
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("fixed_network"));
        assert!(text.contains("fixed_subnet"));
    }

    #[test]
    fn test_create_rules_accept_complete_options() {
        let opts = K8sClusterCreateOptions {
            name: Some("prod".to_string()),
            version: Some("1.28.1".to_string()),
            fixed_network: Some(Uuid::new_v4()),
            fixed_subnet: Some(Uuid::new_v4()),
            pools: vec![K8sPoolOptions {
                name: Some("workers".to_string()),
                flavor_id: Some("g1-standard-4".to_string()),
                node_count: Some(3),
                ..K8sPoolOptions::default()
            }],
        };
        assert!(Validator::new()
            .validate(&opts, K8sClusterCreateOptions::RULES)
            .is_ok());
    }

    #[test]
    fn test_pool_resize_rules_require_node_count() {
        let err = Validator::new()
            .validate(&K8sPoolResizeOptions::default(), K8sPoolResizeOptions::RULES)
            .unwrap_err();
        assert!(err.to_string().contains("node_count"));
    }
}
