//! GPU clusters for AI workloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ProviderClient, RequestOpts};
use crate::error::ApiError;
use crate::format::{format_output, CsvRecordProducer, Formattable, FormattingError, OutputFormat};
use crate::pagination::Pager;
use crate::resources::instances::InterfaceOptions;
use crate::resources::tasks::TaskResults;
use crate::resources::{list_url, scoped_base};
use crate::validation::{Rule, Validator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiCluster {
    pub cluster_id: Uuid,
    pub cluster_name: String,
    pub cluster_status: String,
    pub flavor: String,
    /// IDs of the GPU nodes backing the cluster.
    #[serde(default)]
    pub poplar_servers: Vec<Uuid>,
}

impl CsvRecordProducer for AiCluster {
    fn csv_header() -> Vec<String> {
        vec![
            "ID".to_string(),
            "NAME".to_string(),
            "STATUS".to_string(),
            "FLAVOR".to_string(),
            "NODES".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.cluster_id.to_string(),
            self.cluster_name.clone(),
            self.cluster_status.clone(),
            self.flavor.clone(),
            self.poplar_servers.len().to_string(),
        ]]
    }
}

impl Formattable for AiCluster {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AiClusterListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AiClusterCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
    pub interfaces: Vec<InterfaceOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances_count: Option<u32>,
}

impl AiClusterCreateOptions {
    pub const RULES: &'static [Rule] = &[
        Rule::Required { field: "name" },
        Rule::Regex {
            field: "name",
            pattern: "^[a-zA-Z0-9][a-zA-Z0-9._-]*$",
        },
        Rule::Required { field: "flavor" },
        Rule::Required { field: "image_id" },
    ];
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AiClusterResizeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances_count: Option<u32>,
}

impl AiClusterResizeOptions {
    pub const RULES: &'static [Rule] = &[Rule::Required {
        field: "instances_count",
    }];
}

pub struct AiClustersService<'a> {
    client: &'a ProviderClient,
    validator: &'a Validator,
}

impl<'a> AiClustersService<'a> {
    pub fn new(client: &'a ProviderClient, validator: &'a Validator) -> Self {
        AiClustersService { client, validator }
    }

    fn base(&self) -> String {
        scoped_base(self.client, "ai/clusters")
    }

    pub fn cluster_url(&self, cluster_id: &Uuid) -> Result<url::Url, ApiError> {
        self.client
            .resource_url(&format!("{}/{}", self.base(), cluster_id))
    }

    pub async fn list(&self, opts: &AiClusterListOptions) -> Result<Vec<AiCluster>, ApiError> {
        let url = list_url(self.client, &self.base(), opts)?;
        Pager::new(self.client, url).all_pages().await
    }

    pub async fn get(&self, cluster_id: &Uuid) -> Result<AiCluster, ApiError> {
        let response = self
            .client
            .get(self.cluster_url(cluster_id)?, RequestOpts::default())
            .await?;
        response.extract_into()
    }

    pub async fn create(&self, opts: &AiClusterCreateOptions) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, AiClusterCreateOptions::RULES)?;
        let url = self.client.resource_url(&self.base())?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn delete(&self, cluster_id: &Uuid) -> Result<TaskResults, ApiError> {
        let response = self
            .client
            .delete(self.cluster_url(cluster_id)?, RequestOpts::default())
            .await?;
        response.extract_into()
    }

    pub async fn resize(
        &self,
        cluster_id: &Uuid,
        opts: &AiClusterResizeOptions,
    ) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, AiClusterResizeOptions::RULES)?;
        let url = self
            .client
            .resource_url(&format!("{}/{}/resize", self.base(), cluster_id))?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules_require_name_flavor_image() {
        let err = Validator::new()
            .validate(
                &AiClusterCreateOptions::default(),
                AiClusterCreateOptions::RULES,
            )
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("name"));
        assert!(text.contains("flavor"));
        assert!(text.contains("image_id"));
    }

    #[test]
    fn test_create_rules_accept_complete_options() {
        let opts = AiClusterCreateOptions {
            name: Some("training-1".to_string()),
            flavor: Some("g2a-ai-fake-v1pod-8".to_string()),
            image_id: Some(Uuid::new_v4()),
            instances_count: Some(2),
            ..AiClusterCreateOptions::default()
        };
        assert!(Validator::new()
            .validate(&opts, AiClusterCreateOptions::RULES)
            .is_ok());
    }
}
