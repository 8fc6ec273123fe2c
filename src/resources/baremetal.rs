//! Bare metal servers.

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
pub struct BaremetalServer {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub flavor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl CsvRecordProducer for BaremetalServer {
    fn csv_header() -> Vec<String> {
        vec![
            "ID".to_string(),
            "NAME".to_string(),
            "STATUS".to_string(),
            "FLAVOR".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id.to_string(),
            self.name.clone(),
            self.status.clone(),
            self.flavor.clone(),
        ]]
    }
}

impl Formattable for BaremetalServer {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaremetalFlavor {
    pub flavor_id: String,
    pub flavor_name: String,
    #[serde(default)]
    pub ram: u64,
    #[serde(default)]
    pub vcpus: u32,
}

impl CsvRecordProducer for BaremetalFlavor {
    fn csv_header() -> Vec<String> {
        vec![
            "ID".to_string(),
            "NAME".to_string(),
            "RAM_MB".to_string(),
            "VCPUS".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.flavor_id.clone(),
            self.flavor_name.clone(),
            self.ram.to_string(),
            self.vcpus.to_string(),
        ]]
    }
}

impl Formattable for BaremetalFlavor {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BaremetalListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BaremetalCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Boot source: one of `image` or `snapshot`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_name: Option<String>,
    pub interfaces: Vec<InterfaceOptions>,
}

impl BaremetalCreateOptions {
    pub const RULES: &'static [Rule] = &[
        Rule::Required { field: "name" },
        Rule::Regex {
            field: "name",
            pattern: "^[a-zA-Z0-9][a-zA-Z0-9._-]*$",
        },
        Rule::Required { field: "flavor" },
        Rule::Required { field: "source" },
        Rule::Enum {
            field: "source",
            allowed: &["image", "snapshot"],
        },
        Rule::RequiredForEqual {
            field: "image_id",
            when: "source",
            equals_any: &["image"],
        },
        Rule::RequiredForEqual {
            field: "snapshot_id",
            when: "source",
            equals_any: &["snapshot"],
        },
        Rule::SuppressedForEqual {
            field: "image_id",
            when: "source",
            equals_any: &["snapshot"],
        },
        Rule::AllowedWithout {
            field: "password",
            other: "ssh_key_name",
        },
    ];
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BaremetalRebuildOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
}

impl BaremetalRebuildOptions {
    pub const RULES: &'static [Rule] = &[Rule::Required { field: "image_id" }];
}

pub struct BaremetalService<'a> {
    client: &'a ProviderClient,
    validator: &'a Validator,
}

impl<'a> BaremetalService<'a> {
    pub fn new(client: &'a ProviderClient, validator: &'a Validator) -> Self {
        BaremetalService { client, validator }
    }

    fn base(&self) -> String {
        scoped_base(self.client, "bminstances")
    }

    pub fn server_url(&self, server_id: &Uuid) -> Result<url::Url, ApiError> {
        self.client
            .resource_url(&format!("{}/{}", self.base(), server_id))
    }

    pub async fn list(&self, opts: &BaremetalListOptions) -> Result<Vec<BaremetalServer>, ApiError> {
        let url = list_url(self.client, &self.base(), opts)?;
        Pager::new(self.client, url).all_pages().await
    }

    pub async fn get(&self, server_id: &Uuid) -> Result<BaremetalServer, ApiError> {
        let response = self
            .client
            .get(self.server_url(server_id)?, RequestOpts::default())
            .await?;
        response.extract_into()
    }

    pub async fn create(&self, opts: &BaremetalCreateOptions) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, BaremetalCreateOptions::RULES)?;
        let url = self.client.resource_url(&self.base())?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn rebuild(
        &self,
        server_id: &Uuid,
        opts: &BaremetalRebuildOptions,
    ) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, BaremetalRebuildOptions::RULES)?;
        let url = self
            .client
            .resource_url(&format!("{}/{}/rebuild", self.base(), server_id))?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn list_flavors(&self) -> Result<Vec<BaremetalFlavor>, ApiError> {
        let url = self
            .client
            .resource_url(&scoped_base(self.client, "bmflavors"))?;
        Pager::new(self.client, url).all_pages().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules_image_source() {
        let opts = BaremetalCreateOptions {
            name: Some("metal-1".to_string()),
            flavor: Some("bm1-infrastructure-small".to_string()),
            source: Some("image".to_string()),
            image_id: Some(Uuid::new_v4()),
            ssh_key_name: Some("ops".to_string()),
            ..BaremetalCreateOptions::default()
        };
        assert!(Validator::new()
            .validate(&opts, BaremetalCreateOptions::RULES)
            .is_ok());
    }

    #[test]
    fn test_create_rules_reject_volume_source() {
        let opts = BaremetalCreateOptions {
            name: Some("metal-1".to_string()),
            flavor: Some("bm1-infrastructure-small".to_string()),
            source: Some("volume".to_string()),
            ..BaremetalCreateOptions::default()
        };
        let err = Validator::new()
            .validate(&opts, BaremetalCreateOptions::RULES)
            .unwrap_err();
        assert!(err.to_string().contains("source"));
    }

    #[test]
    fn test_rebuild_rules_require_image() {
        let err = Validator::new()
            .validate(
                &BaremetalRebuildOptions::default(),
                BaremetalRebuildOptions::RULES,
            )
            .unwrap_err();
        assert!(err.to_string().contains("image_id"));
    }
}
