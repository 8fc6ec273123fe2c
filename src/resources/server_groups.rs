//! Server placement groups.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ProviderClient, RequestOpts};
use crate::error::ApiError;
use crate::format::{format_output, CsvRecordProducer, Formattable, FormattingError, OutputFormat};
use crate::pagination::Pager;
use crate::resources::{list_url, scoped_base};
use crate::validation::{Rule, Validator};

pub const POLICY_VALUES: &[&str] = &["affinity", "anti-affinity", "soft-anti-affinity"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerGroup {
    #[serde(rename = "servergroup_id")]
    pub id: Uuid,
    pub name: String,
    pub policy: String,
    #[serde(default)]
    pub instances: Vec<ServerGroupMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerGroupMember {
    pub instance_id: Uuid,
    pub instance_name: String,
}

impl CsvRecordProducer for ServerGroup {
    fn csv_header() -> Vec<String> {
        vec![
            "ID".to_string(),
            "NAME".to_string(),
            "POLICY".to_string(),
            "INSTANCES".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id.to_string(),
            self.name.clone(),
            self.policy.clone(),
            self.instances.len().to_string(),
        ]]
    }
}

impl Formattable for ServerGroup {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerGroupListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerGroupCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

impl ServerGroupCreateOptions {
    pub const RULES: &'static [Rule] = &[
        Rule::Required { field: "name" },
        Rule::Required { field: "policy" },
        Rule::Enum {
            field: "policy",
            allowed: POLICY_VALUES,
        },
    ];
}

pub struct ServerGroupsService<'a> {
    client: &'a ProviderClient,
    validator: &'a Validator,
}

impl<'a> ServerGroupsService<'a> {
    pub fn new(client: &'a ProviderClient, validator: &'a Validator) -> Self {
        ServerGroupsService { client, validator }
    }

    fn base(&self) -> String {
        scoped_base(self.client, "servergroups")
    }

    pub fn group_url(&self, group_id: &Uuid) -> Result<url::Url, ApiError> {
        self.client
            .resource_url(&format!("{}/{}", self.base(), group_id))
    }

    pub async fn list(&self, opts: &ServerGroupListOptions) -> Result<Vec<ServerGroup>, ApiError> {
        let url = list_url(self.client, &self.base(), opts)?;
        Pager::new(self.client, url).all_pages().await
    }

    pub async fn get(&self, group_id: &Uuid) -> Result<ServerGroup, ApiError> {
        let response = self
            .client
            .get(self.group_url(group_id)?, RequestOpts::default())
            .await?;
        response.extract_into()
    }

    /// Server group creation is synchronous; the server answers with the
    /// created group rather than a task envelope.
    pub async fn create(&self, opts: &ServerGroupCreateOptions) -> Result<ServerGroup, ApiError> {
        self.validator.validate(opts, ServerGroupCreateOptions::RULES)?;
        let url = self.client.resource_url(&self.base())?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn delete(&self, group_id: &Uuid) -> Result<(), ApiError> {
        self.client
            .delete(self.group_url(group_id)?, RequestOpts::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules_reject_unknown_policy() {
        let opts = ServerGroupCreateOptions {
            name: Some("web-tier".to_string()),
            policy: Some("spread".to_string()),
        };
        let err = Validator::new()
            .validate(&opts, ServerGroupCreateOptions::RULES)
            .unwrap_err();
        assert!(err.to_string().contains("policy"));
    }

    #[test]
    fn test_create_rules_accept_each_policy() {
        for policy in POLICY_VALUES {
            let opts = ServerGroupCreateOptions {
                name: Some("web-tier".to_string()),
                policy: Some(policy.to_string()),
            };
            assert!(Validator::new()
                .validate(&opts, ServerGroupCreateOptions::RULES)
                .is_ok());
        }
    }
}
