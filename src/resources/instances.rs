//! Compute instances.

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
pub struct Instance {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub flavor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl CsvRecordProducer for Instance {
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

impl Formattable for Instance {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub port_id: Uuid,
    pub network_id: Uuid,
    #[serde(default)]
    pub ip_assignments: Vec<IpAssignment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAssignment {
    pub ip_address: String,
    pub subnet_id: Uuid,
}

impl CsvRecordProducer for Interface {
    fn csv_header() -> Vec<String> {
        vec![
            "PORT_ID".to_string(),
            "NETWORK_ID".to_string(),
            "IP_ADDRESSES".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        let addresses = self
            .ip_assignments
            .iter()
            .map(|a| a.ip_address.clone())
            .collect::<Vec<_>>()
            .join(";");
        vec![vec![
            self.port_id.to_string(),
            self.network_id.to_string(),
            addresses,
        ]]
    }
}

impl Formattable for Interface {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

/// Console access descriptor, unwrapped from the `remote_console` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConsole {
    pub url: String,
    #[serde(rename = "type")]
    pub console_type: String,
    pub protocol: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InstanceListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceOptions {
    #[serde(rename = "type")]
    pub interface_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InstanceCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Boot source: one of `image`, `snapshot` or `volume`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_name: Option<String>,
    pub interfaces: Vec<InterfaceOptions>,
}

impl InstanceCreateOptions {
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
            allowed: &["image", "snapshot", "volume"],
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
        Rule::RequiredForEqual {
            field: "volume_id",
            when: "source",
            equals_any: &["volume"],
        },
        Rule::SuppressedForEqual {
            field: "image_id",
            when: "source",
            equals_any: &["snapshot", "volume"],
        },
        Rule::AllowedWithout {
            field: "password",
            other: "ssh_key_name",
        },
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceResizeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
}

impl InstanceResizeOptions {
    pub const RULES: &'static [Rule] = &[Rule::Required { field: "flavor" }];
}

pub struct InstancesService<'a> {
    client: &'a ProviderClient,
    validator: &'a Validator,
}

impl<'a> InstancesService<'a> {
    pub fn new(client: &'a ProviderClient, validator: &'a Validator) -> Self {
        InstancesService { client, validator }
    }

    fn base(&self) -> String {
        scoped_base(self.client, "instances")
    }

    pub fn instance_url(&self, instance_id: &Uuid) -> Result<url::Url, ApiError> {
        self.client
            .resource_url(&format!("{}/{}", self.base(), instance_id))
    }

    pub async fn list(&self, opts: &InstanceListOptions) -> Result<Vec<Instance>, ApiError> {
        let url = list_url(self.client, &self.base(), opts)?;
        Pager::new(self.client, url).all_pages().await
    }

    pub async fn get(&self, instance_id: &Uuid) -> Result<Instance, ApiError> {
        let response = self
            .client
            .get(self.instance_url(instance_id)?, RequestOpts::default())
            .await?;
        response.extract_into()
    }

    pub async fn create(&self, opts: &InstanceCreateOptions) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, InstanceCreateOptions::RULES)?;
        let url = self.client.resource_url(&self.base())?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn delete(&self, instance_id: &Uuid) -> Result<TaskResults, ApiError> {
        let context =
            ErrorContext::new().with_message(404, format!("instance {} does not exist", instance_id));
        let response = self
            .client
            .delete(
                self.instance_url(instance_id)?,
                RequestOpts::new().with_error_context(context),
            )
            .await?;
        response.extract_into()
    }

    pub async fn resize(
        &self,
        instance_id: &Uuid,
        opts: &InstanceResizeOptions,
    ) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, InstanceResizeOptions::RULES)?;
        let url = self
            .client
            .resource_url(&format!("{}/{}/changeflavor", self.base(), instance_id))?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn start(&self, instance_id: &Uuid) -> Result<Instance, ApiError> {
        self.power_action(instance_id, "start").await
    }

    pub async fn stop(&self, instance_id: &Uuid) -> Result<Instance, ApiError> {
        self.power_action(instance_id, "stop").await
    }

    async fn power_action(&self, instance_id: &Uuid, action: &str) -> Result<Instance, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/{}", self.base(), instance_id, action))?;
        let response = self.client.post(url, RequestOpts::default()).await?;
        response.extract_into()
    }

    pub async fn list_interfaces(&self, instance_id: &Uuid) -> Result<Vec<Interface>, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/interfaces", self.base(), instance_id))?;
        let response = self.client.get(url, RequestOpts::default()).await?;
        response.extract_list("results")
    }

    /// Fetch the remote console descriptor. The server wraps it in a
    /// `remote_console` envelope.
    pub async fn remote_console(&self, instance_id: &Uuid) -> Result<RemoteConsole, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/get_console", self.base(), instance_id))?;
        let response = self.client.get(url, RequestOpts::default()).await?;
        response.extract_labeled("remote_console")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rules_accept_complete_image_options() {
        let opts = InstanceCreateOptions {
            name: Some("web-1".to_string()),
            flavor: Some("g1-standard-2".to_string()),
            source: Some("image".to_string()),
            image_id: Some(Uuid::new_v4()),
            ssh_key_name: Some("ops".to_string()),
            ..InstanceCreateOptions::default()
        };
        assert!(Validator::new()
            .validate(&opts, InstanceCreateOptions::RULES)
            .is_ok());
    }

    #[test]
    fn test_create_rules_reject_image_source_without_image_id() {
        let opts = InstanceCreateOptions {
            name: Some("web-1".to_string()),
            flavor: Some("g1-standard-2".to_string()),
            source: Some("image".to_string()),
            ..InstanceCreateOptions::default()
        };
        let err = Validator::new()
            .validate(&opts, InstanceCreateOptions::RULES)
            .unwrap_err();
        assert!(err.to_string().contains("image_id"));
    }

    #[test]
    fn test_create_rules_reject_image_id_with_snapshot_source() {
        let opts = InstanceCreateOptions {
            name: Some("web-1".to_string()),
            flavor: Some("g1-standard-2".to_string()),
            source: Some("snapshot".to_string()),
            snapshot_id: Some(Uuid::new_v4()),
            image_id: Some(Uuid::new_v4()),
            ..InstanceCreateOptions::default()
        };
        let err = Validator::new()
            .validate(&opts, InstanceCreateOptions::RULES)
            .unwrap_err();
        assert!(err.to_string().contains("image_id"));
        assert!(err.to_string().contains("must not be set"));
    }

    #[test]
    fn test_create_rules_reject_password_with_ssh_key() {
        let opts = InstanceCreateOptions {
            name: Some("web-1".to_string()),
            flavor: Some("g1-standard-2".to_string()),
            source: Some("volume".to_string()),
            volume_id: Some(Uuid::new_v4()),
            password: Some("hunter2".to_string()),
            ssh_key_name: Some("ops".to_string()),
            ..InstanceCreateOptions::default()
        };
        let err = Validator::new()
            .validate(&opts, InstanceCreateOptions::RULES)
            .unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_instance_csv_record() {
        let instance = Instance {
            id: Uuid::nil(),
            name: "web-1".to_string(),
            status: "ACTIVE".to_string(),
            flavor: "g1-standard-2".to_string(),
            created_at: None,
        };
        let records = instance.as_csv_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][1], "web-1");
    }
}
