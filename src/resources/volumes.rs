//! Block storage volumes.

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
pub struct Volume {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub size: u64,
    pub volume_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<Uuid>,
}

impl CsvRecordProducer for Volume {
    fn csv_header() -> Vec<String> {
        vec![
            "ID".to_string(),
            "NAME".to_string(),
            "STATUS".to_string(),
            "SIZE_GB".to_string(),
            "TYPE".to_string(),
        ]
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.id.to_string(),
            self.name.clone(),
            self.status.clone(),
            self.size.to_string(),
            self.volume_type.clone(),
        ]]
    }
}

impl Formattable for Volume {
    fn format(&self, f: &OutputFormat) -> Result<String, FormattingError> {
        format_output(self, f)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeCreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// One of `new-volume`, `image` or `snapshot`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
}

impl VolumeCreateOptions {
    pub const RULES: &'static [Rule] = &[
        Rule::Required { field: "name" },
        Rule::Required { field: "source" },
        Rule::Enum {
            field: "source",
            allowed: &["new-volume", "image", "snapshot"],
        },
        Rule::RequiredForEqual {
            field: "size",
            when: "source",
            equals_any: &["new-volume", "image"],
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
            equals_any: &["new-volume", "snapshot"],
        },
        Rule::Enum {
            field: "volume_type",
            allowed: &["standard", "ssd_hiiops", "cold", "ultra"],
        },
    ];
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeAttachOptions {
    pub instance_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeExtendOptions {
    pub size: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VolumeRetypeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
}

impl VolumeRetypeOptions {
    pub const RULES: &'static [Rule] = &[
        Rule::Required {
            field: "volume_type",
        },
        Rule::Enum {
            field: "volume_type",
            allowed: &["standard", "ssd_hiiops"],
        },
    ];
}

pub struct VolumesService<'a> {
    client: &'a ProviderClient,
    validator: &'a Validator,
}

impl<'a> VolumesService<'a> {
    pub fn new(client: &'a ProviderClient, validator: &'a Validator) -> Self {
        VolumesService { client, validator }
    }

    fn base(&self) -> String {
        scoped_base(self.client, "volumes")
    }

    pub fn volume_url(&self, volume_id: &Uuid) -> Result<url::Url, ApiError> {
        self.client
            .resource_url(&format!("{}/{}", self.base(), volume_id))
    }

    pub async fn list(&self, opts: &VolumeListOptions) -> Result<Vec<Volume>, ApiError> {
        let url = list_url(self.client, &self.base(), opts)?;
        Pager::new(self.client, url).all_pages().await
    }

    pub async fn get(&self, volume_id: &Uuid) -> Result<Volume, ApiError> {
        let response = self
            .client
            .get(self.volume_url(volume_id)?, RequestOpts::default())
            .await?;
        response.extract_into()
    }

    pub async fn create(&self, opts: &VolumeCreateOptions) -> Result<TaskResults, ApiError> {
        self.validator.validate(opts, VolumeCreateOptions::RULES)?;
        let url = self.client.resource_url(&self.base())?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn delete(&self, volume_id: &Uuid) -> Result<TaskResults, ApiError> {
        let context =
            ErrorContext::new().with_message(404, format!("volume {} does not exist", volume_id));
        let response = self
            .client
            .delete(
                self.volume_url(volume_id)?,
                RequestOpts::new().with_error_context(context),
            )
            .await?;
        response.extract_into()
    }

    /// Attaching to a busy instance commonly answers 409 while another
    /// volume operation is in flight, so this call carries a conflict
    /// retry budget.
    pub async fn attach(
        &self,
        volume_id: &Uuid,
        opts: &VolumeAttachOptions,
    ) -> Result<Volume, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/attach", self.base(), volume_id))?;
        let response = self
            .client
            .post(
                url,
                RequestOpts::new()
                    .with_json(opts)?
                    .with_conflict_retries(3, 5),
            )
            .await?;
        response.extract_into()
    }

    pub async fn detach(&self, volume_id: &Uuid) -> Result<Volume, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/detach", self.base(), volume_id))?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_conflict_retries(3, 5))
            .await?;
        response.extract_into()
    }

    pub async fn extend(
        &self,
        volume_id: &Uuid,
        opts: &VolumeExtendOptions,
    ) -> Result<TaskResults, ApiError> {
        let url = self
            .client
            .resource_url(&format!("{}/{}/extend", self.base(), volume_id))?;
        let response = self
            .client
            .post(url, RequestOpts::new().with_json(opts)?)
            .await?;
        response.extract_into()
    }

    pub async fn retype(
        &self,
        volume_id: &Uuid,
        opts: &VolumeRetypeOptions,
    ) -> Result<Volume, ApiError> {
        self.validator.validate(opts, VolumeRetypeOptions::RULES)?;
        let url = self
            .client
            .resource_url(&format!("{}/{}/retype", self.base(), volume_id))?;
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
    fn test_create_rules_new_volume_needs_size() {
        let opts = VolumeCreateOptions {
            name: Some("data".to_string()),
            source: Some("new-volume".to_string()),
            ..VolumeCreateOptions::default()
        };
        let err = Validator::new()
            .validate(&opts, VolumeCreateOptions::RULES)
            .unwrap_err();
        assert!(err.to_string().contains("size"));

        let opts = VolumeCreateOptions {
            name: Some("data".to_string()),
            source: Some("new-volume".to_string()),
            size: Some(20),
            ..VolumeCreateOptions::default()
        };
        assert!(Validator::new()
            .validate(&opts, VolumeCreateOptions::RULES)
            .is_ok());
    }

    #[test]
    fn test_create_rules_snapshot_source() {
        let opts = VolumeCreateOptions {
            name: Some("data".to_string()),
            source: Some("snapshot".to_string()),
            snapshot_id: Some(Uuid::new_v4()),
            ..VolumeCreateOptions::default()
        };
        assert!(Validator::new()
            .validate(&opts, VolumeCreateOptions::RULES)
            .is_ok());
    }

    #[test]
    fn test_retype_rules_restrict_types() {
        let opts = VolumeRetypeOptions {
            volume_type: Some("cold".to_string()),
        };
        let err = Validator::new()
            .validate(&opts, VolumeRetypeOptions::RULES)
            .unwrap_err();
        assert!(err.to_string().contains("volume_type"));
    }
}
