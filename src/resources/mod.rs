//! Resource modules for the Nimbus Cloud API.
//!
//! Every module follows the same pattern: typed models, option structs
//! carrying declarative validation rules, URL builders scoped by the
//! client's project and region, and thin verb calls through
//! [`ProviderClient`](crate::client::ProviderClient) with typed extraction
//! of the response.

pub mod ai_clusters;
pub mod baremetal;
pub mod instances;
pub mod k8s;
pub mod server_groups;
pub mod tasks;
pub mod volumes;

use serde::Serialize;
use url::Url;

use crate::client::ProviderClient;
use crate::error::ApiError;

/// `v1/<resource>/<project>/<region>` base path for a scoped resource.
pub(crate) fn scoped_base(client: &ProviderClient, resource: &str) -> String {
    format!(
        "v1/{}/{}/{}",
        resource,
        client.project_id(),
        client.region_id()
    )
}

/// Build a listing URL with the serialized options as its query string.
/// Unset option fields are omitted entirely.
pub(crate) fn list_url<O: Serialize>(
    client: &ProviderClient,
    base: &str,
    opts: &O,
) -> Result<Url, ApiError> {
    let mut url = client.resource_url(base)?;
    let query = serde_urlencoded::to_string(opts)?;
    if !query.is_empty() {
        url.set_query(Some(&query));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Credentials;

    fn client() -> ProviderClient {
        ProviderClient::builder()
            .endpoint("https://api.example.test/")
            .project(42)
            .region(7)
            .credentials(Credentials::ApiKey {
                key: "k".to_string(),
            })
            .build()
            .unwrap()
    }

    #[derive(Serialize, Default)]
    struct Opts {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
    }

    #[test]
    fn test_scoped_base_includes_project_and_region() {
        assert_eq!(scoped_base(&client(), "instances"), "v1/instances/42/7");
    }

    #[test]
    fn test_list_url_serializes_set_fields_only() {
        let url = list_url(
            &client(),
            "v1/instances/42/7",
            &Opts {
                name: Some("web".to_string()),
                limit: Some(10),
            },
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.test/v1/instances/42/7?name=web&limit=10"
        );

        let url = list_url(&client(), "v1/instances/42/7", &Opts::default()).unwrap();
        assert_eq!(url.query(), None);
    }
}
