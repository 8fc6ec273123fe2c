//! Response capture and typed JSON extraction.
//!
//! Every resource call returns an [`ApiResponse`] holding the raw body and
//! its JSON-decoded form. Extraction either deserializes the whole body or
//! unwraps a named envelope field first (`{"results": [...]}`,
//! `{"remote_console": {...}}` and friends).

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::ApiError;

#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    value: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Capture a reqwest response: status, headers and the full body. The
    /// body is decoded to a generic JSON value eagerly when possible so
    /// extraction never re-reads the wire.
    pub async fn capture(response: reqwest::Response) -> Result<ApiResponse, ApiError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        let value = serde_json::from_slice(&body).ok();
        trace!("captured response: status={} body={} bytes", status, body.len());
        Ok(ApiResponse {
            status,
            headers,
            body,
            value,
        })
    }

    #[cfg(test)]
    pub fn from_value(value: serde_json::Value) -> ApiResponse {
        let body = serde_json::to_vec(&value).unwrap();
        ApiResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body,
            value: Some(value),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    fn json(&self) -> Result<&serde_json::Value, ApiError> {
        match &self.value {
            Some(value) => Ok(value),
            // Surface the decode failure that was swallowed at capture time.
            None => Err(ApiError::Decode(
                serde_json::from_slice::<serde_json::Value>(&self.body).unwrap_err(),
            )),
        }
    }

    /// Deserialize the entire body into `T`.
    pub fn extract_into<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self.json()?;
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Unwrap the named envelope field and deserialize it into `T`.
    pub fn extract_labeled<T: DeserializeOwned>(&self, label: &str) -> Result<T, ApiError> {
        let value = self.json()?;
        let inner = value.get(label).ok_or_else(|| ApiError::MissingEnvelope {
            label: label.to_string(),
        })?;
        Ok(serde_json::from_value(inner.clone())?)
    }

    /// Unwrap the named envelope field as an array and deserialize each
    /// element individually into a freshly constructed `T`.
    pub fn extract_list<T: DeserializeOwned>(&self, label: &str) -> Result<Vec<T>, ApiError> {
        let value = self.json()?;
        let inner = value.get(label).ok_or_else(|| ApiError::MissingEnvelope {
            label: label.to_string(),
        })?;
        let elements = inner.as_array().ok_or_else(|| ApiError::MissingEnvelope {
            label: label.to_string(),
        })?;
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            out.push(serde_json::from_value(element.clone())?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Flavor {
        name: String,
        vcpus: u32,
    }

    #[test]
    fn test_extract_into_whole_body() {
        let response = ApiResponse::from_value(json!({"name": "g1-standard-2", "vcpus": 2}));
        let flavor: Flavor = response.extract_into().unwrap();
        assert_eq!(flavor.name, "g1-standard-2");
        assert_eq!(flavor.vcpus, 2);
    }

    #[test]
    fn test_extract_labeled_unwraps_envelope() {
        let response = ApiResponse::from_value(json!({
            "remote_console": {"name": "console", "vcpus": 0}
        }));
        let inner: Flavor = response.extract_labeled("remote_console").unwrap();
        assert_eq!(inner.name, "console");
    }

    #[test]
    fn test_extract_labeled_missing_envelope() {
        let response = ApiResponse::from_value(json!({"other": 1}));
        let err = response.extract_labeled::<Flavor>("results").unwrap_err();
        assert!(matches!(err, ApiError::MissingEnvelope { ref label } if label == "results"));
    }

    #[test]
    fn test_extract_list_elements_are_independent() {
        let response = ApiResponse::from_value(json!({
            "results": [
                {"name": "a", "vcpus": 1},
                {"name": "b", "vcpus": 2},
                {"name": "c", "vcpus": 4}
            ]
        }));
        let mut flavors: Vec<Flavor> = response.extract_list("results").unwrap();
        assert_eq!(flavors.len(), 3);
        assert_eq!(flavors[0].name, "a");
        assert_eq!(flavors[2].vcpus, 4);

        // Mutating one element must not affect the others.
        flavors[0].name.push_str("-changed");
        assert_eq!(flavors[1].name, "b");
    }

    #[test]
    fn test_extract_list_rejects_non_array() {
        let response = ApiResponse::from_value(json!({"results": {"name": "a", "vcpus": 1}}));
        assert!(response.extract_list::<Flavor>("results").is_err());
    }
}
