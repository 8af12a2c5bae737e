//! SORACOM Air metadata service sink
//!
//! Each selected field becomes one subscriber tag, and all tags go out in a
//! single request so a failed upload leaves nothing behind. The metadata service is
//! only reachable from inside the SORACOM network and authenticates the
//! caller by its SIM, so no credentials are handled here.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::MetadataConfig;
use crate::error::{Result, SignalInfoError};
use crate::signal::SelectedFields;

/// Write access to the device metadata store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// Store all tags in one request; either every tag is written or none is
    async fn put_tags(&self, tags: &[Tag]) -> Result<()>;
}

/// One entry of the subscriber tags request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub tag_name: String,
    pub tag_value: String,
}

impl Tag {
    pub fn new(name: &str, value: impl ToString) -> Self {
        Self {
            tag_name: name.to_string(),
            tag_value: value.to_string(),
        }
    }
}

/// HTTP client for `PUT /v1/subscriber/tags`
#[derive(Debug, Clone)]
pub struct SoracomMetadataClient {
    client: reqwest::Client,
    url: String,
}

impl SoracomMetadataClient {
    /// Build a client for the tags endpoint at `url`
    ///
    /// # Errors
    ///
    /// Returns [`SignalInfoError::HttpClient`] if the HTTP client cannot be built
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SignalInfoError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn from_config(config: &MetadataConfig) -> Result<Self> {
        Self::new(&config.url, Duration::from_millis(config.timeout_ms))
    }
}

#[async_trait]
impl MetadataApi for SoracomMetadataClient {
    async fn put_tags(&self, tags: &[Tag]) -> Result<()> {
        let response = self
            .client
            .put(&self.url)
            .json(tags)
            .send()
            .await
            .map_err(|e| SignalInfoError::Upload(format!("PUT {} failed: {}", self.url, e)))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(SignalInfoError::Upload(format!(
                "PUT {} returned {}: {}",
                self.url,
                status,
                text.trim()
            )));
        }

        if !text.is_empty() {
            debug!("Metadata service response: {}", text);
        }
        Ok(())
    }
}

/// Writes the selected fields as metadata tags in a single request
pub struct MetadataSink {
    api: Box<dyn MetadataApi>,
}

impl std::fmt::Debug for MetadataSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataSink").finish_non_exhaustive()
    }
}

impl MetadataSink {
    pub fn new(api: Box<dyn MetadataApi>) -> Self {
        Self { api }
    }

    /// One tag per field, in table order
    pub fn tags(fields: &SelectedFields) -> Vec<Tag> {
        fields.iter().map(|(name, value)| Tag::new(name, value)).collect()
    }

    pub async fn emit(&self, fields: &SelectedFields) -> Result<()> {
        let tags = Self::tags(fields);
        self.api.put_tags(&tags).await?;
        for tag in &tags {
            debug!("Set metadata {} = {}", tag.tag_name, tag.tag_value);
        }
        info!("Put {} fields into metadata", tags.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::FieldValue;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample() -> SelectedFields {
        SelectedFields(vec![
            ("rat", FieldValue::Text("LTE".into())),
            ("rsrp", FieldValue::Int(-95)),
            ("sinr", FieldValue::Unknown),
        ])
    }

    fn expected_tags() -> Vec<Tag> {
        vec![Tag::new("rat", "LTE"), Tag::new("rsrp", "-95"), Tag::new("sinr", "unknown")]
    }

    #[test]
    fn test_tags_keep_table_order_and_text_values() {
        assert_eq!(MetadataSink::tags(&sample()), expected_tags());
    }

    #[tokio::test]
    async fn test_emit_puts_all_tags_in_one_call() {
        let mut api = MockMetadataApi::new();
        api.expect_put_tags()
            .withf(|tags| tags.to_vec() == expected_tags())
            .times(1)
            .returning(|_| Ok(()));

        let sink = MetadataSink::new(Box::new(api));
        sink.emit(&sample()).await.unwrap();
    }

    #[tokio::test]
    async fn test_emit_propagates_failure() {
        let mut api = MockMetadataApi::new();
        api.expect_put_tags()
            .times(1)
            .returning(|_| Err(SignalInfoError::Upload("HTTP 500".into())));

        let sink = MetadataSink::new(Box::new(api));
        let err = sink.emit(&sample()).await.unwrap_err();
        assert!(matches!(err, SignalInfoError::Upload(_)));
        assert_eq!(err.kind(), crate::error::ErrorKind::Delivery);
    }

    #[tokio::test]
    async fn test_client_puts_tag_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/subscriber/tags"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!([{"tagName": "rsrp", "tagValue": "-95"}])))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/v1/subscriber/tags", server.uri());
        let client = SoracomMetadataClient::new(&url, Duration::from_secs(5)).unwrap();
        client.put_tags(&[Tag::new("rsrp", "-95")]).await.unwrap();
    }

    #[tokio::test]
    async fn test_client_reports_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let url = format!("{}/v1/subscriber/tags", server.uri());
        let client = SoracomMetadataClient::new(&url, Duration::from_secs(5)).unwrap();
        match client.put_tags(&[Tag::new("rat", "LTE")]).await {
            Err(SignalInfoError::Upload(msg)) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("forbidden"));
            }
            other => panic!("Expected Upload error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_reports_unreachable_service() {
        // Nothing listens on port 9 of localhost
        let client =
            SoracomMetadataClient::new("http://127.0.0.1:9/v1/subscriber/tags", Duration::from_secs(2))
                .unwrap();
        let result = client.put_tags(&[Tag::new("rat", "LTE")]).await;
        assert!(matches!(result, Err(SignalInfoError::Upload(_))));
    }

    #[tokio::test]
    async fn test_sink_sends_every_field_in_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/subscriber/tags"))
            .and(body_json(serde_json::json!([
                {"tagName": "rat", "tagValue": "LTE"},
                {"tagName": "rsrp", "tagValue": "-95"},
                {"tagName": "sinr", "tagValue": "unknown"}
            ])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/v1/subscriber/tags", server.uri());
        let client = SoracomMetadataClient::new(&url, Duration::from_secs(5)).unwrap();
        MetadataSink::new(Box::new(client)).emit(&sample()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_upload_stores_no_tag() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_json(serde_json::json!([{"tagName": "rat", "tagValue": "LTE"}])))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = format!("{}/v1/subscriber/tags", server.uri());
        let client = SoracomMetadataClient::new(&url, Duration::from_secs(5)).unwrap();
        let fields = SelectedFields(vec![
            ("rat", FieldValue::Text("LTE".into())),
            ("rsrp", FieldValue::Int(-95)),
        ]);

        let result = MetadataSink::new(Box::new(client)).emit(&fields).await;
        assert!(matches!(result, Err(SignalInfoError::Upload(_))));

        // A single request carried both tags, so the rat-only match never fired
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!([
                {"tagName": "rat", "tagValue": "LTE"},
                {"tagName": "rsrp", "tagValue": "-95"}
            ])
        );
    }
}
