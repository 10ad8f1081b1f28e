//! reqwest-backed [`ExperimentApi`]
//!
//! JSON over HTTP with a per-request timeout. There is no retry policy: a
//! failed call is reported and the user decides whether to resubmit.

use crate::api::{BaselineKey, ContentItem, CreatedTest, ExperimentApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use abtest_core::Availability;
use abtest_model::{
    ActiveTest, FunnelStage, Persona, SegmentKey, TestConfiguration, TestType,
    VariantConfiguration,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

const CONTENT_PATH: &str = "/api/content";
const COMBINATIONS_PATH: &str = "/api/ab-tests/combinations";
const BASELINE_PATH: &str = "/api/ab-tests/baseline";
const ACTIVE_PATH: &str = "/api/ab-tests/active";
const TESTS_PATH: &str = "/api/ab-tests";

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CombinationRow {
    persona: Persona,
    funnel_stage: FunnelStage,
    #[serde(default)]
    content_count: u32,
}

#[derive(Deserialize, Debug)]
struct BaselineBody {
    #[serde(default)]
    configuration: JsonValue,
}

/// HTTP implementation of the admin API
#[derive(Debug, Clone)]
pub struct HttpExperimentApi {
    client: Client,
    base_url: String,
}

impl HttpExperimentApi {
    /// Build a client from configuration
    ///
    /// # Errors
    /// - [`ApiError::InvalidUrl`] if the base URL is not http(s)
    /// - [`ApiError::Transport`] if the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let parsed =
            Url::parse(&base_url).map_err(|_| ApiError::InvalidUrl(config.base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Base URL in use
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await?;
        let text = parse_response(response).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

async fn parse_response(response: Response) -> Result<String, ApiError> {
    let status = response.status().as_u16();
    let url = response.url().path().to_string();
    let text = response.text().await?;

    if status < 400 {
        debug!(status, url = %url, "admin api response");
        return Ok(text);
    }

    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error.or(body.message))
        .unwrap_or(text);

    warn!(status, url = %url, %message, "admin api request failed");

    if (400..500).contains(&status) {
        Err(ApiError::Client { status, message })
    } else {
        Err(ApiError::Server { status, message })
    }
}

#[async_trait]
impl ExperimentApi for HttpExperimentApi {
    async fn content_items(&self, test_type: TestType) -> Result<Vec<ContentItem>, ApiError> {
        let request = self
            .client
            .get(self.url(CONTENT_PATH))
            .query(&[("type", test_type.as_str())]);
        self.send_json(request).await
    }

    async fn available_combinations(&self) -> Result<Availability, ApiError> {
        let rows: Vec<CombinationRow> = self
            .send_json(self.client.get(self.url(COMBINATIONS_PATH)))
            .await?;

        Ok(rows
            .into_iter()
            .filter(|row| row.content_count > 0)
            .map(|row| SegmentKey::new(row.persona, row.funnel_stage))
            .collect())
    }

    async fn baseline(&self, key: BaselineKey) -> Result<Option<VariantConfiguration>, ApiError> {
        let request = self.client.get(self.url(BASELINE_PATH)).query(&[
            ("persona", key.persona.as_str()),
            ("funnelStage", key.stage.as_str()),
            ("testType", key.test_type.as_str()),
        ]);

        let body: Option<BaselineBody> = match self.send_json(request).await {
            Ok(body) => body,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };

        match body {
            Some(body) if !body.configuration.is_null() => {
                VariantConfiguration::from_value(key.test_type, body.configuration)
                    .map(Some)
                    .map_err(|e| ApiError::Decode(e.to_string()))
            }
            _ => Ok(None),
        }
    }

    async fn active_tests(&self) -> Result<Vec<ActiveTest>, ApiError> {
        self.send_json(self.client.get(self.url(ACTIVE_PATH))).await
    }

    async fn create_test(&self, config: &TestConfiguration) -> Result<CreatedTest, ApiError> {
        let request = self.client.post(self.url(TESTS_PATH)).json(config);
        self.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base_url() {
        let config = ClientConfig::new().with_base_url("ftp://example.org");
        assert!(matches!(
            HttpExperimentApi::new(&config),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn rejects_base_url_without_host() {
        for raw in ["http://", "http:// x", "https"] {
            let config = ClientConfig::new().with_base_url(raw);
            assert!(
                matches!(HttpExperimentApi::new(&config), Err(ApiError::InvalidUrl(_))),
                "{raw} accepted"
            );
        }
    }

    #[test]
    fn trims_trailing_slash() {
        let config = ClientConfig::new().with_base_url("https://admin.example.org/");
        let api = HttpExperimentApi::new(&config).unwrap();
        assert_eq!(api.base_url(), "https://admin.example.org");
        assert_eq!(api.url(TESTS_PATH), "https://admin.example.org/api/ab-tests");
    }
}
