//! PII detector client: an HTTP adapter over the external analyzer.

use async_trait::async_trait;
use proxy_core::{DetectError, Entity, EntitySource};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub type DetectResult<T> = Result<T, DetectError>;

#[derive(Debug, Clone, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    language: &'a str,
    entities: &'a [String],
    score_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalyzeResponseItem {
    entity_type: String,
    start: usize,
    end: usize,
    score: f32,
}

/// Adapter over the external PII analyzer. Implementations normalize the
/// analyzer's wire response into `proxy_core::Entity` records.
///
/// On transport or decoding failure this returns a typed error; it never
/// silently returns an empty result — an empty `Vec` means the analyzer
/// genuinely found nothing.
#[async_trait]
pub trait PiiDetectorClient: Send + Sync {
    async fn detect(
        &self,
        text: &str,
        categories: &[String],
        score_threshold: f32,
        language: &str,
    ) -> DetectResult<Vec<Entity>>;
}

/// Default HTTP implementation, POSTing to `{base_url}/analyze`.
pub struct HttpPiiDetectorClient {
    client: Client,
    base_url: String,
}

impl HttpPiiDetectorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client builds with a static config"),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PiiDetectorClient for HttpPiiDetectorClient {
    async fn detect(
        &self,
        text: &str,
        categories: &[String],
        score_threshold: f32,
        language: &str,
    ) -> DetectResult<Vec<Entity>> {
        let url = format!("{}/analyze", self.base_url.trim_end_matches('/'));
        let body = AnalyzeRequest {
            text,
            language,
            entities: categories,
            score_threshold,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DetectError::Unavailable {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = match status {
                StatusCode::TOO_MANY_REQUESTS => "rate limited".to_string(),
                _ => response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("HTTP {status}")),
            };
            return Err(DetectError::Unavailable { url, reason });
        }

        let items: Vec<AnalyzeResponseItem> =
            response.json().await.map_err(|e| DetectError::Malformed {
                reason: e.to_string(),
            })?;

        let span_len = text.len();
        let mut entities = Vec::with_capacity(items.len());
        for item in items {
            match Entity::new(
                item.entity_type,
                item.start,
                item.end,
                item.score,
                EntitySource::PiiDetector,
                span_len,
            ) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    return Err(DetectError::Malformed {
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(entities)
    }
}

impl std::fmt::Debug for HttpPiiDetectorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPiiDetectorClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn normalizes_analyzer_response_into_entities() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"entity_type": "PERSON", "start": 6, "end": 20, "score": 0.85},
                {"entity_type": "EMAIL_ADDRESS", "start": 24, "end": 43, "score": 0.95},
            ])))
            .mount(&server)
            .await;

        let client = HttpPiiDetectorClient::new(server.uri());
        let entities = client
            .detect(
                "Email Dr. Sarah Chen at sarah@hospital.org",
                &["PERSON".to_string(), "EMAIL_ADDRESS".to_string()],
                0.5,
                "en",
            )
            .await
            .unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].category, "PERSON");
        assert_eq!(entities[1].category, "EMAIL_ADDRESS");
    }

    #[tokio::test]
    async fn non_2xx_becomes_detect_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpPiiDetectorClient::new(server.uri());
        let result = client.detect("hi", &[], 0.5, "en").await;
        assert!(matches!(result, Err(DetectError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn malformed_body_becomes_detect_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = HttpPiiDetectorClient::new(server.uri());
        let result = client.detect("hi", &[], 0.5, "en").await;
        assert!(matches!(result, Err(DetectError::Malformed { .. })));
    }
}
