//! A canned-response `PiiDetectorClient` for tests that don't want to
//! stand up a `wiremock` server.

use async_trait::async_trait;
use proxy_core::{DetectError, Entity};
use proxy_detect::PiiDetectorClient;
use std::collections::HashMap;
use std::sync::Mutex;

enum Canned {
    /// The same entity list for every call, regardless of input text.
    Fixed(Vec<Entity>),
    /// Looked up by the exact input text; unmapped text returns no entities.
    /// Use this over `Fixed` whenever a single test request is extracted
    /// into more than one span of differing length - a `Fixed` entity list
    /// sized for one span will slice out of bounds against a shorter one.
    Keyed(HashMap<String, Vec<Entity>>),
}

/// Returns a configured entity list for every call, unless `fail_with` was
/// configured - then every call returns that error.
pub struct MockPiiDetectorClient {
    canned: Canned,
    fail_with: Option<DetectError>,
    calls: Mutex<Vec<String>>,
}

impl MockPiiDetectorClient {
    pub fn returning(entities: Vec<Entity>) -> Self {
        Self {
            canned: Canned::Fixed(entities),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Return `entities` only for calls whose input text exactly matches
    /// `text`; every other span gets an empty result. For requests that
    /// extract to multiple spans of different lengths.
    pub fn keyed<S: Into<String>>(pairs: impl IntoIterator<Item = (S, Vec<Entity>)>) -> Self {
        Self {
            canned: Canned::Keyed(pairs.into_iter().map(|(t, e)| (t.into(), e)).collect()),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_with(error: DetectError) -> Self {
        Self {
            canned: Canned::Fixed(Vec::new()),
            fail_with: Some(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every text the client was asked to analyze, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("mock mutex poisoned").clone()
    }
}

#[async_trait]
impl PiiDetectorClient for MockPiiDetectorClient {
    async fn detect(
        &self,
        text: &str,
        _categories: &[String],
        _score_threshold: f32,
        _language: &str,
    ) -> Result<Vec<Entity>, DetectError> {
        self.calls
            .lock()
            .expect("mock mutex poisoned")
            .push(text.to_string());
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        Ok(match &self.canned {
            Canned::Fixed(entities) => entities.clone(),
            Canned::Keyed(by_text) => by_text.get(text).cloned().unwrap_or_default(),
        })
    }
}
