//! Configuration for the masking proxy.
//!
//! Every field has a documented environment variable and a sensible
//! default; `from_env()` never panics on a missing optional var.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Global dispatch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum DispatchMode {
    /// Outbound traffic is scrubbed and forwarded to the remote provider.
    Mask,
    /// Presence of PII diverts the request to an on-premise model, unscrubbed.
    Route,
}

impl Default for DispatchMode {
    fn default() -> Self {
        DispatchMode::Mask
    }
}

/// `pii_detection.*` options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PiiDetectionConfig {
    pub enabled: bool,
    pub presidio_url: String,
    pub entities: Vec<String>,
    pub score_threshold: f32,
    pub whitelist: Vec<String>,
    pub languages: Vec<String>,
}

impl Default for PiiDetectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            presidio_url: "http://localhost:3000".to_string(),
            entities: vec![
                "PERSON".to_string(),
                "EMAIL_ADDRESS".to_string(),
                "PHONE_NUMBER".to_string(),
                "CREDIT_CARD".to_string(),
                "LOCATION".to_string(),
            ],
            score_threshold: 0.5,
            whitelist: Vec::new(),
            languages: vec!["en".to_string()],
        }
    }
}

/// `masking.*` options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MaskingConfig {
    pub show_markers: bool,
    pub marker_text: String,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            show_markers: false,
            marker_text: "[protected]".to_string(),
        }
    }
}

/// `providers.{name}.*` forwarding target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key: String,
}

/// Master configuration struct for the masking proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProxyConfig {
    pub pii_detection: PiiDetectionConfig,
    pub masking: MaskingConfig,
    pub mode: DispatchMode,
    pub providers: HashMap<String, ProviderEndpoint>,
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PROXY_PII_ENABLED`: "true" or "false" (default: true)
    /// - `PROXY_PII_PRESIDIO_URL`: analyzer base URL (default: http://localhost:3000)
    /// - `PROXY_PII_ENTITIES`: comma-separated category list
    /// - `PROXY_PII_SCORE_THRESHOLD`: minimum confidence in [0,1] (default: 0.5)
    /// - `PROXY_PII_WHITELIST`: comma-separated substrings never masked
    /// - `PROXY_PII_LANGUAGES`: comma-separated ISO language codes
    /// - `PROXY_MASKING_SHOW_MARKERS`: "true" or "false" (default: false)
    /// - `PROXY_MASKING_MARKER_TEXT`: annotation prefix (default: "[protected]")
    /// - `PROXY_MODE`: "mask" or "route" (default: mask)
    pub fn from_env() -> Self {
        let defaults = PiiDetectionConfig::default();

        let enabled = parse_bool_env("PROXY_PII_ENABLED", true);
        let presidio_url =
            std::env::var("PROXY_PII_PRESIDIO_URL").unwrap_or(defaults.presidio_url);
        let entities = std::env::var("PROXY_PII_ENTITIES")
            .ok()
            .map(|raw| split_csv(&raw))
            .unwrap_or(defaults.entities);
        let score_threshold = std::env::var("PROXY_PII_SCORE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(defaults.score_threshold);
        let whitelist = std::env::var("PROXY_PII_WHITELIST")
            .ok()
            .map(|raw| split_csv(&raw))
            .unwrap_or_default();
        let languages = std::env::var("PROXY_PII_LANGUAGES")
            .ok()
            .map(|raw| split_csv(&raw))
            .unwrap_or(defaults.languages);

        let masking_defaults = MaskingConfig::default();
        let show_markers = parse_bool_env("PROXY_MASKING_SHOW_MARKERS", false);
        let marker_text = std::env::var("PROXY_MASKING_MARKER_TEXT")
            .unwrap_or(masking_defaults.marker_text);

        let mode = match std::env::var("PROXY_MODE").ok().as_deref() {
            Some("route") => DispatchMode::Route,
            _ => DispatchMode::Mask,
        };

        let mut providers = HashMap::new();
        for name in ["default", "on_prem"] {
            if let Some(endpoint) = provider_endpoint_from_env(name) {
                providers.insert(name.to_string(), endpoint);
            }
        }

        Self {
            pii_detection: PiiDetectionConfig {
                enabled,
                presidio_url,
                entities,
                score_threshold,
                whitelist,
                languages,
            },
            masking: MaskingConfig {
                show_markers,
                marker_text,
            },
            mode,
            providers,
        }
    }
}

/// Read `PROXY_PROVIDER_{NAME}_BASE_URL` / `_API_KEY` for `providers.{name}`.
/// Absent if the base URL var is unset; the API key defaults to empty (some
/// on-premise deployments front their model with no auth at all).
fn provider_endpoint_from_env(name: &str) -> Option<ProviderEndpoint> {
    let prefix = format!("PROXY_PROVIDER_{}", name.to_uppercase());
    let base_url = std::env::var(format!("{prefix}_BASE_URL")).ok()?;
    let api_key = std::env::var(format!("{prefix}_API_KEY")).unwrap_or_default();
    Some(ProviderEndpoint { base_url, api_key })
}

fn parse_bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(default)
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
