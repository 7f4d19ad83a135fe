//! Shared application state for the axum router.

use std::sync::Arc;

use proxy_core::ProxyConfig;
use proxy_detect::HttpPiiDetectorClient;
use proxy_orchestrator::MaskingOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<MaskingOrchestrator<HttpPiiDetectorClient>>,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Self {
        let config = Arc::new(config);
        let detector = HttpPiiDetectorClient::new(config.pii_detection.presidio_url.clone());
        let orchestrator = Arc::new(MaskingOrchestrator::new(detector, config.clone()));
        Self { orchestrator, config }
    }
}
