//! The masking orchestrator: extract spans, fan out the secret scanner and
//! PII detector concurrently, resolve conflicts per span, mask sequentially
//! (one shared context), reassemble, and decide whether to forward or route
//! on-premise.

use proxy_core::{DispatchMode, Entity, PlaceholderContext, ProxyConfig, ProxyResult};
use proxy_detect::{PiiDetectorClient, SecretScanner};
use proxy_extract::{RequestExtractor, RequestExtractorDyn};
use proxy_mask::{ConflictResolver, SpanMasker, Whitelist};
use serde_json::Value;
use std::sync::Arc;

/// What the caller should do with this request after orchestration.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// Send `request` to the remote provider. In mask mode this is the
    /// scrubbed request and `context` reverses it on the way back; in route
    /// mode with nothing detected this is the original request untouched
    /// and `context` is empty.
    Forward {
        request: Value,
        context: PlaceholderContext,
    },
    /// Send the ORIGINAL, unmodified request to the on-premise provider
    /// instead (route mode, entities detected).
    RouteOnPrem { request: Value },
}

pub struct MaskingOrchestrator<D> {
    detector: D,
    scanner: SecretScanner,
    resolver: ConflictResolver,
    masker: SpanMasker,
    config: Arc<ProxyConfig>,
}

impl<D: PiiDetectorClient> MaskingOrchestrator<D> {
    pub fn new(detector: D, config: Arc<ProxyConfig>) -> Self {
        Self {
            detector,
            scanner: SecretScanner::new(),
            resolver: ConflictResolver::new(),
            masker: SpanMasker::new(),
            config,
        }
    }

    pub async fn process(&self, request: &Value) -> ProxyResult<Dispatch> {
        let extractor = RequestExtractorDyn::for_request(request)?;
        let spans = extractor.extract(request)?;
        tracing::debug!(span_count = spans.len(), "extracted text spans from request");

        let scanner_entities: Vec<Vec<Entity>> =
            spans.iter().map(|span| self.scanner.scan(&span.text)).collect();
        let scanner_hits: usize = scanner_entities.iter().map(Vec::len).sum();
        tracing::debug!(scanner_hits, "secret scanner pass complete");

        let detector_entities: Vec<Vec<Entity>> = if self.config.pii_detection.enabled {
            tracing::debug!(span_count = spans.len(), "fanning out detector calls");
            let futures = spans.iter().map(|span| async {
                if span.text.is_empty() {
                    return Ok(Vec::new());
                }
                self.detector
                    .detect(
                        &span.text,
                        &self.config.pii_detection.entities,
                        self.config.pii_detection.score_threshold,
                        self.config
                            .pii_detection
                            .languages
                            .first()
                            .map(String::as_str)
                            .unwrap_or("en"),
                    )
                    .await
            });
            let results = futures_util::future::join_all(futures).await;
            let mut collected = Vec::with_capacity(results.len());
            for result in results {
                match result {
                    Ok(entities) => collected.push(entities),
                    Err(e) => {
                        tracing::warn!(error = %e, "detector call failed");
                        return Err(e.into());
                    }
                }
            }
            let detector_hits: usize = collected.iter().map(Vec::len).sum();
            tracing::debug!(detector_hits, "detector fan-out complete");
            collected
        } else {
            vec![Vec::new(); spans.len()]
        };

        let any_entity_found = scanner_entities.iter().any(|v| !v.is_empty())
            || detector_entities.iter().any(|v| !v.is_empty());

        if self.config.mode == DispatchMode::Route {
            return Ok(if any_entity_found {
                tracing::info!("routing request on-premise: sensitive content detected");
                Dispatch::RouteOnPrem {
                    request: request.clone(),
                }
            } else {
                tracing::debug!("forwarding request unmodified: nothing detected");
                Dispatch::Forward {
                    request: request.clone(),
                    context: PlaceholderContext::new(),
                }
            });
        }

        let whitelist = Whitelist::new(self.config.pii_detection.whitelist.clone());
        let mut context = PlaceholderContext::new();
        let mut masked_spans = Vec::with_capacity(spans.len());
        for (i, span) in spans.iter().enumerate() {
            let mut combined = scanner_entities[i].clone();
            combined.extend(detector_entities[i].clone());
            let resolved = self.resolver.resolve(combined);
            let masked = self.masker.mask(span, &resolved, &whitelist, &mut context);
            masked_spans.push(masked);
        }
        tracing::debug!(
            placeholder_count = context.len(),
            "masking complete, categories redacted, originals not logged"
        );

        let request = extractor.apply(request, &masked_spans)?;
        Ok(Dispatch::Forward { request, context })
    }
}
