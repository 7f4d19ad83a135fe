//! Shared "call the orchestrator, then forward to the right provider"
//! glue used by both the chat-completions and completions routes.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use proxy_core::{ProviderEndpoint, StreamError};
use proxy_mask::{ResponseUnmasker, StreamShape, StreamTransformer};
use proxy_orchestrator::Dispatch;
use serde_json::Value;

/// `providers.default` is the remote provider masked requests forward to;
/// `providers.on_prem` is where route-mode diverts unmasked requests that
/// contain sensitive content.
const DEFAULT_PROVIDER: &str = "default";
const ON_PREM_PROVIDER: &str = "on_prem";

fn provider_endpoint<'a>(
    state: &'a AppState,
    name: &str,
) -> ApiResult<&'a ProviderEndpoint> {
    state.config.providers.get(name).ok_or_else(|| {
        ApiError::from(proxy_core::ProxyError::Config(
            proxy_core::ConfigError::MissingRequired {
                field: format!("providers.{name}"),
            },
        ))
    })
}

pub async fn dispatch_and_forward(
    state: &AppState,
    request: &Value,
    shape: StreamShape,
) -> ApiResult<Response> {
    let dispatch = state
        .orchestrator
        .process(request)
        .await
        .map_err(ApiError::from)?;

    let (outgoing_request, context, provider_name) = match dispatch {
        Dispatch::Forward { request, context } => (request, context, DEFAULT_PROVIDER),
        Dispatch::RouteOnPrem { request } => {
            (request, proxy_core::PlaceholderContext::new(), ON_PREM_PROVIDER)
        }
    };

    let provider = provider_endpoint(state, provider_name)?;
    let is_streaming = outgoing_request
        .get("stream")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let endpoint = if matches!(shape, StreamShape::ChatDelta) {
        "/v1/chat/completions"
    } else {
        "/v1/completions"
    };
    let url = format!("{}{}", provider.base_url.trim_end_matches('/'), endpoint);

    let client = reqwest::Client::new();
    let upstream = client
        .post(&url)
        .bearer_auth(&provider.api_key)
        .json(&outgoing_request)
        .send()
        .await
        .map_err(|e| {
            ApiError::from(proxy_core::ProxyError::Stream(StreamError::UpstreamFailure {
                status: 502,
                message: e.to_string(),
            }))
        })?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(ApiError::from(proxy_core::ProxyError::Stream(
            StreamError::UpstreamFailure {
                status: status.as_u16(),
                message: format!("upstream returned {status}"),
            },
        )));
    }

    if !is_streaming {
        let body: Value = upstream.json().await.map_err(|e| {
            ApiError::from(proxy_core::ProxyError::Stream(StreamError::UpstreamFailure {
                status: 502,
                message: format!("undecodable upstream body: {e}"),
            }))
        })?;
        let unmasker = if state.config.masking.show_markers {
            ResponseUnmasker::annotating(state.config.masking.marker_text.clone())
        } else {
            ResponseUnmasker::restoring()
        };
        let extractor = proxy_extract::RequestExtractorDyn::for_request(request)
            .map_err(proxy_core::ProxyError::Extract)
            .map_err(ApiError::from)?;
        let unmasked = extractor.unmask_response(&body, &unmasker, &context);
        return Ok(axum::Json(unmasked).into_response());
    }

    Ok(stream_response(upstream, shape, context))
}

/// Drives `upstream` one chunk at a time, feeding every chunk (and, on a
/// read error, the residual buffer) through the transformer. Providers
/// terminate with a `data: [DONE]\n\n` frame, which already flushes the
/// lookahead buffer via `StreamTransformer::transform_frame`, but a
/// well-behaved provider is not guaranteed: `Phase::Flushing` runs one more
/// time after the upstream stream yields `None` so a still-buffered partial
/// frame or carry-over is always emitted before the response body ends,
/// per spec.md §4.9's EOF-flush requirement.
enum Phase {
    Streaming,
    Flushing,
    Done,
}

struct StreamState {
    upstream: std::pin::Pin<Box<dyn futures_util::Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>,
    transformer: StreamTransformer,
    context: proxy_core::PlaceholderContext,
    phase: Phase,
}

fn stream_response(
    upstream: reqwest::Response,
    shape: StreamShape,
    context: proxy_core::PlaceholderContext,
) -> Response {
    use futures_util::StreamExt;

    let state = StreamState {
        upstream: Box::pin(upstream.bytes_stream()),
        transformer: StreamTransformer::new(shape),
        context,
        phase: Phase::Streaming,
    };

    let byte_stream = futures_util::stream::unfold(state, |mut state| async move {
        loop {
            match state.phase {
                Phase::Streaming => match state.upstream.next().await {
                    Some(Ok(bytes)) => {
                        let text = String::from_utf8_lossy(&bytes);
                        let out = state.transformer.push(&text, &state.context);
                        return Some((Ok::<_, std::io::Error>(out.into_bytes()), state));
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "upstream stream read failed");
                        let out = state.transformer.finish(&state.context);
                        state.phase = Phase::Done;
                        return Some((Ok(out.into_bytes()), state));
                    }
                    None => {
                        state.phase = Phase::Flushing;
                        continue;
                    }
                },
                Phase::Flushing => {
                    let out = state.transformer.finish(&state.context);
                    state.phase = Phase::Done;
                    return Some((Ok(out.into_bytes()), state));
                }
                Phase::Done => return None,
            }
        }
    });

    Response::builder()
        .status(axum::http::StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(byte_stream))
        .unwrap_or_else(|_| ApiError::from(proxy_core::ProxyError::Stream(StreamError::Aborted {
            reason: "failed to build streaming response".to_string(),
        }))
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// A provider that closes the connection right after its last frame,
    /// with no `[DONE]` sentinel, must still have its residual lookahead
    /// carry-over reach the client.
    #[tokio::test]
    async fn clean_eof_without_done_sentinel_still_flushes_residual_carry_over() {
        let server = MockServer::start().await;
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"hi [[PERSO\"}}]}\n\n";
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let upstream = client
            .post(format!("{}/v1/chat/completions", server.uri()))
            .send()
            .await
            .unwrap();

        let mut context = proxy_core::PlaceholderContext::new();
        context.allocate("PERSON", "Dr. Sarah Chen");

        let response = stream_response(upstream, StreamShape::ChatDelta, context);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(
            text.contains("[[PERSO"),
            "residual carry-over must still be flushed on a clean EOF with no [DONE] frame, got: {text}"
        );
    }
}
