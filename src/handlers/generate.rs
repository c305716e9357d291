use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheKeyParts, make_cache_key};
use crate::client_id;
use crate::error::{GatewayError, RATE_LIMIT_REMAINING, UpstreamError};
use crate::metrics::{
    CACHE_HITS, CACHE_MISSES, DEGRADED_TOTAL, RATE_LIMIT_ENTRIES, REQUEST_LATENCY, REQUEST_TOTAL,
    THROTTLED_TOTAL, UPSTREAM_ERRORS,
};
use crate::models::{GenerateRequest, GenerateResponse};
use crate::prompt::{Format, Prompt, parse_variations};
use crate::state::AppState;

const TEXT_REQUIRED: &str = "Input text is required";

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    REQUEST_TOTAL.inc();

    let client = client_id::resolve(&headers);
    let decision = state.rate_limiter.check(&client);
    RATE_LIMIT_ENTRIES.set(state.rate_limiter.len() as f64);

    if !decision.admitted {
        THROTTLED_TOTAL.inc();
        info!(%client, reset_in = decision.reset_in, "rate limit exceeded");
        return Err(GatewayError::Throttled {
            reset_in: decision.reset_in,
        });
    }

    let kind = state.provider_kind;
    let Some(provider) = state.provider.as_ref() else {
        warn!(provider = kind.display_name(), "API key not configured");
        return Err(GatewayError::MissingApiKey {
            provider: kind.display_name(),
        });
    };

    // body is parsed here rather than by the Json extractor so that
    // admission always runs first
    let request: GenerateRequest = if body.is_empty() {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| GatewayError::BadRequest(format!("Invalid request body: {e}")))?
    };
    let text = request.text().ok_or_else(|| GatewayError::BadRequest(TEXT_REQUIRED.into()))?;

    let format_name = request.format_name();
    let format = Format::from_name(format_name);
    if format.is_none() {
        debug!(format = format_name, "unknown format, using generic prompt");
    }

    let cache_key = make_cache_key(&CacheKeyParts {
        provider: provider.name(),
        model: provider.model(),
        format: format_name,
        variations: state.variations,
        text,
    });

    let output = if let Some(cached) = state.cache.get(&cache_key) {
        CACHE_HITS.inc();
        debug!(%client, "cache hit");
        cached
    } else {
        if state.cache.enabled() {
            CACHE_MISSES.inc();
        }

        let prompt = Prompt::build(text, format, state.variations);
        let start_time = Instant::now();
        let call = provider.generate(&prompt);
        let result = match state.upstream_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(UpstreamError::Timeout(limit.as_secs()))),
            None => call.await,
        };
        REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

        let content = result.map_err(|e| {
            UPSTREAM_ERRORS.inc();
            warn!(%client, provider = provider.name(), error = %e, "generation failed");
            GatewayError::upstream(&e, kind.key_env())
        })?;

        let variations = parse_variations(&content);
        if variations.degraded {
            DEGRADED_TOTAL.inc();
            warn!(%client, "provider output was not valid JSON, returning raw text");
        }
        state.cache.insert(cache_key, variations.items.clone());
        variations.items
    };

    info!(
        %client,
        format = format_name,
        variations = output.len(),
        remaining = decision.remaining,
        "generated"
    );

    Ok((
        [(RATE_LIMIT_REMAINING, decision.remaining.to_string())],
        Json(GenerateResponse { output }),
    )
        .into_response())
}
