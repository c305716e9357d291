use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::config::{Args, ProviderKind};
use crate::providers::{self, Provider, ProviderSettings};
use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub rate_limiter: RateLimiter,
    pub provider_kind: ProviderKind,
    pub provider: Option<Arc<dyn Provider>>, // None when the API key is missing
    pub cache: ResponseCache,
    pub variations: u32, // rewrites asked per request
    pub upstream_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(
        rate_limiter: RateLimiter,
        provider_kind: ProviderKind,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        Self {
            rate_limiter,
            provider_kind,
            provider,
            cache: ResponseCache::new(Duration::ZERO),
            variations: 6,
            upstream_timeout: None,
        }
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_variations(mut self, variations: u32) -> Self {
        self.variations = variations;
        self
    }

    pub fn with_upstream_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    pub fn from_args(args: &Args, client: reqwest::Client) -> Self {
        let provider = providers::build(
            ProviderSettings {
                kind: args.provider,
                api_key: args.api_key(),
                model: args.model.clone(),
                base_url: args.base_url.clone(),
            },
            client,
        );

        Self::new(
            RateLimiter::new(args.rate_limit, args.rate_window()),
            args.provider,
            provider,
        )
        .with_cache(ResponseCache::new(args.cache_ttl()))
        .with_variations(args.variations)
        .with_upstream_timeout(args.upstream_timeout())
    }
}
