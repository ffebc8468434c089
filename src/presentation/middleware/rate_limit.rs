use crate::infrastructure::config::RateLimitConfig;
use axum::{body::Body, extract::ConnectInfo};
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, errors::GovernorError, governor::GovernorConfigBuilder,
    key_extractor::KeyExtractor,
};

pub type RateLimitLayer = GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, Body>;

/// Keys requests by peer address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmartIpKeyExtractor;

impl KeyExtractor for SmartIpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(&self, req: &axum::http::Request<B>) -> Result<Self::Key, GovernorError> {
        // Requests built in-process (tests) carry no connection info
        Ok(req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

/// `max_requests` per client within `window_secs`, refilled evenly over the window.
/// `None` when the limit is disabled.
pub fn rate_limit_layer(config: RateLimitConfig) -> anyhow::Result<Option<RateLimitLayer>> {
    if config.max_requests == 0 || config.window_secs == 0 {
        return Ok(None);
    }

    let replenish_ms = (config.window_secs * 1000 / u64::from(config.max_requests)).max(1);

    let governor = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(config.max_requests)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to finish governor config"))?,
    );

    tracing::debug!(
        max_requests = config.max_requests,
        window_secs = config.window_secs,
        "rate limit enabled"
    );
    Ok(Some(GovernorLayer::new(governor)))
}
