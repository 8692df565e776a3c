pub mod direct;
pub mod pool;
pub mod relay;
pub mod traits;

pub use direct::{DirectFetcher, RetryPolicy};
pub use pool::ProxyPoolFetcher;
pub use relay::RelayFetcher;
pub use traits::Fetcher;

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, DNT, HeaderMap, HeaderValue, PRAGMA, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

use crate::config::TransportConfig;

/// Static browser-like header set sent on every attempt. Keeps the most
/// trivial bot-blocking at bay; nothing here is computed per request.
pub(crate) fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
             AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/126.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers
}

/// Builds the fetcher for the configured transport strategy. Called once
/// at startup; the choice is fixed for the process lifetime.
pub fn select_fetcher(
    transport: &TransportConfig,
    retry: RetryPolicy,
) -> Result<Box<dyn Fetcher>, reqwest::Error> {
    match transport {
        TransportConfig::Direct => Ok(Box::new(DirectFetcher::new(retry)?)),
        TransportConfig::FetchProxy {
            endpoint,
            api_key,
            country_code,
            render_js,
        } => Ok(Box::new(RelayFetcher::new(
            endpoint.clone(),
            api_key.clone(),
            country_code.clone(),
            *render_js,
        )?)),
        TransportConfig::ProxyPool { candidates } => {
            Ok(Box::new(ProxyPoolFetcher::new(candidates.clone())))
        }
    }
}
