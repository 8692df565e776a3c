use std::env;
use std::time::Duration;

use crate::model::ConfigError;

/// DVSA find-instructor page; the normalized postcode replaces `{postcode}`.
pub const DEFAULT_SEARCH_URL_TEMPLATE: &str =
    "https://finddrivinginstructor.dvsa.gov.uk/DSAFindNearestWebApp/findNearest.form?postcode={postcode}&lang=en";

const DEFAULT_FETCH_PROXY_URL: &str = "https://api.scraperapi.com/";

/// Transport strategy, resolved once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub enum TransportConfig {
    Direct,
    FetchProxy {
        endpoint: String,
        api_key: String,
        country_code: String,
        render_js: bool,
    },
    ProxyPool {
        candidates: Vec<String>,
    },
}

impl TransportConfig {
    /// Short label for log lines; never includes credentials.
    pub fn name(&self) -> &'static str {
        match self {
            TransportConfig::Direct => "direct",
            TransportConfig::FetchProxy { .. } => "fetch-proxy",
            TransportConfig::ProxyPool { .. } => "proxy-pool",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_key: String,
    pub table_name: String,
    pub upsert_on: String,
    pub test_mode: bool,
    pub postcodes: Vec<String>,
    pub request_delay: Duration,
    pub search_url_template: String,
    pub cooldown: Duration,
    pub cooldown_retries: u32,
    pub transport: TransportConfig,
}

/// Loads configuration from environment variables. Missing Supabase
/// credentials are the only fatal condition; everything else has a
/// default. Malformed numeric values are an error rather than a silent
/// fallback.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let supabase_url = required("SUPABASE_URL")?;
    let supabase_key = required("SUPABASE_KEY")?;

    let transport = resolve_transport();
    // Proxy-pool runs pace slower between keys than direct ones.
    let request_delay = match transport {
        TransportConfig::ProxyPool { .. } => secs_var("PROXY_DELAY", 5.0)?,
        _ => secs_var("REQUEST_DELAY", 1.0)?,
    };

    Ok(AppConfig {
        supabase_url,
        supabase_key,
        table_name: optional("TABLE_NAME").unwrap_or_else(|| "instructors".into()),
        upsert_on: optional("UPSERT_ON").unwrap_or_else(|| "source_url".into()),
        test_mode: parse_flag(&optional("TEST_MODE").unwrap_or_else(|| "1".into())),
        postcodes: split_csv(&optional("POSTCODES").unwrap_or_else(|| "E1,M1,B1".into())),
        request_delay,
        search_url_template: optional("SEARCH_URL_TEMPLATE")
            .unwrap_or_else(|| DEFAULT_SEARCH_URL_TEMPLATE.into()),
        cooldown: secs_var("COOLDOWN_SECS", 30.0)?,
        cooldown_retries: int_var("COOLDOWN_RETRIES", 1)?,
        transport,
    })
}

/// Strategy precedence: an explicit proxy list wins, then a fetch-proxy
/// API key, then plain direct requests.
fn resolve_transport() -> TransportConfig {
    if let Some(list) = optional("PROXY_LIST") {
        return TransportConfig::ProxyPool {
            candidates: split_csv(&list),
        };
    }
    if let Some(api_key) = optional("SCRAPERAPI_KEY") {
        return TransportConfig::FetchProxy {
            endpoint: optional("SCRAPERAPI_URL").unwrap_or_else(|| DEFAULT_FETCH_PROXY_URL.into()),
            api_key,
            country_code: optional("PROXY_COUNTRY").unwrap_or_else(|| "gb".into()),
            render_js: parse_flag(&optional("RENDER_JS").unwrap_or_else(|| "0".into())),
        };
    }
    TransportConfig::Direct
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}

/// Set-but-empty counts as unset.
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn secs_var(name: &'static str, default: f64) -> Result<Duration, ConfigError> {
    match optional(name) {
        None => Ok(Duration::from_secs_f64(default)),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64)
            .ok_or(ConfigError::InvalidVar { var: name, value: raw }),
    }
}

fn int_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidVar { var: name, value: raw }),
    }
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "True" | "yes")
}

pub(crate) fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
