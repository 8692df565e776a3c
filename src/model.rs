// Core structs: FetchRequest, Page, InstructorRecord + the error taxonomy
use serde::Serialize;
use thiserror::Error;

use crate::normalizer::normalize_postcode;

/// One lookup to perform: the normalized search key and the URL it
/// substitutes into. Consumed exactly once by a [`Fetcher`](crate::fetch::Fetcher).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub postcode: String,
    pub url: String,
}

impl FetchRequest {
    /// Builds a request from a raw postcode and a URL template containing
    /// a `{postcode}` substitution point. Returns `None` when the key is
    /// empty after normalization.
    pub fn for_postcode(raw: &str, template: &str) -> Option<Self> {
        let postcode = normalize_postcode(raw);
        if postcode.is_empty() {
            return None;
        }
        let url = template.replace("{postcode}", &postcode);
        Some(Self { postcode, url })
    }

    /// A request for a literal URL with no substitution (demo mode).
    pub fn for_url(url: &str) -> Self {
        Self {
            postcode: String::new(),
            url: url.to_string(),
        }
    }
}

/// Successful fetch outcome: the page body and the final HTTP status.
#[derive(Debug, Clone)]
pub struct Page {
    pub html: String,
    pub status: u16,
}

/// One row bound for the instructors table. Optional fields serialize as
/// JSON null; the sink enforces uniqueness via the conflict column.
#[derive(Debug, Clone, Serialize)]
pub struct InstructorRecord {
    pub name: Option<String>,
    pub postcode: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub source_url: String,
    pub title: String,
    pub fetched_at: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("blocked by target (HTTP 403)")]
    Blocked,
    #[error("rate limited (HTTP 429) and cooldown retry failed")]
    RateLimited,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("retries exhausted after {0} attempts")]
    ExhaustedRetries(u32),
    #[error("all {0} proxies exhausted")]
    ExhaustedProxies(usize),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("selector error: {0}")]
    Selector(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("datastore request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("datastore API error [{status}]: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} missing")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },
}
