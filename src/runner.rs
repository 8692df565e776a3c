use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::fetch::Fetcher;
use crate::model::{FetchError, FetchRequest, InstructorRecord};
use crate::parser::{Parser, extract_title};
use crate::storage::SupabaseStorage;
use crate::utils::now_iso;

const DEMO_URL: &str = "https://example.com";

/// Demo mode: one fetch of a known-good page and one upsert, so a fresh
/// deployment can confirm data arrives in the table end to end.
pub async fn run_demo(cfg: &AppConfig, fetcher: &dyn Fetcher, storage: &SupabaseStorage) {
    info!("TEST_MODE=1 → demo insert from {}", DEMO_URL);
    let request = FetchRequest::for_url(DEMO_URL);
    let page = match fetcher.fetch(&request).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Demo fetch failed: {}", e);
            return;
        }
    };
    let row = InstructorRecord {
        name: None,
        postcode: None,
        phone: None,
        website: None,
        source_url: DEMO_URL.to_string(),
        title: extract_title(&page.html).unwrap_or_else(|| "Example Domain".to_string()),
        fetched_at: now_iso(),
    };
    if let Err(e) = storage.upsert_rows(&[row], &cfg.upsert_on).await {
        warn!("Failed to upsert: {}", e);
    }
}

/// Real mode: strictly sequential. Each postcode is fetched and fully
/// resolved (retries and cooldowns included) before the next begins, with
/// a polite delay between keys. Rows are batched and written once at the
/// end. Every per-key failure is a skip, never an abort.
pub async fn run_real(
    cfg: &AppConfig,
    fetcher: &dyn Fetcher,
    parser: &dyn Parser,
    storage: &SupabaseStorage,
) {
    let mut all_rows: Vec<InstructorRecord> = Vec::new();

    for raw in &cfg.postcodes {
        let Some(request) = FetchRequest::for_postcode(raw, &cfg.search_url_template) else {
            warn!("Skipping empty postcode entry {:?}", raw);
            continue;
        };
        info!("Fetching {} → {}", request.postcode, request.url);

        match fetcher.fetch(&request).await {
            Ok(page) => {
                info!(
                    "Fetched {} (HTTP {}, {} bytes)",
                    request.postcode,
                    page.status,
                    page.html.len()
                );
                match parser.parse(&page.html, &request) {
                    Ok(rows) => {
                        info!("Parsed {} rows for {}", rows.len(), request.postcode);
                        all_rows.extend(rows);
                    }
                    Err(e) => warn!("Parse error for {}: {}", request.postcode, e),
                }
            }
            Err(FetchError::Blocked) => {
                warn!(
                    "🚫 Blocked (403) for {} — site may block cloud IPs",
                    request.url
                );
            }
            Err(FetchError::RateLimited) => {
                warn!("Rate limit held for {} after cooldown — skipping", request.postcode);
            }
            Err(e) => warn!("Fetch failed for {}: {}", request.postcode, e),
        }

        // Politeness pacing between successive keys.
        sleep(cfg.request_delay).await;
    }

    if let Err(e) = storage.upsert_rows(&all_rows, &cfg.upsert_on).await {
        warn!("Failed to upsert: {}", e);
    }
}
