use dvsa_scout::config::load_config;
use dvsa_scout::fetch::{RetryPolicy, select_fetcher};
use dvsa_scout::parser::DvsaParser;
use dvsa_scout::runner;
use dvsa_scout::storage::SupabaseStorage;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    // Load configuration from the environment; missing credentials abort
    // before any fetching begins.
    let cfg = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            std::process::exit(1);
        }
    };

    let storage = match SupabaseStorage::new(&cfg.supabase_url, &cfg.supabase_key, &cfg.table_name)
    {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize storage client: {}", e);
            std::process::exit(1);
        }
    };

    let retry = RetryPolicy {
        cooldown: cfg.cooldown,
        cooldown_retries: cfg.cooldown_retries,
        ..RetryPolicy::default()
    };
    let fetcher = match select_fetcher(&cfg.transport, retry) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to build fetcher: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "🚀 dvsa-scout started (transport: {}, test_mode: {})",
        cfg.transport.name(),
        cfg.test_mode
    );

    if cfg.test_mode {
        runner::run_demo(&cfg, fetcher.as_ref(), &storage).await;
    } else {
        let parser = DvsaParser::new();
        runner::run_real(&cfg, fetcher.as_ref(), &parser, &storage).await;
    }

    info!("Done.");
}
