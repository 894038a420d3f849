//! fxwatch bot
//!
//! Run with: TELEGRAM_BOT_TOKEN=... cargo run
//!
//! Environment variables:
//! - TELEGRAM_BOT_TOKEN: Bot token (required)
//! - TELEGRAM_API_URL: Bot API base URL (default: https://api.telegram.org)
//! - FXWATCH_RATES_URL: Rate source endpoint (default: https://api.cba.am/exchangerates.asmx)
//! - FXWATCH_CURRENCY: Currency to watch (default: EUR)
//! - FXWATCH_QUOTE_CURRENCY: Currency the rate is quoted in (default: AMD)
//! - FXWATCH_UTC_OFFSET_HOURS: Local time offset for active hours (default: 4)
//! - FXWATCH_INTERVAL_MINUTES: Initial check interval (default: 5)
//! - FXWATCH_HTTP_TIMEOUT_SECS: Outbound request timeout (default: 10)
//! - FXWATCH_HTTP_ADDR: Status endpoint bind address (default: disabled)
//! - RUST_LOG: Log level (default: info)

use std::sync::Arc;

use fxwatch::alerts::{AlertChecker, Evaluator, Scheduler, SubscriberStore};
use fxwatch::api::{run_server, AppState};
use fxwatch::bot::{CommandHandler, TelegramClient, UpdatePoller};
use fxwatch::config::Config;
use fxwatch::rates::RateClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fxwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!("fxwatch configuration:");
    tracing::info!("  Rate source: {}", config.rates_url);
    tracing::info!(
        "  Watching: {} in {}",
        config.currency,
        config.quote_currency
    );
    tracing::info!("  Local offset: {}", config.utc_offset);
    tracing::info!("  Check interval: {} minutes", config.interval_minutes);
    tracing::info!("  HTTP timeout: {:?}", config.http_timeout);
    match &config.http_addr {
        Some(addr) => tracing::info!("  Status endpoint: {}", addr),
        None => tracing::info!("  Status endpoint: DISABLED"),
    }

    let store = SubscriberStore::new();
    let rates = RateClient::new(&config.rates_url, &config.currency, config.http_timeout)?;
    let telegram = TelegramClient::new(
        &config.telegram_api_url,
        &config.bot_token,
        config.http_timeout,
    )?;

    let checker = Arc::new(AlertChecker::new(
        rates,
        store.clone(),
        telegram.clone(),
        Evaluator::new(&config.currency, &config.quote_currency),
        config.utc_offset,
    ));

    let scheduler = Arc::new(Scheduler::new(Arc::clone(&checker)));
    scheduler.start(config.interval_minutes)?;

    let mut handler = CommandHandler::new(
        store.clone(),
        Arc::clone(&scheduler),
        &config.currency,
        &config.quote_currency,
        config.interval_minutes,
    );
    match telegram.get_me().await {
        Ok(me) => match me.username {
            Some(username) => {
                tracing::info!("  Bot username: @{}", username);
                handler = handler.with_bot_username(username);
            }
            None => tracing::warn!("Bot has no username, accepting any command suffix"),
        },
        Err(e) => {
            tracing::warn!(error = %e, "getMe failed, accepting any command suffix");
        }
    }
    let poller = Arc::new(UpdatePoller::new(telegram, handler));
    let poller_handle = Arc::clone(&poller).start();

    let server_handle = config.http_addr.clone().map(|addr| {
        let state = Arc::new(AppState {
            store: store.clone(),
            scheduler: Arc::clone(&scheduler),
            checker: Arc::clone(&checker),
        });
        tokio::spawn(async move {
            if let Err(e) = run_server(&addr, state).await {
                tracing::error!(error = %e, "Status server failed");
            }
        })
    });

    tracing::info!("fxwatch {} running", env!("CARGO_PKG_VERSION"));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping...");

    scheduler.stop();
    poller.stop();
    poller_handle.abort();
    if let Some(handle) = server_handle {
        handle.abort();
    }

    tracing::info!("fxwatch stopped");
    Ok(())
}
