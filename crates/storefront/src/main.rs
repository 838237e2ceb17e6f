//! Tienda storefront server.
//!
//! Serves the catalog, cart, checkout, account and admin pages. On startup
//! it can apply migrations and seed baseline data (`STOREFRONT_BOOTSTRAP`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::time::Duration;

use sentry::integrations::tracing as sentry_tracing;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tienda_storefront::config::StorefrontConfig;
use tienda_storefront::state::AppState;
use tienda_storefront::{app, bootstrap, db};

/// How often expired sessions are purged from the store.
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tienda_storefront=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber.
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Storefront terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&config.database_url, config.log_statements).await?;
    tracing::info!("Database pool created");

    let session_store = PostgresStore::new(pool.clone());

    if config.bootstrap.enabled {
        bootstrap(&pool, &config).await?;
        session_store.migrate().await?;
    } else {
        tracing::info!("Bootstrap disabled; run `tienda migrate` and `tienda seed` manually");
    }

    tokio::task::spawn(purge_expired_sessions(session_store.clone()));

    let addr = config.socket_addr();
    let state = AppState::new(config, pool);

    let app = app(state, session_store)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("storefront listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically delete expired sessions from the store.
async fn purge_expired_sessions(store: PostgresStore) {
    let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = store.delete_expired().await {
            tracing::warn!(error = %e, "Failed to purge expired sessions");
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
