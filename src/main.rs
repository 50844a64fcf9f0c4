use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signal_checkout::calendar::GoogleCalendarClient;
use signal_checkout::config::Config;
use signal_checkout::db::{create_pool, init_db, queries, AppState};
use signal_checkout::handlers;
use signal_checkout::models::{CreateOrder, Tier};
use signal_checkout::payments::StripeClient;

#[derive(Parser, Debug)]
#[command(name = "signal-checkout")]
#[command(about = "Checkout and fulfillment backend for the Signal coaching service")]
struct Cli {
    /// Seed the database with a paid dev order (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds a paid coaching order so the intake and booking endpoints can be
/// exercised without going through a real payment.
fn seed_dev_order(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let order = queries::create_order(
        &conn,
        &CreateOrder {
            email: "dev@signal.local".to_string(),
            full_name: "Dev Customer".to_string(),
            tier: Tier::Coaching,
        },
    )
    .expect("Failed to create dev order");

    queries::mark_order_paid(
        &conn,
        &order.request_id,
        Some("pi_dev_seed"),
        order.product_type.paid_label(),
    )
    .expect("Failed to mark dev order paid");

    tracing::info!("============================================");
    tracing::info!("DEV ORDER SEEDED (paid, coaching tier)");
    tracing::info!("request_id: {}", order.request_id);
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signal_checkout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let calendar = match (
        &config.google_calendar_credentials,
        &config.google_calendar_id,
    ) {
        (Some(credentials), Some(calendar_id)) => {
            match GoogleCalendarClient::from_json(credentials, calendar_id.clone()) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::warn!("Calendar integration disabled: {}", e);
                    None
                }
            }
        }
        _ => {
            tracing::info!("Calendar integration not configured");
            None
        }
    };

    let state = AppState {
        db: db_pool,
        stripe: StripeClient::new(&config.stripe),
        calendar,
        prices: config.prices.clone(),
        frontend_url: config.frontend_url.clone(),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set SIGNAL_ENV=dev)");
        } else {
            seed_dev_order(&state);
        }
    }

    let app = Router::new()
        .merge(handlers::router(config.rate_limits))
        .merge(handlers::webhook_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Signal checkout server listening on {}", addr);

    // into_make_service_with_connect_info enables IP-based rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
