use reservation_server::core::{AppState, Config, StorageBackend};
use reservation_server::create_router;
use reservation_server::maintenance::{MaintenanceConfig, start_maintenance};
use reservation_server::repositories::InMemoryStore;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG sovrascrive il filtro di default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reservation_server=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;
    config.print_info();

    let state = match config.storage_backend {
        StorageBackend::MySql => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set in .env file")?;

            let pool = MySqlPoolOptions::new()
                .max_connections(config.max_connections)
                .max_lifetime(Duration::from_secs(config.connection_lifetime_secs))
                .connect(database_url)
                .await?;
            info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Migrations applied");

            AppState::with_mysql(pool, config.jwt_secret.clone())
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage: data is lost on restart");
            AppState::in_memory(Arc::new(InMemoryStore::new()), config.jwt_secret.clone())
        }
    };
    let state = Arc::new(state.with_reminder_horizon(config.reminder_horizon_hours));

    if config.lock_cleanup_interval_secs > 0 {
        tokio::spawn(start_maintenance(
            state.reservations.clone(),
            MaintenanceConfig {
                interval_secs: config.lock_cleanup_interval_secs,
                reminder_horizon_hours: config.reminder_horizon_hours,
            },
        ));
    } else {
        info!("Background maintenance disabled");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
