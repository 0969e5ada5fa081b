use dotenv::dotenv;
use std::env;
use std::str::FromStr;

const DEFAULT_JWT_SECRET: &str = "un segreto meno bello";

/// Backend di persistenza selezionato all'avvio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MySql,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(StorageBackend::MySql),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!(
                "Invalid STORAGE_BACKEND '{}': expected 'mysql' or 'memory'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub connection_lifetime_secs: u64,
    pub lock_cleanup_interval_secs: u64,
    pub reminder_horizon_hours: i64,
    pub app_env: String,
}

fn parse_var<T: FromStr>(name: &str, default: &str, error: &str) -> Result<T, String> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| error.to_string())
}

/// Un anno: oltre non ha senso e `now + horizon` rischia l'overflow
pub const MAX_REMINDER_HORIZON_HOURS: i64 = 24 * 365;

fn check_reminder_horizon(hours: i64) -> Result<i64, String> {
    if !(1..=MAX_REMINDER_HORIZON_HOURS).contains(&hours) {
        return Err(format!(
            "Invalid REMINDER_HORIZON_HOURS: must be between 1 and {}",
            MAX_REMINDER_HORIZON_HOURS
        ));
    }
    Ok(hours)
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "mysql".to_string())
            .parse::<StorageBackend>()?;

        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::MySql && database_url.is_none() {
            return Err("DATABASE_URL must be set in .env file".to_string());
        }

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            eprintln!("WARNING: JWT_SECRET not set, using default (not secure for production!)");
            DEFAULT_JWT_SECRET.to_string()
        });

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = parse_var::<u16>(
            "SERVER_PORT",
            "3000",
            "Invalid SERVER_PORT: must be a number between 0-65535",
        )?;

        let max_connections = parse_var::<u32>(
            "MAX_DB_CONNECTIONS",
            "20",
            "Invalid MAX_DB_CONNECTIONS: must be a positive number",
        )?;

        let connection_lifetime_secs = parse_var::<u64>(
            "DB_CONNECTION_LIFETIME_SECS",
            "300",
            "Invalid DB_CONNECTION_LIFETIME_SECS: must be a positive number",
        )?;

        let lock_cleanup_interval_secs = parse_var::<u64>(
            "LOCK_CLEANUP_INTERVAL_SECS",
            "60",
            "Invalid LOCK_CLEANUP_INTERVAL_SECS: must be a non-negative number",
        )?;

        let reminder_horizon_hours = parse_var::<i64>(
            "REMINDER_HORIZON_HOURS",
            "24",
            "Invalid REMINDER_HORIZON_HOURS: must be a number",
        )?;
        let reminder_horizon_hours = check_reminder_horizon(reminder_horizon_hours)?;

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            storage_backend,
            database_url,
            jwt_secret,
            server_host,
            server_port,
            max_connections,
            connection_lifetime_secs,
            lock_cleanup_interval_secs,
            reminder_horizon_hours,
            app_env,
        })
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        tracing::info!("Server Configuration:");
        tracing::info!("   Environment: {}", self.app_env);
        tracing::info!("   Server Address: {}:{}", self.server_host, self.server_port);
        tracing::info!("   Storage: {:?}", self.storage_backend);
        if let Some(url) = &self.database_url {
            tracing::info!("   Database: {}", Self::mask_url(url));
            tracing::info!("   Max DB Connections: {}", self.max_connections);
            tracing::info!("   Connection Lifetime: {}s", self.connection_lifetime_secs);
        }
        if self.lock_cleanup_interval_secs == 0 {
            tracing::info!("   Maintenance: disabled");
        } else {
            tracing::info!(
                "   Maintenance: every {}s, reminders {}h ahead",
                self.lock_cleanup_interval_secs,
                self.reminder_horizon_hours
            );
        }
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("   JWT Secret: USING DEFAULT (INSECURE!)");
        } else {
            tracing::info!("   JWT Secret: custom secret configured");
        }
    }

    /// Maschera l'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        "***".to_string()
    }
}
