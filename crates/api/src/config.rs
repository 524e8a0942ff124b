use scn_core::notice::Supplier;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background services get to drain after shutdown (default: `5`).
    pub shutdown_timeout_secs: u64,
    /// Broadcast buffer of the event bus (default: `1024`).
    pub event_bus_capacity: usize,
    /// PostgreSQL URL. `None` runs the server on in-memory stores.
    pub database_url: Option<String>,
    /// Suppliers registered at startup when running in memory.
    pub seed_suppliers: Vec<Supplier>,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5`                     |
    /// | `EVENT_BUS_CAPACITY`    | `1024`                  |
    /// | `DATABASE_URL`          | unset (in-memory)       |
    /// | `SEED_SUPPLIERS`        | empty                   |
    ///
    /// `SEED_SUPPLIERS` is a comma-separated list of `id:name` pairs, e.g.
    /// `100:Acme Castings,200:Beta Plastics`.
    ///
    /// # Panics
    ///
    /// Panics on unparseable numbers and on missing JWT settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let event_bus_capacity: usize = std::env::var("EVENT_BUS_CAPACITY")
            .unwrap_or_else(|_| scn_events::bus::DEFAULT_CAPACITY.to_string())
            .parse()
            .expect("EVENT_BUS_CAPACITY must be a valid usize");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let seed_suppliers = parse_suppliers(&std::env::var("SEED_SUPPLIERS").unwrap_or_default());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            event_bus_capacity,
            database_url,
            seed_suppliers,
            jwt,
        }
    }
}

/// Parse `id:name` pairs.
///
/// # Panics
///
/// Panics on a malformed pair.
fn parse_suppliers(raw: &str) -> Vec<Supplier> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (id, name) = pair
                .split_once(':')
                .unwrap_or_else(|| panic!("Invalid SEED_SUPPLIERS entry '{pair}'"));
            Supplier {
                id: id
                    .trim()
                    .parse()
                    .unwrap_or_else(|e| panic!("Invalid supplier id in '{pair}': {e}")),
                name: name.trim().to_string(),
            }
        })
        .collect()
}
