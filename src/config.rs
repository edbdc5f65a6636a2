use std::time::Duration;

const DEFAULT_PORT: u16 = 7001;
const DEFAULT_ROLL_TIMEOUT_SECS: u64 = 0;
const DEFAULT_PLACEMENT_TIMEOUT_SECS: u64 = 90;
const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Process-wide settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// `development` enables debug logging
    pub environment: String,
    /// Roll on behalf of a player idle this long; None disables
    pub roll_timeout: Option<Duration>,
    /// Place remaining edges on behalf of a player idle this long; None disables
    pub placement_timeout: Option<Duration>,
    /// How often the turn timer checks deadlines
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Read settings from the process environment, after loading `.env` if present
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read_u64 = |key: &str, fallback: u64| {
            lookup(key)
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .unwrap_or(fallback)
        };
        let timeout = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

        let port = lookup("PORT")
            .and_then(|raw| raw.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            port,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "production".to_string()),
            roll_timeout: timeout(read_u64("ROLL_TIMEOUT_SECS", DEFAULT_ROLL_TIMEOUT_SECS)),
            placement_timeout: timeout(read_u64(
                "PLACEMENT_TIMEOUT_SECS",
                DEFAULT_PLACEMENT_TIMEOUT_SECS,
            )),
            sweep_interval: Duration::from_millis(
                read_u64("TIMER_SWEEP_INTERVAL_MS", DEFAULT_SWEEP_INTERVAL_MS).max(1),
            ),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment.as_str(), "development" | "dev")
    }

    /// Default tracing filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.is_development() {
            "boxbet=debug,tower_http=debug"
        } else {
            "boxbet=info,tower_http=warn"
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
