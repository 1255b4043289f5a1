use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Serena";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory (`~/Serena/` on all platforms).
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Serena")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "serena=info,tower_http=info"
}

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Shared secret for the webhook GET verification handshake.
    pub verify_token: String,
    /// Base URL of the text-generation service the classifier calls.
    pub classifier_base_url: String,
    /// Ordered candidate model identifiers (primary first).
    pub classifier_models: Vec<String>,
    /// Per-request timeout for classifier calls, in seconds.
    pub classifier_timeout_secs: u64,
    /// Create a demo patient with two caregivers when the database is empty.
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr = env_or("SERENA_BIND_ADDR", "127.0.0.1:5000")
            .parse()
            .expect("SERENA_BIND_ADDR must be host:port");
        let db_path = std::env::var("SERENA_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir().join("serena.db"));
        let models = env_or("CLASSIFIER_MODELS", "gemma3:12b,gemma3:4b,llama3.1:8b")
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        Self {
            bind_addr,
            db_path,
            verify_token: env_or("WHATSAPP_VERIFY_TOKEN", "serena-dev-token"),
            classifier_base_url: env_or("CLASSIFIER_BASE_URL", "http://localhost:11434"),
            classifier_models: models,
            classifier_timeout_secs: env_or("CLASSIFIER_TIMEOUT_SECS", "120")
                .parse()
                .unwrap_or(120),
            seed_demo_data: env_or("SERENA_SEED_DEMO", "false") == "true",
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Serena"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn env_or_returns_default_when_unset() {
        assert_eq!(env_or("SERENA_TEST_UNSET_VAR", "fallback"), "fallback");
    }
}
