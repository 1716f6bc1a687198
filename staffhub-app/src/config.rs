//! Application configuration, read from environment variables

use staffhub_client::ClientConfig;
use std::path::PathBuf;

/// StaffHub configuration, from environment variables
///
/// A `.env` file in the working directory is honored when present.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Hosted backend project URL
    pub backend_url: String,
    /// Public API key for the hosted backend
    pub backend_api_key: String,
    /// Log level (e.g., "info", "debug")
    pub log_level: String,
    /// Optional directory for file logging
    pub log_dir: Option<String>,
    /// Where the current session is persisted between launches
    pub session_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            backend_url: std::env::var("STAFFHUB_BACKEND_URL")
                .expect("STAFFHUB_BACKEND_URL must be set"),
            backend_api_key: std::env::var("STAFFHUB_BACKEND_API_KEY")
                .expect("STAFFHUB_BACKEND_API_KEY must be set"),
            log_level: std::env::var("STAFFHUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: std::env::var("STAFFHUB_LOG_DIR").ok(),
            session_file: std::env::var("STAFFHUB_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("staffhub_session.json")),
        }
    }

    /// Client configuration for the hosted backend
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.backend_url, &self.backend_api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        // SAFETY: test process, no concurrent env access to these keys
        unsafe {
            std::env::set_var("STAFFHUB_BACKEND_URL", "https://demo.example.com");
            std::env::set_var("STAFFHUB_BACKEND_API_KEY", "anon-key");
            std::env::remove_var("STAFFHUB_LOG_LEVEL");
            std::env::remove_var("STAFFHUB_SESSION_FILE");
        }

        let config = AppConfig::from_env();
        assert_eq!(config.backend_url, "https://demo.example.com");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.session_file, PathBuf::from("staffhub_session.json"));

        let client = config.client_config();
        assert_eq!(client.base_url, "https://demo.example.com");
        assert_eq!(client.api_key, "anon-key");
    }
}
