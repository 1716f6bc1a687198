//! Client configuration

/// Client configuration for connecting to the hosted backend service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project base URL (e.g., "https://abc123.supabase.co")
    pub base_url: String,

    /// Public API key sent with every request
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: 30,
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create a REST table client from this configuration
    pub fn build_rest_client(&self) -> super::RestClient {
        super::RestClient::new(self)
    }

    /// Create an auth client from this configuration
    pub fn build_auth_client(&self) -> super::AuthClient {
        super::AuthClient::new(self)
    }
}
