/// API route configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    /// Points at the local development backend.  Production code calls
    /// `init_api_config()` so the real URL (injected at build time via the
    /// `API_BASE_URL` environment variable, or at runtime from JavaScript)
    /// replaces this before the first request.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create a new ApiConfig from the API_BASE_URL environment variable
    pub fn new() -> Result<Self, &'static str> {
        if let Some(url) = option_env!("API_BASE_URL") {
            Ok(Self::from_url(url))
        } else {
            Err("API_BASE_URL environment variable is not set")
        }
    }

    /// Create a new ApiConfig from a URL string
    pub fn from_url(url: &str) -> Self {
        Self { base_url: url.trim().trim_end_matches('/').to_string() }
    }

    /// Get the base URL for all API calls
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get a full API URL for a given path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}/api{}", self.base_url, path)
        } else {
            format!("{}/api/{}", self.base_url, path)
        }
    }
}
