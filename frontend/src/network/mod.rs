// Re-export network modules
pub mod api_client;
pub mod config;

// Re-export commonly used items
pub use api_client::ApiClient;
pub use config::ApiConfig;

use std::cell::RefCell;

thread_local! {
    static API_CONFIG: RefCell<ApiConfig> = RefCell::new(ApiConfig::default());
}

/// Store the backend URL.  `None` falls back to the build-time
/// `API_BASE_URL`, then to the local development default.
pub fn init_api_config(url: Option<&str>) {
    let config = match url {
        Some(url) => ApiConfig::from_url(url),
        None => ApiConfig::new().unwrap_or_default(),
    };
    tracing::info!(base_url = config.base_url(), "API configured");
    API_CONFIG.with(|cell| *cell.borrow_mut() = config);
}

pub(crate) fn api_config() -> ApiConfig {
    API_CONFIG.with(|cell| cell.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_with_explicit_url_replaces_default() {
        init_api_config(Some("https://farm.example.com/"));
        assert_eq!(api_config().base_url(), "https://farm.example.com");
    }
}
