//! Runtime configuration read from environment variables at startup and
//! passed by value to whatever embeds the crate.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the portal REST backend. Single origin, fixed per client.
    pub api_url: String,
    /// Where the cookie file lives. Stands in for the browser cookie jar.
    pub cookie_file: PathBuf,
}

impl PortalConfig {
    pub fn from_env() -> Self {
        let api_url =
            std::env::var("EOPORTAL_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let cookie_file = std::env::var("EOPORTAL_COOKIE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".eoportal").join("cookies.json"));
        Self { api_url, cookie_file }
    }

    pub fn with_api_url<S: Into<String>>(mut self, url: S) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_cookie_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.cookie_file = path.into();
        self
    }
}
