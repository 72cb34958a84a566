use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Solace";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generative-model backend (Google Generative Language API).
pub const DEFAULT_GENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GENAI_MODEL: &str = "gemini-pro";

/// Get the application data directory
/// ~/Solace/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Path of the SQLite file backing the key-value store.
pub fn store_path() -> PathBuf {
    app_data_dir().join("solace.db")
}

/// Address the HTTP server binds to. Overridable via `SOLACE_ADDR`.
pub fn bind_addr() -> SocketAddr {
    std::env::var("SOLACE_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8787)))
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=warn", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn store_path_under_app_data() {
        let path = store_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("solace.db"));
    }

    #[test]
    fn bind_addr_has_default() {
        // SOLACE_ADDR is not set in the test environment
        let addr = bind_addr();
        assert_eq!(addr.port(), 8787);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn default_filter_names_this_crate() {
        assert!(default_log_filter().starts_with("solace="));
    }
}
