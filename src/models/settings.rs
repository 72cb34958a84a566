use serde::{Deserialize, Serialize};

use crate::config;

/// Branding and appearance settings, persisted under a single key.
///
/// `logo_url` carries whatever the UI staged (typically a data URL); the
/// core treats it as an opaque string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub app_name: String,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: config::APP_NAME.to_string(),
            dark_mode: false,
            logo_url: None,
        }
    }
}
