//! Shared state for the API router.

use std::sync::Arc;

use crate::genai::ChatBackend;
use crate::models::AppSettings;
use crate::store::{keys, KvStore};

/// Shared context for all API routes: the key-value store and the chat
/// backend. Cloned per request; both members are cheap handles.
#[derive(Clone)]
pub struct ApiContext {
    pub store: KvStore,
    pub backend: Arc<dyn ChatBackend>,
}

impl ApiContext {
    pub fn new(store: KvStore, backend: Arc<dyn ChatBackend>) -> Self {
        Self { store, backend }
    }

    /// Current settings, falling back to defaults when nothing is stored.
    pub fn settings(&self) -> Result<AppSettings, crate::store::StoreError> {
        Ok(self
            .store
            .get_json::<AppSettings>(keys::APP_SETTINGS)?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::MockBackend;

    #[test]
    fn settings_default_when_unset() {
        let ctx = ApiContext::new(
            KvStore::open_in_memory().unwrap(),
            Arc::new(MockBackend::new(&[])),
        );
        let settings = ctx.settings().unwrap();
        assert_eq!(settings.app_name, crate::config::APP_NAME);
    }

    #[test]
    fn settings_read_back_from_store() {
        let ctx = ApiContext::new(
            KvStore::open_in_memory().unwrap(),
            Arc::new(MockBackend::new(&[])),
        );
        let custom = AppSettings {
            app_name: "My Clinic".into(),
            dark_mode: true,
            logo_url: None,
        };
        ctx.store.put_json(keys::APP_SETTINGS, &custom).unwrap();
        assert_eq!(ctx.settings().unwrap(), custom);
    }
}
