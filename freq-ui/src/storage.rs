//! Browser `localStorage` as the legend ramp store.

use freq_core::error::{FreqError, Result};
use freq_core::legend::RampStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    fn storage() -> Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| FreqError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(|e| FreqError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| FreqError::Storage("localStorage unavailable".to_string()))
    }
}

impl RampStore for LocalStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| FreqError::Storage(format!("{:?}", e)))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| FreqError::Storage(format!("{:?}", e)))
    }
}
