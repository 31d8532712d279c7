//! `localStorage`-backed [`KeyValueStore`].

use voors_core::{HostError, KeyValueStore, Result};
use web_sys::{Storage, Window};

use super::host::describe;

pub(crate) struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    /// Private browsing modes may throw on access or hand back `null`; both
    /// leave a store whose every call reports [`HostError::Storage`].
    pub(crate) fn open(window: &Window) -> Self {
        let storage = match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                tracing::warn!(err = %describe(&err), "localStorage unavailable");
                None
            }
        };
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| HostError::storage("localStorage unavailable"))
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|err| HostError::storage(describe(&err)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|err| HostError::storage(describe(&err)))
    }
}
