//! In-process credential store.

use super::{Credential, CredentialError, CredentialStore};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Credential store that lives only as long as the process.
///
/// Used by tests and by embedders that hand credentials over directly.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one credential.
    #[must_use]
    pub fn with_credential(target: &str, credential: Credential) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_owned(), credential);
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self, target: &str) -> Result<Option<Credential>, CredentialError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
            .cloned())
    }

    fn save(&self, target: &str, credential: &Credential) -> Result<(), CredentialError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_owned(), credential.clone());
        Ok(())
    }

    fn delete(&self, target: &str) -> Result<(), CredentialError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(target);
        Ok(())
    }
}
