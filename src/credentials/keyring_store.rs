//! OS credential store backend.
//!
//! Uses the `keyring` crate which provides OS-appropriate secure storage:
//! - **Linux**: Secret Service API (GNOME Keyring, KWallet)
//! - **Windows**: Windows Credential Manager
//! - **macOS**: Keychain Services
//!
//! Account name and password are kept together as one JSON entry so a single
//! lookup yields the whole credential. Every save is read back through a
//! fresh entry; a backend that does not keep what was written (keyring's mock
//! store on platforms without a native one) makes `save` fail.

use super::{Credential, CredentialError, CredentialStore};
use keyring::credential::CredentialBuilder;
use serde::{Deserialize, Serialize};

/// Service name for all mydns-sync entries in the platform credential store.
const SERVICE_NAME: &str = "mydns-sync";

#[derive(Serialize)]
struct StoredEntryRef<'a> {
    principal: &'a str,
    secret: &'a str,
}

#[derive(Deserialize)]
struct StoredEntry {
    principal: String,
    secret: String,
}

/// Credential store backed by the platform keyring.
pub struct KeyringCredentialStore {
    service: String,
    builder: Option<Box<CredentialBuilder>>,
}

impl KeyringCredentialStore {
    /// Create a store using the default service name.
    #[must_use]
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Create a store under a custom service name.
    #[must_use]
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            builder: None,
        }
    }

    /// Use `builder` instead of the platform default backend.
    #[cfg(test)]
    fn with_builder(service: impl Into<String>, builder: Box<CredentialBuilder>) -> Self {
        Self {
            service: service.into(),
            builder: Some(builder),
        }
    }

    fn entry(&self, target: &str) -> Result<keyring::Entry, CredentialError> {
        let entry = match &self.builder {
            Some(builder) => builder
                .build(None, &self.service, target)
                .map(keyring::Entry::new_with_credential),
            None => keyring::Entry::new(&self.service, target),
        };
        entry.map_err(|e| {
            CredentialError::StorageError(format!("Failed to create keyring entry: {e}"))
        })
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self, target: &str) -> Result<Option<Credential>, CredentialError> {
        let encoded = match self.entry(target)?.get_password() {
            Ok(encoded) => encoded,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => {
                return Err(CredentialError::StorageError(format!(
                    "Failed to retrieve credential: {e}"
                )));
            }
        };
        decode(&encoded).map(Some)
    }

    fn save(&self, target: &str, credential: &Credential) -> Result<(), CredentialError> {
        let encoded = encode(credential)?;
        self.entry(target)?.set_password(&encoded).map_err(|e| {
            CredentialError::StorageError(format!("Failed to store credential: {e}"))
        })?;

        if self.load(target)?.as_ref() != Some(credential) {
            tracing::error!(
                credential_target = target,
                "credential store did not keep the saved entry"
            );
            return Err(CredentialError::StorageError(
                "credential store did not keep the saved entry; no persistent backend is \
                 available on this platform"
                    .to_owned(),
            ));
        }
        Ok(())
    }

    fn delete(&self, target: &str) -> Result<(), CredentialError> {
        match self.entry(target)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CredentialError::StorageError(format!(
                "Failed to delete credential: {e}"
            ))),
        }
    }
}

fn encode(credential: &Credential) -> Result<String, CredentialError> {
    serde_json::to_string(&StoredEntryRef {
        principal: credential.principal(),
        secret: credential.secret(),
    })
    .map_err(|e| CredentialError::StorageError(format!("Failed to encode credential: {e}")))
}

fn decode(encoded: &str) -> Result<Credential, CredentialError> {
    let entry: StoredEntry = serde_json::from_str(encoded)
        .map_err(|e| CredentialError::InvalidEntry(format!("not a credential record: {e}")))?;
    Ok(Credential::new(entry.principal, entry.secret))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn encoding_round_trips() {
        let credential = Credential::new("mydns000001", "p@ss \"quoted\"");
        let encoded = encode(&credential).unwrap();
        assert_eq!(decode(&encoded).unwrap(), credential);
    }

    #[test]
    fn corrupt_entry_is_invalid() {
        let err = decode("plain-password").unwrap_err();
        assert!(matches!(err, CredentialError::InvalidEntry(_)));
    }

    #[test]
    fn create_store() {
        let store = KeyringCredentialStore::with_service("mydns-sync-test");
        assert_eq!(store.service, "mydns-sync-test");
    }

    #[test]
    fn backend_that_forgets_rejects_save() {
        let store = KeyringCredentialStore::with_builder(
            "mydns-sync-test",
            keyring::mock::default_credential_builder(),
        );

        let err = store
            .save("MyDnsSync", &Credential::new("mydns000001", "s3cret"))
            .unwrap_err();

        assert!(matches!(err, CredentialError::StorageError(_)));
        assert!(err.to_string().contains("did not keep"));
    }

    #[test]
    fn saved_login_is_visible_to_later_load() {
        let store = KeyringCredentialStore::with_service("mydns-sync-test");
        let target = "mydns.test.credential";
        let credential = Credential::new("mydns000001", "s3cret");

        match store.save(target, &credential) {
            Ok(()) => {}
            // Headless hosts have no Secret Service daemon to talk to.
            Err(CredentialError::StorageError(msg)) if !msg.contains("did not keep") => {
                eprintln!("platform credential store unavailable: {msg}");
                return;
            }
            Err(e) => panic!("save failed: {e}"),
        }

        let fresh = KeyringCredentialStore::with_service("mydns-sync-test");
        assert_eq!(fresh.load(target).expect("load"), Some(credential));

        fresh.delete(target).expect("delete");
        assert_eq!(fresh.load(target).expect("load after delete"), None);
    }
}
