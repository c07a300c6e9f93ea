//! Login credential storage and lookup.
//!
//! The daemon never keeps a credential around: every scheduled or manual
//! check asks the [`CredentialStore`] again.
//!
//! - [`KeyringCredentialStore`]: OS credential store via the `keyring` crate
//!   (Secret Service on Linux, Credential Manager on Windows, Keychain on macOS)
//! - [`MemoryCredentialStore`]: in-process store for tests and embedders
//!
//! ## Usage
//!
//! ```no_run
//! use mydns_sync::credentials::{self, KeyringCredentialStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = KeyringCredentialStore::new();
//! if let Some(credential) = credentials::get_credential(&store, "MyDnsSync", None)? {
//!     println!("logged in as {}", credential.principal());
//! }
//! # Ok(())
//! # }
//! ```

mod keyring_store;
mod memory;
mod prompt;
mod types;

pub use keyring_store::KeyringCredentialStore;
pub use memory::MemoryCredentialStore;
pub use mydns_check::Credential;
pub use prompt::{CredentialPrompt, PromptAnswer, StdinPrompt};
pub use types::CredentialError;

use std::sync::Arc;

/// Persistent storage for the login credential, keyed by target name.
pub trait CredentialStore: Send + Sync {
    /// Load the credential stored under `target`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backend cannot be read or the entry
    /// is corrupt.
    fn load(&self, target: &str) -> Result<Option<Credential>, CredentialError>;

    /// Store `credential` under `target`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StorageError`] if the backend write fails.
    fn save(&self, target: &str, credential: &Credential) -> Result<(), CredentialError>;

    /// Delete the credential under `target`. Deleting a missing entry is `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StorageError`] if the backend delete fails.
    fn delete(&self, target: &str) -> Result<(), CredentialError>;
}

/// Look up the credential for `target`.
///
/// When nothing is stored and a `prompt` is supplied, the user is asked; the
/// answer is persisted if they chose to save it. Scheduled checks always pass
/// `None` and never prompt.
///
/// # Errors
///
/// Returns [`CredentialError`] from the store or the prompt.
pub fn get_credential(
    store: &dyn CredentialStore,
    target: &str,
    prompt: Option<&dyn CredentialPrompt>,
) -> Result<Option<Credential>, CredentialError> {
    if let Some(credential) = store.load(target)? {
        return Ok(Some(credential));
    }

    let Some(prompt) = prompt else {
        return Ok(None);
    };

    let Some(answer) = prompt.prompt(target, None)? else {
        tracing::info!(credential_target = target, "credential prompt cancelled");
        return Ok(None);
    };

    if answer.save {
        store.save(target, &answer.credential)?;
        tracing::info!(credential_target = target, "credential saved");
    }
    Ok(Some(answer.credential))
}

/// [`get_credential`] on tokio's blocking pool.
///
/// Keyring backends make synchronous IPC calls and a prompt waits on the
/// terminal; neither may stall an async worker.
///
/// # Errors
///
/// Returns [`CredentialError`] from the store or the prompt, or
/// [`CredentialError::StorageError`] if the lookup task panicked.
pub async fn fetch_credential(
    store: Arc<dyn CredentialStore>,
    target: String,
    prompt: Option<Arc<dyn CredentialPrompt>>,
) -> Result<Option<Credential>, CredentialError> {
    let lookup = move || get_credential(store.as_ref(), &target, prompt.as_deref());
    tokio::task::spawn_blocking(lookup).await.map_err(|e| {
        CredentialError::StorageError(format!("credential lookup task failed: {e}"))
    })?
}

/// Remove the stored credential for `target`, doing nothing if none exists.
///
/// Returns `true` when a credential was removed.
///
/// # Errors
///
/// Returns [`CredentialError`] from the store.
pub fn remove_credential(
    store: &dyn CredentialStore,
    target: &str,
) -> Result<bool, CredentialError> {
    if store.load(target)?.is_none() {
        return Ok(false);
    }
    store.delete(target)?;
    tracing::info!(credential_target = target, "credential removed");
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TARGET: &str = "MyDnsSync";

    struct FixedPrompt {
        answer: Option<(String, String, bool)>,
        calls: AtomicUsize,
    }

    impl FixedPrompt {
        fn answering(principal: &str, secret: &str, save: bool) -> Self {
            Self {
                answer: Some((principal.to_owned(), secret.to_owned(), save)),
                calls: AtomicUsize::new(0),
            }
        }

        fn cancelling() -> Self {
            Self {
                answer: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl CredentialPrompt for FixedPrompt {
        fn prompt(
            &self,
            _target: &str,
            _default_principal: Option<&str>,
        ) -> Result<Option<PromptAnswer>, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.as_ref().map(|(p, s, save)| PromptAnswer {
                credential: Credential::new(p.as_str(), s.as_str()),
                save: *save,
            }))
        }
    }

    #[test]
    fn stored_credential_is_returned_without_prompting() {
        let store = MemoryCredentialStore::with_credential(TARGET, Credential::new("u", "p"));
        let prompt = FixedPrompt::answering("other", "x", true);

        let credential = get_credential(&store, TARGET, Some(&prompt)).unwrap().unwrap();

        assert_eq!(credential.principal(), "u");
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_credential_without_prompt_is_none() {
        let store = MemoryCredentialStore::new();
        assert!(get_credential(&store, TARGET, None).unwrap().is_none());
    }

    #[test]
    fn prompted_credential_is_saved_when_requested() {
        let store = MemoryCredentialStore::new();
        let prompt = FixedPrompt::answering("u", "p", true);

        let credential = get_credential(&store, TARGET, Some(&prompt)).unwrap().unwrap();

        assert_eq!(credential.principal(), "u");
        assert_eq!(store.load(TARGET).unwrap(), Some(Credential::new("u", "p")));
    }

    #[test]
    fn prompted_credential_is_not_saved_when_declined() {
        let store = MemoryCredentialStore::new();
        let prompt = FixedPrompt::answering("u", "p", false);

        assert!(get_credential(&store, TARGET, Some(&prompt)).unwrap().is_some());
        assert!(store.load(TARGET).unwrap().is_none());
    }

    #[test]
    fn cancelled_prompt_is_none() {
        let store = MemoryCredentialStore::new();
        let prompt = FixedPrompt::cancelling();

        assert!(get_credential(&store, TARGET, Some(&prompt)).unwrap().is_none());
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
    }

    /// Records the thread every load runs on.
    struct ThreadRecordingStore {
        inner: MemoryCredentialStore,
        load_threads: std::sync::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl CredentialStore for ThreadRecordingStore {
        fn load(&self, target: &str) -> Result<Option<Credential>, CredentialError> {
            self.load_threads
                .lock()
                .unwrap()
                .push(std::thread::current().id());
            self.inner.load(target)
        }

        fn save(&self, target: &str, credential: &Credential) -> Result<(), CredentialError> {
            self.inner.save(target, credential)
        }

        fn delete(&self, target: &str) -> Result<(), CredentialError> {
            self.inner.delete(target)
        }
    }

    #[tokio::test]
    async fn fetch_runs_store_lookup_off_the_async_thread() {
        let store = Arc::new(ThreadRecordingStore {
            inner: MemoryCredentialStore::with_credential(TARGET, Credential::new("u", "p")),
            load_threads: std::sync::Mutex::new(Vec::new()),
        });

        let credential = fetch_credential(store.clone(), TARGET.to_owned(), None)
            .await
            .unwrap();

        assert_eq!(credential, Some(Credential::new("u", "p")));
        let threads = store.load_threads.lock().unwrap();
        assert_eq!(threads.len(), 1);
        assert_ne!(threads[0], std::thread::current().id());
    }

    #[tokio::test]
    async fn fetch_prompts_and_saves_on_blocking_pool() {
        let store = Arc::new(MemoryCredentialStore::new());
        let prompt = Arc::new(FixedPrompt::answering("u", "p", true));

        let credential = fetch_credential(store.clone(), TARGET.to_owned(), Some(prompt.clone()))
            .await
            .unwrap();

        assert_eq!(credential.map(|c| c.principal().to_owned()), Some("u".to_owned()));
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
        assert!(store.load(TARGET).unwrap().is_some());
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let store = MemoryCredentialStore::new();
        assert!(!remove_credential(&store, TARGET).unwrap());
    }

    #[test]
    fn remove_deletes_stored_credential() {
        let store = MemoryCredentialStore::with_credential(TARGET, Credential::new("u", "p"));
        assert!(remove_credential(&store, TARGET).unwrap());
        assert!(store.load(TARGET).unwrap().is_none());
    }
}
