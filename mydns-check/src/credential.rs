//! Login credential passed to a single check.

use std::fmt;

/// Account name and password for the provider login.
///
/// The password buffer is zeroed when the value is dropped and is never shown
/// by [`Debug`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    principal: String,
    secret: String,
}

impl Credential {
    /// Create a credential from an account name and password.
    pub fn new(principal: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            secret: secret.into(),
        }
    }

    /// Account name (MyDNS master ID).
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Password.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("principal", &self.principal)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        secure_clear(&mut self.secret);
    }
}

/// Overwrite a `String`'s backing buffer with zeros, then truncate it.
///
/// Best-effort: earlier reallocations of the same value may have left copies
/// in freed heap memory.
fn secure_clear(s: &mut String) {
    // SAFETY: only zero bytes (valid single-byte UTF-8) are written and the
    // string is cleared right after, so the UTF-8 invariant holds.
    let bytes = unsafe { s.as_mut_vec() };
    for byte in bytes.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, exclusive reference into the
        // Vec's allocation.
        unsafe {
            std::ptr::write_volatile(byte, 0);
        }
    }
    s.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let credential = Credential::new("mydns123456", "hunter2");
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("mydns123456"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn accessors_return_fields() {
        let credential = Credential::new("user", "pass");
        assert_eq!(credential.principal(), "user");
        assert_eq!(credential.secret(), "pass");
    }

    #[test]
    fn secure_clear_zeros_memory() {
        let mut s = String::from("secret-password-12345");
        let ptr = s.as_ptr();
        let len = s.len();

        secure_clear(&mut s);

        assert!(s.is_empty());
        assert!(s.capacity() >= len);
        for i in 0..len {
            // SAFETY: the allocation is still owned by `s` (capacity >= len).
            let byte = unsafe { *ptr.add(i) };
            assert_eq!(byte, 0, "byte at offset {i} was not zeroed");
        }
    }

    #[test]
    fn secure_clear_empty_string() {
        let mut s = String::new();
        secure_clear(&mut s);
        assert!(s.is_empty());
    }
}
