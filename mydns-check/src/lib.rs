//! # mydns-check
//!
//! One authenticated login round trip against a dynamic-DNS provider,
//! reduced to a [`SyncOutcome`].
//!
//! ## Design
//!
//! - The request is a plain GET with HTTP Basic authentication
//! - The response body is parsed as HTML and the text of `<body>` is scanned
//!   line by line for an exact success marker
//! - The HTTP client is an explicitly constructed [`ReqwestTransport`],
//!   shared by reference across checks; there is no process-wide client
//!
//! ## Security
//!
//! - Credentials are borrowed for one request and never stored
//! - Passwords are zeroed on drop and redacted from `Debug` output
//! - Nothing derived from the credential is logged
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> mydns_check::Result<()> {
//! use mydns_check::{CheckConfig, Credential, ReqwestTransport, SyncChecker};
//!
//! let checker = SyncChecker::new(ReqwestTransport::new(&CheckConfig::default())?);
//! let credential = Credential::new("mydns000001", "password");
//! let outcome = checker
//!     .check(&credential, "https://www.mydns.jp/login.html", "Login and IP address notify OK.")
//!     .await;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod checker;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod marker;
pub mod outcome;
pub mod transport;

pub use checker::{SyncCheck, SyncChecker};
pub use config::{CheckConfig, validate_endpoint};
pub use credential::Credential;
pub use error::{CheckError, Result};
pub use outcome::{FailureReason, SyncOutcome};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
