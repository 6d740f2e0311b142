//! # 1secmail Client
//! Asynchronous wrapper around the 1secmail disposable email HTTP API, providing simple methods to provision a random inbox and poll it for incoming mail using [`MailboxSession`] and [`InboxReader`].
//!
//! ## Audience and uses
//! For Rust developers who need throwaway addresses in integration tests, demos, or automation scripts without running mail infrastructure: configure with [`SessionBuilder`], obtain an address, poll for the latest message, and extract its subject and body ([`ExtractedMail`]).
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`, so ensure the chosen Tokio features (`rt-multi-thread` or `current_thread`) are available in your application.
//!
//! ## Out of scope
//! Not a general-purpose mail client, SMTP sender, or durable mailbox. It only proxies the 1secmail service and inherits its availability, spam filtering, and retention limits. One mailbox per session; no outbound sending; nothing is persisted.
//!
//! ## Errors
//! Session construction fails with [`Error::Provisioning`] when the service hands back an address that cannot be split into local part and domain. Transport failures that survive the retry budget surface as [`Error::TransientNetwork`]; everything else transport-related is [`Error::Request`]. Missing or oddly shaped message fields are *soft* failures: the inbox getters absorb them into `None` and log the underlying [`ExtractionError`].
//!
//! ## Example
//! ```no_run
//! use secmail_client::{InboxReader, MailboxSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), secmail_client::Error> {
//!     let session = MailboxSession::new().await?;
//!     println!("Mailbox: {}", session.address());
//!
//!     let inbox = InboxReader::new(&session);
//!     let mail = inbox.receive_mail().await?;
//!     println!("Subject: {:?}", mail.subject);
//!     println!("Body: {:?}", mail.body);
//!     Ok(())
//! }
//! ```

mod error;
mod inbox;
mod models;
mod session;

pub use error::{Error, ExtractionError};
pub use inbox::{InboxReader, LatestOrdering, extract_field};
pub use models::{Attachment, ExtractedMail, FullMessage, MailboxIdentity, MessageSummary};
pub use session::{MailboxSession, RetryPolicy, SessionBuilder};

/// Result type alias for 1secmail operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
