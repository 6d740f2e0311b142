//! Error types for 1secmail operations.

use thiserror::Error;

/// Errors returned by [`MailboxSession`](crate::MailboxSession) and
/// [`InboxReader`](crate::InboxReader) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A transport or HTTP status failure that is not retried.
    ///
    /// Covers malformed URLs, TLS setup problems, and non-2xx responses.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A transient transport failure (connect, timeout, redirect loop) that
    /// survived every retry attempt.
    #[error("request still failing after {attempts} attempts: {source}")]
    TransientNetwork {
        /// Total attempts made, including the initial one.
        attempts: u32,
        /// The transport error observed on the final attempt.
        source: reqwest::Error,
    },

    /// The provisioning response could not be split into a local part and a
    /// domain around a single `@`.
    #[error("could not parse provisioned address from {0:?}")]
    Provisioning(String),
}

/// Soft failures raised while digging a field out of a message payload.
///
/// These never cross the public getters of [`InboxReader`](crate::InboxReader);
/// there they are logged and collapse into `None`. They exist as a distinct
/// type so callers of the lower-level extraction API can tell "the mailbox is
/// empty" apart from "the service answered with something unexpected".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// The message listing was empty: nothing has arrived yet.
    #[error("mailbox has no messages")]
    NoMessages,

    /// Neither the array-of-objects nor the single-object shape carried the
    /// requested field.
    #[error("field {0:?} not found in message payload")]
    FieldNotFound(String),

    /// The payload was neither an object nor an array, so no field lookup
    /// was possible.
    #[error("message payload has an unexpected shape for field {0:?}")]
    UnexpectedShape(String),
}
