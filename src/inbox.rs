//! Inbox polling and tolerant message-field extraction.

use serde_json::Value;

use crate::{ExtractedMail, ExtractionError, FullMessage, MailboxSession, MessageSummary, Result};

/// Which end of the message listing counts as "most recent".
///
/// The 1secmail API does not document its listing order; in practice the
/// newest message shows up first, and [`LatestOrdering::FirstEntry`] encodes
/// that observation as the default. Flip to [`LatestOrdering::LastEntry`] if
/// the service ever changes its mind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LatestOrdering {
    /// The first entry of the listing is the newest message (observed
    /// behavior, default).
    #[default]
    FirstEntry,
    /// The last entry of the listing is the newest message.
    LastEntry,
}

/// Reads the most recent message out of a session's mailbox.
///
/// Borrows the [`MailboxSession`] it polls; every getter performs the full
/// list-then-read round trip against the live service, nothing is cached.
#[derive(Debug)]
pub struct InboxReader<'a> {
    session: &'a MailboxSession,
    ordering: LatestOrdering,
}

impl<'a> InboxReader<'a> {
    /// Create a reader over `session` with the default listing order.
    pub fn new(session: &'a MailboxSession) -> Self {
        Self {
            session,
            ordering: LatestOrdering::default(),
        }
    }

    /// Override which end of the listing is treated as the newest message.
    pub fn ordering(mut self, ordering: LatestOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// List the mailbox's message summaries.
    ///
    /// A malformed response body degrades to an empty listing; only transport
    /// failures surface as errors.
    ///
    /// # Examples
    /// ```no_run
    /// # use secmail_client::{InboxReader, MailboxSession};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), secmail_client::Error> {
    /// let session = MailboxSession::new().await?;
    /// let inbox = InboxReader::new(&session);
    /// for msg in inbox.list_messages().await? {
    ///     println!("{}: {}", msg.sender, msg.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_messages(&self) -> Result<Vec<MessageSummary>> {
        let listing = self.list_value().await?;

        let messages = listing
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| serde_json::from_value::<MessageSummary>(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(messages)
    }

    /// The id of the newest message, or `None` when the mailbox is empty or
    /// the listing shape is unusable.
    pub async fn latest_message_id(&self) -> Result<Option<i64>> {
        let listing = self.list_value().await?;
        match extract_field(&listing, "id", self.ordering) {
            Ok(value) => Ok(value.as_i64()),
            Err(err) => {
                tracing::debug!(%err, "no latest message id");
                Ok(None)
            }
        }
    }

    /// Fetch the full content of a specific message.
    ///
    /// Returns `None` when the response body is malformed or does not
    /// describe a message. An array-wrapped response is unwrapped to the
    /// entry the reader's [`LatestOrdering`] selects, matching the field
    /// getters.
    pub async fn read_message(&self, id: i64) -> Result<Option<FullMessage>> {
        let value = self.read_value(id).await?;
        // some endpoints wrap the record in a singleton array
        let record = match &value {
            Value::Array(arr) => {
                let entry = match self.ordering {
                    LatestOrdering::FirstEntry => arr.first(),
                    LatestOrdering::LastEntry => arr.last(),
                };
                entry.cloned().unwrap_or(Value::Null)
            }
            other => other.clone(),
        };
        Ok(serde_json::from_value(record).ok())
    }

    /// Subject of the newest message, or `None` if there is none.
    ///
    /// Performs the full list-then-read round trip on every call.
    pub async fn latest_subject(&self) -> Result<Option<String>> {
        let Some(message) = self.latest_message_value().await? else {
            return Ok(None);
        };
        Ok(self.field_string(&message, "subject"))
    }

    /// Plain-text body of the newest message, or `None` if there is none.
    ///
    /// Prefers the `textBody` field and falls back to `body`.
    pub async fn latest_body(&self) -> Result<Option<String>> {
        let Some(message) = self.latest_message_value().await? else {
            return Ok(None);
        };
        Ok(self.body_string(&message))
    }

    /// Subject and body of the newest message in one round trip.
    ///
    /// The message is fetched once and both fields come from that single
    /// fetch, so subject and body always belong to the same message even if
    /// new mail arrives mid-call. An empty mailbox yields both fields `None`.
    pub async fn receive_mail(&self) -> Result<ExtractedMail> {
        let Some(message) = self.latest_message_value().await? else {
            return Ok(ExtractedMail::default());
        };
        Ok(ExtractedMail {
            subject: self.field_string(&message, "subject"),
            body: self.body_string(&message),
        })
    }

    /// Resolve the newest message id and read its full payload. `None` when
    /// the mailbox is empty.
    async fn latest_message_value(&self) -> Result<Option<Value>> {
        let Some(id) = self.latest_message_id().await? else {
            return Ok(None);
        };
        Ok(Some(self.read_value(id).await?))
    }

    async fn list_value(&self) -> Result<Value> {
        let params = [
            ("action", "getMessages".to_string()),
            ("login", self.session.local_part().to_string()),
            ("domain", self.session.domain().to_string()),
        ];
        let body = self.session.get(&params).await?;
        Ok(parse_json_soft(&body))
    }

    async fn read_value(&self, id: i64) -> Result<Value> {
        let params = [
            ("action", "readMessage".to_string()),
            ("login", self.session.local_part().to_string()),
            ("domain", self.session.domain().to_string()),
            ("id", id.to_string()),
        ];
        let body = self.session.get(&params).await?;
        Ok(parse_json_soft(&body))
    }

    fn field_string(&self, message: &Value, attribute: &str) -> Option<String> {
        match extract_field(message, attribute, self.ordering) {
            Ok(value) => value_as_string(value),
            Err(err) => {
                tracing::debug!(%err, attribute, "field extraction failed");
                None
            }
        }
    }

    fn body_string(&self, message: &Value) -> Option<String> {
        self.field_string(message, "textBody")
            .or_else(|| self.field_string(message, "body"))
    }
}

/// Parse a response body as JSON, degrading to `Null` on failure.
///
/// The service occasionally answers with an empty or truncated body while a
/// message is still being ingested; that is "no mail yet", not an error.
fn parse_json_soft(body: &str) -> Value {
    match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "response body is not valid JSON, treating as empty");
            Value::Null
        }
    }
}

/// Look up `attribute` in a payload of either observed shape.
///
/// The API returns message data either as an array of objects or as one bare
/// object depending on endpoint and message count. First the array shape is
/// tried (the entry picked per `ordering`), then the object shape; only when
/// both fail does a typed [`ExtractionError`] come back, so a caller can tell
/// an empty mailbox apart from a malformed payload.
pub fn extract_field<'v>(
    data: &'v Value,
    attribute: &str,
    ordering: LatestOrdering,
) -> std::result::Result<&'v Value, ExtractionError> {
    match data {
        Value::Array(entries) => {
            let entry = match ordering {
                LatestOrdering::FirstEntry => entries.first(),
                LatestOrdering::LastEntry => entries.last(),
            };
            let Some(entry) = entry else {
                return Err(ExtractionError::NoMessages);
            };
            entry
                .get(attribute)
                .ok_or_else(|| ExtractionError::FieldNotFound(attribute.to_string()))
        }
        Value::Object(map) => map
            .get(attribute)
            .ok_or_else(|| ExtractionError::FieldNotFound(attribute.to_string())),
        _ => Err(ExtractionError::UnexpectedShape(attribute.to_string())),
    }
}

/// Render a field value as trimmed text; `Null` is "not there".
fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}
