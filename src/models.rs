//! Data models for the 1secmail API responses.

use serde::{Deserialize, Serialize};

/// The provisioned mailbox identity: local part plus domain.
///
/// Created once per session and never mutated afterwards. The full address is
/// always `local_part@domain` with exactly one `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxIdentity {
    pub local_part: String,
    pub domain: String,
}

impl MailboxIdentity {
    /// The full email address, `local_part@domain`.
    pub fn address(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }
}

impl std::fmt::Display for MailboxIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

/// One entry of the `getMessages` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: i64,
    #[serde(rename = "from", default)]
    pub sender: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub date: String,
}

/// A full message as returned by `readMessage`.
///
/// All content fields are optional; the service omits or empties them freely
/// depending on what the sender provided.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullMessage {
    pub id: i64,
    #[serde(rename = "from", default)]
    pub sender: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub text_body: Option<String>,
    #[serde(default)]
    pub html_body: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Attachment metadata on a full message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
}

/// Normalized subject/body pair handed to callers.
///
/// `None` means "nothing found": an empty mailbox or a field the service did
/// not supply, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMail {
    pub subject: Option<String>,
    pub body: Option<String>,
}
