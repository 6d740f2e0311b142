//! Mailbox provisioning and the retrying HTTP GET primitive.

use std::time::Duration;

use crate::{Error, MailboxIdentity, Result};

/// How many times a GET is attempted before a transient failure becomes
/// terminal, and nothing else. Retries are immediate; the 1secmail API is
/// cheap to hit again and a backoff would only slow down test suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the initial one. Must be at least 1.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    /// One initial attempt plus three retries.
    fn default() -> Self {
        Self { max_attempts: 4 }
    }
}

/// One provisioned 1secmail mailbox.
///
/// Construction performs a single `genRandomMailbox` request; the resulting
/// identity is fixed for the lifetime of the session. All remote calls made
/// through the session share its retry policy. Use [`MailboxSession::new`] for
/// defaults or [`MailboxSession::builder`] for custom settings like proxies
/// and a different API endpoint.
#[derive(Debug)]
pub struct MailboxSession {
    http: reqwest::Client,
    api_url: String,
    identity: MailboxIdentity,
    retry: RetryPolicy,
}

impl MailboxSession {
    /// Create a builder for configuring the session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Provision a new random mailbox with default settings.
    ///
    /// # Examples
    /// ```no_run
    /// # use secmail_client::MailboxSession;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), secmail_client::Error> {
    /// let session = MailboxSession::new().await?;
    /// println!("{}", session.address());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> Result<Self> {
        SessionBuilder::new().build().await
    }

    /// The part of the address before the `@`.
    pub fn local_part(&self) -> &str {
        &self.identity.local_part
    }

    /// The part of the address after the `@`.
    pub fn domain(&self) -> &str {
        &self.identity.domain
    }

    /// The full provisioned address.
    pub fn address(&self) -> String {
        self.identity.address()
    }

    /// The provisioned identity.
    pub fn identity(&self) -> &MailboxIdentity {
        &self.identity
    }

    /// GET the API endpoint with `params`, retrying transient failures.
    pub(crate) async fn get(&self, params: &[(&str, String)]) -> Result<String> {
        get_with_retry(&self.http, &self.api_url, params, &self.retry).await
    }
}

/// Bounded retry loop around one GET. Re-issues the identical request on
/// transient transport failures with no backoff; anything else propagates
/// immediately.
async fn get_with_retry(
    http: &reqwest::Client,
    api_url: &str,
    params: &[(&str, String)],
    retry: &RetryPolicy,
) -> Result<String> {
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        tracing::debug!(api_url, ?params, attempt, "issuing GET");
        let err = match http.get(api_url).query(params).send().await {
            Ok(response) => {
                let response = response.error_for_status()?;
                match response.text().await {
                    Ok(body) => return Ok(body),
                    // the peer hung up mid-body; same as a dropped connection
                    Err(err) => err,
                }
            }
            Err(err) if is_transient(&err) => err,
            Err(err) => return Err(err.into()),
        };
        if attempt >= max_attempts {
            tracing::error!(api_url, attempt, %err, "retries exhausted");
            return Err(Error::TransientNetwork {
                attempts: attempt,
                source: err,
            });
        }
        tracing::warn!(api_url, attempt, %err, "transient failure, retrying");
        attempt += 1;
    }
}

/// Transient means the transport never produced a usable response: connection
/// problems, timeouts, redirect loops, or a peer hanging up mid-exchange.
/// Status and builder errors are deterministic and not worth a retry; note
/// that body-read failures never reach this check, the attempt loop retries
/// them directly.
fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_status() || err.is_builder() || err.is_decode() {
        return false;
    }
    err.is_connect() || err.is_timeout() || err.is_redirect() || err.is_request()
}

/// Recover the bare address from the provisioning body.
///
/// The service answers `genRandomMailbox` with JSON-array-like text such as
/// `["abc123@1secmail.com"]`; stripping the list and quote punctuation is all
/// the parsing it needs.
fn parse_provisioned(body: &str) -> Result<MailboxIdentity> {
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"'))
        .collect();
    let cleaned = cleaned.trim();

    let Some((local_part, domain)) = cleaned.split_once('@') else {
        return Err(Error::Provisioning(body.to_string()));
    };
    if local_part.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(Error::Provisioning(body.to_string()));
    }

    Ok(MailboxIdentity {
        local_part: local_part.to_string(),
        domain: domain.to_string(),
    })
}

const API_URL: &str = "https://www.1secmail.com/api/v1/";
const USER_AGENT_VALUE: &str = concat!("secmail-client/", env!("CARGO_PKG_VERSION"));

/// Builder for configuring a mailbox session.
///
/// Start with [`MailboxSession::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    api_url: String,
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
    timeout: Option<Duration>,
    retry: RetryPolicy,
}

impl SessionBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Official 1secmail API endpoint
    /// - No proxy
    /// - Strict TLS validation
    /// - `secmail-client/<version>` user agent
    /// - Transport default timeout
    /// - Four attempts per request
    pub fn new() -> Self {
        Self {
            api_url: API_URL.to_string(),
            proxy: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
            timeout: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API endpoint URL.
    ///
    /// Useful for testing or when 1secmail changes its endpoint.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:9050").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a per-request timeout. A request that hits this timeout counts as
    /// a transient failure and is retried.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the retry policy applied to every request.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the session and provision its mailbox.
    ///
    /// This performs one `genRandomMailbox` network request.
    ///
    /// # Examples
    /// ```no_run
    /// # use secmail_client::MailboxSession;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), secmail_client::Error> {
    /// let session = MailboxSession::builder()
    ///     .user_agent("my-app/1.0")
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<MailboxSession> {
        let mut builder = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        let params = [
            ("action", "genRandomMailbox".to_string()),
            ("count", "1".to_string()),
        ];
        let body = get_with_retry(&http, &self.api_url, &params, &self.retry).await?;
        let identity = parse_provisioned(&body)?;
        tracing::debug!(address = %identity, "mailbox provisioned");

        Ok(MailboxSession {
            http,
            api_url: self.api_url,
            identity,
            retry: self.retry,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
