//! Health probing for plugin endpoints
//!
//! A probe sends a HEAD request to the plugin's service URL. Any answer in
//! the 400..=408 range counts as healthy: the service is up even if it
//! refuses unauthenticated HEAD requests.

use log::debug;
use std::time::Duration;

/// Default HEAD timeout
pub const DEFAULT_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw result of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Status(u16),
    Timeout,
    ConnectionError(String),
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        match self {
            ProbeOutcome::Status(status) if (400..=408).contains(status) => true,
            ProbeOutcome::Status(status) => *status < 400,
            ProbeOutcome::Timeout | ProbeOutcome::ConnectionError(_) => false,
        }
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Status(status) => write!(f, "HTTP {}", status),
            ProbeOutcome::Timeout => write!(f, "timed out"),
            ProbeOutcome::ConnectionError(message) => write!(f, "connection error: {}", message),
        }
    }
}

#[async_trait::async_trait]
pub trait HealthProbe: Send + Sync {
    async fn head(&self, url: &str, timeout: Duration) -> ProbeOutcome;
}

/// Probe backed by `reqwest`; certificate validation is disabled and
/// redirects are reported rather than followed
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HealthProbe for HttpProbe {
    async fn head(&self, url: &str, timeout: Duration) -> ProbeOutcome {
        debug!("HEAD {} (timeout {:?})", url, timeout);
        match self.client.head(url).timeout(timeout).send().await {
            Ok(response) => ProbeOutcome::Status(response.status().as_u16()),
            Err(e) if e.is_timeout() => ProbeOutcome::Timeout,
            Err(e) => ProbeOutcome::ConnectionError(e.to_string()),
        }
    }
}
