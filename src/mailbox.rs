//! Mail provider seam.
//!
//! The provider collaborator owns pagination, rate limiting, and OAuth
//! token refresh. The engine only asks for one bounded window per scan and
//! treats every provider failure as retryable.

use async_trait::async_trait;

use crate::error::MailboxError;
use crate::pipeline::types::RawMessage;

/// Bounds for one scan's fetch.
#[derive(Debug, Clone, Copy)]
pub struct ScanWindow {
    /// How many days back the window reaches.
    pub lookback_days: u32,
    /// Maximum number of messages to return.
    pub limit: usize,
}

/// One fetched window of messages, in provider order.
#[derive(Debug, Clone, Default)]
pub struct MailWindow {
    pub messages: Vec<RawMessage>,
    /// The provider stopped early (rate limit, pagination cut-off). The
    /// scan processes what arrived and reports an incomplete status.
    pub truncated: bool,
}

/// Mail provider collaborator — pure I/O, no classification logic.
#[async_trait]
pub trait MailboxProvider: Send + Sync {
    /// Fetch a bounded, time-windowed batch of messages for one owner,
    /// oldest first.
    async fn fetch_window(
        &self,
        owner: &str,
        window: &ScanWindow,
    ) -> Result<MailWindow, MailboxError>;
}
