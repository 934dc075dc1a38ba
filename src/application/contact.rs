//! Public contact form submission.
//!
//! Two client-side guards run before a message reaches the backend. A
//! hidden honeypot field that is filled in silently drops the submission,
//! and a rate limit allows one successful send per window. Both are
//! best-effort filters for casual automation.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::cache::{ResourceStore, StoreError};
use crate::domain::entities::ContactMessageRecord;
use crate::domain::messages::NewContactMessage;

pub(crate) const METRIC_CONTACT_REJECTED: &str = "folio_contact_rejected_total";

/// Default interval between two accepted submissions.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::seconds(60);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Hidden form field. Humans leave it empty.
    #[serde(default, rename = "_honey", skip_serializing_if = "Option::is_none")]
    pub honeypot: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Sent(ContactMessageRecord),
    /// The honeypot was filled in. Nothing was stored.
    Ignored,
}

#[derive(Debug, Clone, Error)]
pub enum ContactError {
    #[error("a message was sent recently; try again in {} seconds", .retry_after.as_secs().max(1))]
    RateLimited { retry_after: std::time::Duration },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("submission ledger i/o failed: {0}")]
    Io(String),
    #[error("submission ledger is unreadable: {0}")]
    Corrupt(String),
}

/// Persists when the last message was sent from this client.
#[async_trait]
pub trait SubmissionLedger: Send + Sync {
    async fn last_submitted(&self) -> Result<Option<OffsetDateTime>, LedgerError>;

    async fn record(&self, at: OffsetDateTime) -> Result<(), LedgerError>;
}

#[derive(Clone)]
pub struct ContactService {
    messages: ResourceStore<ContactMessageRecord>,
    ledger: Arc<dyn SubmissionLedger>,
    window: Duration,
}

impl ContactService {
    pub fn new(
        messages: ResourceStore<ContactMessageRecord>,
        ledger: Arc<dyn SubmissionLedger>,
        window: Duration,
    ) -> Self {
        Self {
            messages,
            ledger,
            window,
        }
    }

    pub async fn submit(&self, submission: ContactSubmission) -> Result<SubmitOutcome, ContactError> {
        self.submit_at(submission, OffsetDateTime::now_utc()).await
    }

    #[instrument(skip_all)]
    pub async fn submit_at(
        &self,
        submission: ContactSubmission,
        now: OffsetDateTime,
    ) -> Result<SubmitOutcome, ContactError> {
        if submission
            .honeypot
            .as_deref()
            .is_some_and(|value| !value.is_empty())
        {
            counter!(METRIC_CONTACT_REJECTED, "reason" => "honeypot").increment(1);
            info!(result = "ignored", "Dropped contact submission with honeypot filled");
            return Ok(SubmitOutcome::Ignored);
        }

        if let Some(retry_after) = self.remaining_wait(now).await {
            counter!(METRIC_CONTACT_REJECTED, "reason" => "rate_limited").increment(1);
            info!(
                result = "rate_limited",
                retry_after_secs = retry_after.as_secs(),
                "Rejected contact submission inside rate-limit window"
            );
            return Err(ContactError::RateLimited { retry_after });
        }

        let record = self
            .messages
            .create(NewContactMessage {
                name: submission.name,
                email: submission.email,
                message: submission.message,
            })
            .await?;

        if let Err(err) = self.ledger.record(now).await {
            warn!(error = %err, "Contact message stored but submission time was not recorded");
        }
        info!(id = record.id, result = "sent", "Stored contact message");
        Ok(SubmitOutcome::Sent(record))
    }

    async fn remaining_wait(&self, now: OffsetDateTime) -> Option<std::time::Duration> {
        let last = match self.ledger.last_submitted().await {
            Ok(last) => last?,
            Err(err) => {
                warn!(error = %err, "Submission ledger unreadable; rate limit skipped");
                return None;
            }
        };

        let elapsed = (now - last).max(Duration::ZERO);
        (elapsed < self.window).then(|| (self.window - elapsed).unsigned_abs())
    }
}
