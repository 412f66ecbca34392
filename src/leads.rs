//! Lead capture for the email-gated form.
//!
//! Leads go to a write-only sink. Recording is fire-and-forget: a failing sink
//! is logged and never blocks the submission.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A prospect's contact email plus industry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lead {
    pub submission_id: Uuid,
    pub email: String,
    pub industry: String,
    pub captured_at: DateTime<Utc>,
}

/// Write-only destination for captured leads.
pub trait LeadSink: Send + Sync {
    fn record(&self, lead: &Lead) -> anyhow::Result<()>;
}

/// Emits each lead as one structured log line under the `leads` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLeadSink;

impl LeadSink for TracingLeadSink {
    fn record(&self, lead: &Lead) -> anyhow::Result<()> {
        tracing::info!(
            target: "leads",
            submission_id = %lead.submission_id,
            email = %lead.email,
            industry = %lead.industry,
            captured_at = %lead.captured_at.to_rfc3339(),
            "lead captured"
        );
        Ok(())
    }
}

/// Records a lead, swallowing sink failures after logging them.
pub fn record_lead(sink: &dyn LeadSink, lead: &Lead) {
    if let Err(e) = sink.record(lead) {
        tracing::warn!(
            "⚠️  Failed to record lead for submission {}: {:#}",
            lead.submission_id,
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl LeadSink for FailingSink {
        fn record(&self, _lead: &Lead) -> anyhow::Result<()> {
            anyhow::bail!("sink offline")
        }
    }

    fn lead() -> Lead {
        Lead {
            submission_id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            industry: "Salud".to_string(),
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn test_failing_sink_does_not_propagate() {
        // Must return normally
        record_lead(&FailingSink, &lead());
    }

    #[test]
    fn test_tracing_sink_accepts_lead() {
        assert!(TracingLeadSink.record(&lead()).is_ok());
    }
}
