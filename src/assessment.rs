/// Risk assessment workflow shared by the HTTP handlers
///
/// One submission runs sequentially:
/// 1. Validate the form input
/// 2. Record the lead (lead-gated variant only, fire-and-forget)
/// 3. Check the model credential (no network call without it)
/// 4. Build the prompt
/// 5. Call the model
/// 6. Parse and validate the reply
/// 7. Derive secondary metrics
///
/// Nothing is cached or shared between submissions beyond the read-only config.
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::leads::{record_lead, Lead, LeadSink};
use crate::llm_client::OpenAiClient;
use crate::metrics::DerivedMetrics;
use crate::models::{AssessmentReport, AssessmentRequest, Choice, SchemaVariant};
use crate::parser::parse_reply;
use crate::prompt::{build_prompt, PromptPayload};
use crate::validation::validate_submission;

#[derive(Clone)]
pub struct RiskAuditService {
    /// `None` when no credential is configured.
    client: Option<OpenAiClient>,
    lead_sink: Arc<dyn LeadSink>,
    default_variant: SchemaVariant,
    payment_link: Option<String>,
}

impl RiskAuditService {
    pub fn new(config: &Config, lead_sink: Arc<dyn LeadSink>) -> Result<Self, AppError> {
        let client = match &config.openai_api_key {
            Some(key) => Some(OpenAiClient::new(
                config.openai_base_url.clone(),
                key.clone(),
                config.openai_model.clone(),
                Duration::from_secs(config.llm_timeout_secs),
            )?),
            None => None,
        };

        Ok(Self {
            client,
            lead_sink,
            default_variant: config.default_variant,
            payment_link: config.payment_link.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn default_variant(&self) -> SchemaVariant {
        self.default_variant
    }

    fn variant_for(&self, request: &AssessmentRequest) -> SchemaVariant {
        request.variant.unwrap_or(self.default_variant)
    }

    /// Validates the input and renders the prompt without calling the model.
    pub fn preview_prompt(&self, request: &AssessmentRequest) -> Result<PromptPayload, AppError> {
        let variant = self.variant_for(request);
        let (profile, answers) = validate_submission(request, variant)?;
        Ok(build_prompt(&profile, &answers, variant))
    }

    /// Runs the whole pipeline for one submission.
    pub async fn assess(&self, request: &AssessmentRequest) -> Result<AssessmentReport, AppError> {
        let submission_id = Uuid::new_v4();
        let variant = self.variant_for(request);
        let (profile, answers) = validate_submission(request, variant)?;
        tracing::info!(
            "📝 Assessment {} started: variant={}, industry={}",
            submission_id,
            variant,
            profile.industry.code()
        );

        if variant.requires_email() {
            if let Some(email) = &profile.email {
                record_lead(
                    self.lead_sink.as_ref(),
                    &Lead {
                        submission_id,
                        email: email.clone(),
                        industry: profile.industry.label().to_string(),
                        captured_at: Utc::now(),
                    },
                );
            }
        }

        let client = self.client.as_ref().ok_or_else(|| {
            AppError::ConfigurationMissing("OPENAI_API_KEY is not configured".to_string())
        })?;

        let payload = build_prompt(&profile, &answers, variant);
        let reply = client
            .complete(&payload.user_message())
            .await
            .with_context(|| format!("assessment {}", submission_id))?;

        let assessment = parse_reply(&reply, variant).map_err(|e| {
            tracing::warn!("Assessment {} reply rejected: {}", submission_id, e);
            tracing::debug!("Rejected reply body: {}", reply);
            e
        })?;
        let metrics = DerivedMetrics::derive(&assessment);

        tracing::info!(
            "✅ Assessment {} completed: fragility={}, prevention_cost={:?}",
            submission_id,
            assessment.fragility,
            metrics.prevention_cost
        );

        Ok(AssessmentReport {
            submission_id,
            variant,
            company_name: profile.company_name,
            industry: profile.industry.label().to_string(),
            currency: profile.currency.code().to_string(),
            assessment,
            metrics,
            payment_link: if variant.requires_email() {
                self.payment_link.clone()
            } else {
                None
            },
            generated_at: Utc::now(),
        })
    }
}
