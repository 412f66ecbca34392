//! Secondary figures derived from a parsed assessment.

use serde::Serialize;

use crate::models::RiskAssessment;

/// Prevention cost as a share of the estimated loss.
pub const PREVENTION_COST_RATIO: f64 = 0.05;

/// Prevention-cost estimate, or `None` when the reply carried no numeric loss.
pub fn prevention_cost(assessment: &RiskAssessment) -> Option<f64> {
    assessment.loss_value.map(|loss| loss * PREVENTION_COST_RATIO)
}

/// Input for the fragility gauge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FragilityGauge {
    pub score: u8,
    /// score / 100, for progress-bar style widgets.
    pub ratio: f64,
}

/// Input for the loss vs. prevention comparison chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LossComparison {
    pub estimated_loss: f64,
    pub prevention_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub gauge: FragilityGauge,
    /// Absent (serialized as null) when not computable; never zero-filled.
    pub prevention_cost: Option<f64>,
    pub comparison: Option<LossComparison>,
}

impl DerivedMetrics {
    pub fn derive(assessment: &RiskAssessment) -> Self {
        let prevention_cost = prevention_cost(assessment);
        let comparison = assessment
            .loss_value
            .zip(prevention_cost)
            .map(|(estimated_loss, prevention_cost)| LossComparison {
                estimated_loss,
                prevention_cost,
            });

        if comparison.is_none() {
            tracing::debug!("Prevention cost not computable: no numeric loss in reply");
        }

        Self {
            gauge: FragilityGauge {
                score: assessment.fragility,
                ratio: f64::from(assessment.fragility) / 100.0,
            },
            prevention_cost,
            comparison,
        }
    }
}
