use serde::Serialize;

use super::domain::{Case, CaseStatus, Partner, PartnerId, SlaBreachRisk};

const ACCURATE_PREDICTION_FLOOR: u8 = 80;
const PREDICTED_RESOLUTION_FLOOR: u8 = 70;

/// Headline figures for the operations dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_cases: usize,
    pub active_cases: usize,
    pub outstanding_amount: f64,
    pub recovered_amount: f64,
    pub high_sla_risk: usize,
    /// Percent of resolved cases the scorer rated above 80.
    pub prediction_accuracy: f64,
    pub status_breakdown: Vec<StatusCount>,
    pub partners: Vec<PartnerPerformance>,
    pub model_quality: ModelQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: CaseStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerPerformance {
    pub partner_id: PartnerId,
    pub name: String,
    pub assigned_cases: usize,
    pub resolved_cases: usize,
    pub recovered_amount: f64,
    pub utilisation: f64,
}

/// Precision/recall of "probability above 70" against actual resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelQuality {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl PortfolioSummary {
    pub fn from_cases(cases: &[Case], partners: &[Partner]) -> Self {
        let resolved: Vec<&Case> = cases
            .iter()
            .filter(|case| case.status == CaseStatus::Resolved)
            .collect();

        let accurately_predicted = resolved
            .iter()
            .filter(|case| {
                case.analysis
                    .as_ref()
                    .is_some_and(|analysis| analysis.recovery_probability > ACCURATE_PREDICTION_FLOOR)
            })
            .count();

        let status_breakdown = CaseStatus::ALL
            .iter()
            .map(|&status| StatusCount {
                status,
                count: cases.iter().filter(|case| case.status == status).count(),
            })
            .collect();

        let partners = partners
            .iter()
            .map(|partner| partner_performance(partner, cases))
            .collect();

        Self {
            total_cases: cases.len(),
            active_cases: cases.iter().filter(|case| case.is_active()).count(),
            outstanding_amount: cases
                .iter()
                .filter(|case| case.is_active())
                .map(|case| case.amount)
                .sum(),
            recovered_amount: resolved.iter().map(|case| case.amount).sum(),
            high_sla_risk: cases
                .iter()
                .filter(|case| {
                    case.analysis
                        .as_ref()
                        .is_some_and(|analysis| analysis.sla_breach_risk == SlaBreachRisk::High)
                })
                .count(),
            prediction_accuracy: percentage(accurately_predicted, resolved.len()),
            status_breakdown,
            partners,
            model_quality: ModelQuality::from_cases(cases),
        }
    }

    pub fn count_for(&self, status: CaseStatus) -> usize {
        self.status_breakdown
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

impl ModelQuality {
    /// Only scored cases take part; undefined ratios report zero.
    pub fn from_cases(cases: &[Case]) -> Self {
        let (mut true_positive, mut false_positive, mut false_negative) = (0usize, 0usize, 0usize);

        for case in cases {
            let Some(analysis) = &case.analysis else {
                continue;
            };
            let predicted = analysis.recovery_probability > PREDICTED_RESOLUTION_FLOOR;
            let actual = case.status == CaseStatus::Resolved;
            match (predicted, actual) {
                (true, true) => true_positive += 1,
                (true, false) => false_positive += 1,
                (false, true) => false_negative += 1,
                (false, false) => {}
            }
        }

        let precision = ratio(true_positive, true_positive + false_positive);
        let recall = ratio(true_positive, true_positive + false_negative);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1,
        }
    }
}

fn partner_performance(partner: &Partner, cases: &[Case]) -> PartnerPerformance {
    let assigned: Vec<&Case> = cases
        .iter()
        .filter(|case| case.assigned_partner_id.as_ref() == Some(&partner.id))
        .collect();
    let resolved: Vec<&&Case> = assigned
        .iter()
        .filter(|case| case.status == CaseStatus::Resolved)
        .collect();

    PartnerPerformance {
        partner_id: partner.id.clone(),
        name: partner.name.clone(),
        assigned_cases: assigned.len(),
        resolved_cases: resolved.len(),
        recovered_amount: resolved.iter().map(|case| case.amount).sum(),
        utilisation: partner.utilisation(),
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn percentage(numerator: usize, denominator: usize) -> f64 {
    ratio(numerator, denominator) * 100.0
}
