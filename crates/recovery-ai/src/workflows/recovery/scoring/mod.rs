mod rules;

use chrono::{DateTime, Utc};

use super::domain::{Actor, Analysis, AuditAction, Case, CaseStatus, Partner};
use super::error::RecoveryError;
use super::selection::top_by_recovery_rate;

/// Compute the analysis for one case against the candidate partners.
///
/// Pure: the case is not modified. Fails with `InvalidInput` when the partner list
/// is empty or the amount is negative or not finite.
pub fn score(case: &Case, partners: &[Partner]) -> Result<Analysis, RecoveryError> {
    validate_amount(case.amount)?;

    let partner = top_by_recovery_rate(partners).ok_or_else(|| {
        RecoveryError::InvalidInput("cannot recommend a partner from an empty list".to_string())
    })?;

    let recovery_probability = rules::recovery_probability(case);
    let priority_score = rules::priority_score(case);

    Ok(Analysis {
        recovery_probability,
        priority_score,
        sla_breach_risk: rules::sla_breach_risk(recovery_probability),
        recommended_partner_id: Some(partner.id.clone()),
        rationale: format!(
            "Recovery score {}% based on {} days overdue. Matched to {} for efficiency.",
            recovery_probability, case.days_overdue, partner.name
        ),
    })
}

/// Attach an analysis to a copy of the case, replacing any earlier one.
///
/// `NEW` cases advance to `AI_PROCESSED`; later statuses are left in place.
pub fn apply_analysis(case: &Case, analysis: Analysis, at: DateTime<Utc>) -> Case {
    let mut updated = case.clone();
    let details = format!("Processed. Score: {}", analysis.recovery_probability);
    updated.analysis = Some(analysis);
    if updated.status == CaseStatus::New {
        updated.status = CaseStatus::AiProcessed;
    }
    updated.record(at, AuditAction::AiScoring, Actor::Ai, details);
    updated
}

/// Score a case and return the updated copy carrying the new analysis.
pub fn score_case(
    case: &Case,
    partners: &[Partner],
    at: DateTime<Utc>,
) -> Result<Case, RecoveryError> {
    let analysis = score(case, partners)?;
    Ok(apply_analysis(case, analysis, at))
}

pub(crate) fn validate_amount(amount: f64) -> Result<(), RecoveryError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(RecoveryError::InvalidInput(format!(
            "amount must be a non-negative number (found {amount})"
        )));
    }
    Ok(())
}
