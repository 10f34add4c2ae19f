use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Actor, AuditAction, Case, CaseId, CaseStatus, Interaction, InteractionKind, PartnerSession,
};
use super::error::RecoveryError;
use super::scoring::validate_amount;

const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_CUSTOMER: &str = "Unknown";

/// Partial case supplied by ingestion; missing fields take documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseIntake {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub days_overdue: Option<i64>,
}

impl CaseIntake {
    /// Materialize a `NEW` case seeded with a single `CREATED` audit entry.
    pub fn into_case(self, id: CaseId, at: DateTime<Utc>) -> Result<Case, RecoveryError> {
        let amount = self.amount.unwrap_or(0.0);
        validate_amount(amount)?;

        let days_overdue = self.days_overdue.unwrap_or(0);
        let days_overdue = u32::try_from(days_overdue).map_err(|_| {
            RecoveryError::InvalidInput(format!(
                "days overdue must be a non-negative integer (found {days_overdue})"
            ))
        })?;

        let mut case = Case {
            id,
            customer_name: self
                .customer_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CUSTOMER.to_string()),
            amount,
            currency: self
                .currency
                .filter(|currency| !currency.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            days_overdue,
            status: CaseStatus::New,
            assigned_partner_id: None,
            assigned_at: None,
            interactions: Vec::new(),
            audit_log: Vec::new(),
            created_at: at,
            analysis: None,
        };
        case.record(
            at,
            AuditAction::Created,
            Actor::System,
            "Case ingested".to_string(),
        );
        Ok(case)
    }
}

/// Apply a status change reported by the team working the case.
///
/// `NEW`, `AI_PROCESSED`, and `ASSIGNED` are only entered through ingestion, scoring,
/// and allocation. Terminal cases reject every change, and `IN_PROGRESS` needs an
/// assigned partner.
pub fn update_status(
    case: &Case,
    status: CaseStatus,
    note: Option<&str>,
    at: DateTime<Utc>,
) -> Result<Case, RecoveryError> {
    let driven_elsewhere = matches!(
        status,
        CaseStatus::New | CaseStatus::AiProcessed | CaseStatus::Assigned
    );
    let unassigned_work = status == CaseStatus::InProgress && case.assigned_partner_id.is_none();

    if case.status.is_terminal() || driven_elsewhere || unassigned_work {
        return Err(RecoveryError::InvalidTransition {
            from: case.status,
            to: status,
        });
    }

    let mut updated = case.clone();
    updated.status = status;
    updated.record(
        at,
        AuditAction::StatusUpdate,
        Actor::DcaUser,
        format!("Changed to {status}. Note: {}", note.unwrap_or_default()),
    );
    Ok(updated)
}

pub fn log_interaction(
    case: &Case,
    kind: InteractionKind,
    notes: &str,
    outcome: Option<String>,
    at: DateTime<Utc>,
) -> Case {
    let mut updated = case.clone();
    let id = format!("{}-INT-{:03}", case.id, case.interactions.len() + 1);
    updated.interactions.push(Interaction {
        id,
        at,
        kind,
        notes: notes.to_string(),
        outcome,
    });
    updated.record(
        at,
        AuditAction::InteractionLog,
        Actor::DcaUser,
        format!("{}: {}", kind.label(), notes),
    );
    updated
}

/// Cases assigned to the session's partner, in input order.
pub fn cases_for_partner<'a>(cases: &'a [Case], session: &PartnerSession) -> Vec<&'a Case> {
    cases
        .iter()
        .filter(|case| case.assigned_partner_id.as_ref() == Some(&session.partner_id))
        .collect()
}
