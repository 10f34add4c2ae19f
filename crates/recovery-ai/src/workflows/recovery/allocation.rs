use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Actor, Analysis, AuditAction, Case, CaseId, CaseStatus, Partner, PartnerId};
use super::error::RecoveryError;
use super::selection::{top_by_capacity, top_by_recovery_rate};

pub const AUTO_ALLOCATOR: &str = "AUTO_ALLOCATOR";
pub const BATCH_OPTIMIZER: &str = "BATCH_OPTIMIZER";

/// Value segment used by batch allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    HighValue,
    Standard,
}

impl Segment {
    pub fn of(case: &Case) -> Self {
        if case.is_high_value() {
            Segment::HighValue
        } else {
            Segment::Standard
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Segment::HighValue => "High Value",
            Segment::Standard => "Standard",
        }
    }
}

/// Result of one batch allocation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchAllocation {
    /// Every input case in input order; ineligible cases are unchanged.
    pub cases: Vec<Case>,
    pub assignments: BTreeMap<CaseId, PartnerId>,
    pub high_value: usize,
    pub standard: usize,
}

impl BatchAllocation {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Append a case to the result, counting it when it was assigned in `segment`.
    pub fn push(&mut self, case: Case, segment: Option<Segment>) {
        if let (Some(segment), Some(partner_id)) = (segment, &case.assigned_partner_id) {
            match segment {
                Segment::HighValue => self.high_value += 1,
                Segment::Standard => self.standard += 1,
            }
            self.assignments.insert(case.id.clone(), partner_id.clone());
        }
        self.cases.push(case);
    }
}

/// Partners a batch routes to, chosen once from one partner snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BatchTargets<'a> {
    strategic: &'a Partner,
    volume: &'a Partner,
}

impl<'a> BatchTargets<'a> {
    pub fn from_partners(partners: &'a [Partner]) -> Result<Self, RecoveryError> {
        Ok(Self {
            strategic: top_by_recovery_rate(partners).ok_or(RecoveryError::NoPartnersAvailable)?,
            volume: top_by_capacity(partners).ok_or(RecoveryError::NoPartnersAvailable)?,
        })
    }

    pub fn partner_for(&self, segment: Segment) -> &'a Partner {
        match segment {
            Segment::HighValue => self.strategic,
            Segment::Standard => self.volume,
        }
    }
}

/// Pick the partner for an automatic allocation.
///
/// The analysis' recommendation is used verbatim when present; otherwise the partner
/// with the best recovery rate wins.
pub fn select_auto(
    analysis: Option<&Analysis>,
    partners: &[Partner],
) -> Result<PartnerId, RecoveryError> {
    let fallback = top_by_recovery_rate(partners).ok_or(RecoveryError::NoPartnersAvailable)?;

    Ok(analysis
        .and_then(|analysis| analysis.recommended_partner_id.clone())
        .unwrap_or_else(|| fallback.id.clone()))
}

pub fn allocate_auto(
    case: &Case,
    partners: &[Partner],
    at: DateTime<Utc>,
) -> Result<Case, RecoveryError> {
    ensure_assignable(case)?;
    let partner_id = select_auto(case.analysis.as_ref(), partners)?;

    let mut updated = case.clone();
    let details = format!("Smart-assigned to {partner_id} (best match).");
    updated.assign(
        partner_id,
        at,
        AuditAction::AllocatedAuto,
        Actor::Optimizer(AUTO_ALLOCATOR.to_string()),
        details,
    );
    Ok(updated)
}

/// Assign a case to an operator-chosen partner.
///
/// With `directory` supplied the identifier must be listed there; with `None` it is
/// accepted unchecked.
pub fn allocate_manual(
    case: &Case,
    partner_id: PartnerId,
    directory: Option<&[Partner]>,
    at: DateTime<Utc>,
) -> Result<Case, RecoveryError> {
    ensure_assignable(case)?;
    if let Some(partners) = directory {
        if !partners.iter().any(|partner| partner.id == partner_id) {
            return Err(RecoveryError::UnknownPartner(partner_id));
        }
    }

    let mut updated = case.clone();
    let details = format!("Assigned to partner {partner_id}");
    updated.assign(
        partner_id,
        at,
        AuditAction::AllocatedManual,
        Actor::Admin,
        details,
    );
    Ok(updated)
}

/// Batch-assign a single case; `None` unless it is `NEW` or `AI_PROCESSED`.
pub fn allocate_in_batch(
    case: &Case,
    targets: &BatchTargets<'_>,
    at: DateTime<Utc>,
) -> Option<(Case, Segment)> {
    if !case.status.is_unassigned() {
        return None;
    }

    let segment = Segment::of(case);
    let partner = targets.partner_for(segment);
    let details = format!(
        "Segment: {}. Matched to top performer: {}",
        segment.label(),
        partner.name
    );

    let mut updated = case.clone();
    updated.assign(
        partner.id.clone(),
        at,
        AuditAction::AllocatedBatch,
        Actor::Optimizer(BATCH_OPTIMIZER.to_string()),
        details,
    );
    Some((updated, segment))
}

/// Assign every `NEW`/`AI_PROCESSED` case by value segment.
///
/// High-value cases go to the best recovery rate, the rest to the largest capacity.
/// Both targets come from the same partner snapshot and no case's choice affects
/// another's.
pub fn allocate_batch(
    cases: &[Case],
    partners: &[Partner],
    at: DateTime<Utc>,
) -> Result<BatchAllocation, RecoveryError> {
    let mut batch = BatchAllocation::default();
    if !cases.iter().any(|case| case.status.is_unassigned()) {
        batch.cases = cases.to_vec();
        return Ok(batch);
    }

    let targets = BatchTargets::from_partners(partners)?;
    for case in cases {
        match allocate_in_batch(case, &targets, at) {
            Some((assigned, segment)) => batch.push(assigned, Some(segment)),
            None => batch.push(case.clone(), None),
        }
    }

    Ok(batch)
}

fn ensure_assignable(case: &Case) -> Result<(), RecoveryError> {
    if case.status.is_terminal() {
        return Err(RecoveryError::InvalidTransition {
            from: case.status,
            to: CaseStatus::Assigned,
        });
    }
    Ok(())
}
