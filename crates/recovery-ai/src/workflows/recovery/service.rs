use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::allocation::{self, BatchAllocation, BatchTargets};
use super::domain::{Case, CaseId, CaseStatus, InteractionKind, Partner, PartnerId, PartnerSession};
use super::error::RecoveryError;
use super::insights::PortfolioSummary;
use super::lifecycle::{self, CaseIntake};
use super::repository::{CaseRepository, PartnerDirectory, RepositoryError};
use super::scoring;
use crate::config::AllocationConfig;

/// Service composing the case store, the partner directory, and the scoring engine.
///
/// Each operation runs the pure engine inside `CaseRepository::modify`, so the
/// engine always sees the stored case and its result is written in the same step.
pub struct RecoveryService<C, P> {
    cases: Arc<C>,
    partners: Arc<P>,
    allocation: AllocationConfig,
}

static CASE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_case_id() -> CaseId {
    let id = CASE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CaseId(format!("CASE-{id:06}"))
}

impl<C, P> RecoveryService<C, P>
where
    C: CaseRepository + 'static,
    P: PartnerDirectory + 'static,
{
    pub fn new(cases: Arc<C>, partners: Arc<P>, allocation: AllocationConfig) -> Self {
        Self {
            cases,
            partners,
            allocation,
        }
    }

    /// Ingest a new case in the `NEW` state.
    pub fn ingest(&self, intake: CaseIntake) -> Result<Case, RecoveryServiceError> {
        let case = intake.into_case(next_case_id(), Utc::now())?;
        let stored = self.cases.insert(case)?;
        info!(case_id = %stored.id, amount = stored.amount, "case ingested");
        Ok(stored)
    }

    pub fn get(&self, id: &CaseId) -> Result<Case, RecoveryServiceError> {
        let case = self.cases.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(case)
    }

    pub fn list(&self) -> Result<Vec<Case>, RecoveryServiceError> {
        Ok(self.cases.list()?)
    }

    pub fn partners(&self) -> Result<Vec<Partner>, RecoveryServiceError> {
        Ok(self.partners.list()?)
    }

    /// Score a case against the current partner list, replacing any earlier analysis.
    pub fn score(&self, id: &CaseId) -> Result<Case, RecoveryServiceError> {
        let partners = self.partners.list()?;
        let at = Utc::now();
        let scored = self.cases.modify(id, |current| {
            scoring::score_case(current, &partners, at).map_err(RecoveryServiceError::from)
        })?;

        if let Some(analysis) = &scored.analysis {
            info!(
                case_id = %scored.id,
                recovery_probability = analysis.recovery_probability,
                priority_score = analysis.priority_score,
                sla_breach_risk = ?analysis.sla_breach_risk,
                "case scored"
            );
        }
        Ok(scored)
    }

    pub fn allocate_auto(&self, id: &CaseId) -> Result<Case, RecoveryServiceError> {
        let partners = self.partners.list()?;
        let at = Utc::now();
        let assigned = self.cases.modify(id, |current| {
            allocation::allocate_auto(current, &partners, at).map_err(RecoveryServiceError::from)
        })?;
        info!(case_id = %assigned.id, partner_id = ?assigned.assigned_partner_id, "case auto-allocated");
        Ok(assigned)
    }

    pub fn allocate_manual(
        &self,
        id: &CaseId,
        partner_id: PartnerId,
    ) -> Result<Case, RecoveryServiceError> {
        let directory = if self.allocation.require_known_partner {
            Some(self.partners.list()?)
        } else {
            None
        };

        let at = Utc::now();
        let assigned = self
            .cases
            .modify(id, |current| {
                allocation::allocate_manual(current, partner_id, directory.as_deref(), at)
                    .map_err(RecoveryServiceError::from)
            })
            .map_err(|err| {
                warn!(case_id = %id, error = %err, "manual allocation rejected");
                err
            })?;
        info!(case_id = %assigned.id, partner_id = ?assigned.assigned_partner_id, "case manually allocated");
        Ok(assigned)
    }

    /// Allocate every unassigned case, routing by one snapshot of the partner list.
    ///
    /// Each case is re-checked while its record is held, so a case closed or
    /// assigned since the listing is left as it is now stored.
    pub fn allocate_batch(&self) -> Result<BatchAllocation, RecoveryServiceError> {
        let snapshot = self.cases.list()?;
        if !snapshot.iter().any(|case| case.status.is_unassigned()) {
            debug!(cases = snapshot.len(), "no cases awaiting batch allocation");
            return Ok(BatchAllocation {
                cases: snapshot,
                ..BatchAllocation::default()
            });
        }

        let partners = self.partners.list()?;
        let targets = BatchTargets::from_partners(&partners)?;
        let at = Utc::now();

        let mut batch = BatchAllocation::default();
        for case in snapshot {
            if !case.status.is_unassigned() {
                batch.push(case, None);
                continue;
            }

            let mut segment = None;
            let stored = self.cases.modify(&case.id, |current| {
                Ok::<_, RecoveryServiceError>(
                    match allocation::allocate_in_batch(current, &targets, at) {
                        Some((assigned, chosen)) => {
                            segment = Some(chosen);
                            assigned
                        }
                        None => current.clone(),
                    },
                )
            })?;
            if segment.is_none() {
                debug!(case_id = %stored.id, status = %stored.status, "case changed since listing; left as stored");
            }
            batch.push(stored, segment);
        }

        info!(
            allocated = batch.assignments.len(),
            high_value = batch.high_value,
            standard = batch.standard,
            "batch allocation complete"
        );
        Ok(batch)
    }

    pub fn update_status(
        &self,
        id: &CaseId,
        status: CaseStatus,
        note: Option<&str>,
    ) -> Result<Case, RecoveryServiceError> {
        let at = Utc::now();
        let mut previous = None;
        let updated = self.cases.modify(id, |current| {
            previous = Some(current.status);
            lifecycle::update_status(current, status, note, at).map_err(RecoveryServiceError::from)
        })?;
        info!(case_id = %updated.id, from = ?previous, to = %updated.status, "case status updated");
        Ok(updated)
    }

    pub fn log_interaction(
        &self,
        id: &CaseId,
        kind: InteractionKind,
        notes: &str,
        outcome: Option<String>,
    ) -> Result<Case, RecoveryServiceError> {
        let at = Utc::now();
        let updated = self.cases.modify(id, |current| {
            Ok::<_, RecoveryServiceError>(lifecycle::log_interaction(
                current, kind, notes, outcome, at,
            ))
        })?;
        debug!(case_id = %updated.id, kind = kind.label(), "interaction logged");
        Ok(updated)
    }

    /// Cases visible to one partner's session.
    pub fn partner_cases(&self, session: &PartnerSession) -> Result<Vec<Case>, RecoveryServiceError> {
        let cases = self.cases.list()?;
        Ok(lifecycle::cases_for_partner(&cases, session)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn insights(&self) -> Result<PortfolioSummary, RecoveryServiceError> {
        let cases = self.cases.list()?;
        let partners = self.partners.list()?;
        Ok(PortfolioSummary::from_cases(&cases, &partners))
    }
}

/// Error raised by the recovery service.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryServiceError {
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
