//! Case scoring, partner allocation, and the case lifecycle for debt recovery.
//!
//! The engine functions in `scoring`, `allocation`, and `lifecycle` are pure: they
//! take a case snapshot and return an updated copy. `RecoveryService` supplies the
//! clock and persistence around them.

pub mod allocation;
pub mod domain;
mod error;
pub mod insights;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod scoring;
mod selection;
pub mod service;

#[cfg(test)]
mod tests;

pub use allocation::{
    allocate_auto, allocate_batch, allocate_in_batch, allocate_manual, select_auto,
    BatchAllocation, BatchTargets, Segment,
};
pub use domain::{
    Actor, Analysis, AuditAction, AuditEntry, Case, CaseId, CaseStatus, Interaction,
    InteractionKind, Partner, PartnerId, PartnerSession, SlaBreachRisk, HIGH_VALUE_THRESHOLD,
};
pub use error::RecoveryError;
pub use insights::{ModelQuality, PartnerPerformance, PortfolioSummary, StatusCount};
pub use lifecycle::{cases_for_partner, log_interaction, update_status, CaseIntake};
pub use repository::{CaseRepository, PartnerDirectory, RepositoryError};
pub use router::recovery_router;
pub use scoring::{apply_analysis, score, score_case};
pub use selection::{top_by_capacity, top_by_recovery_rate};
pub use service::{RecoveryService, RecoveryServiceError};
