use super::domain::{CaseStatus, PartnerId};

/// Failures raised by the scoring, allocation, and lifecycle operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecoveryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no partners available for allocation")]
    NoPartnersAvailable,
    #[error("unknown partner {0}")]
    UnknownPartner(PartnerId),
    #[error("case cannot move from {from} to {to}")]
    InvalidTransition { from: CaseStatus, to: CaseStatus },
}
