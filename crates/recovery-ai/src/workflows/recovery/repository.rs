use super::domain::{Case, CaseId, Partner};

/// Storage abstraction so the service module can be exercised in isolation.
pub trait CaseRepository: Send + Sync {
    fn insert(&self, case: Case) -> Result<Case, RepositoryError>;
    /// Run `change` against the stored case and persist its result in one step.
    ///
    /// Implementations hold the record exclusively while `change` runs, so fields
    /// and audit trail are written together and no concurrent write is lost. Nothing
    /// is stored when `change` fails.
    fn modify<F, E>(&self, id: &CaseId, change: F) -> Result<Case, E>
    where
        F: FnOnce(&Case) -> Result<Case, E>,
        E: From<RepositoryError>;
    fn fetch(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError>;
    /// Snapshot of every case, newest first.
    fn list(&self) -> Result<Vec<Case>, RepositoryError>;
}

/// Read-only view of the partner agencies.
pub trait PartnerDirectory: Send + Sync {
    fn list(&self) -> Result<Vec<Partner>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
