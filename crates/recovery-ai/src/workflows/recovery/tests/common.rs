use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::config::AllocationConfig;
use crate::workflows::recovery::domain::{Case, CaseId, CaseStatus, Partner, PartnerId};
use crate::workflows::recovery::lifecycle::CaseIntake;
use crate::workflows::recovery::repository::{CaseRepository, PartnerDirectory, RepositoryError};
use crate::workflows::recovery::{recovery_router, RecoveryService};

pub(super) fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn later() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 15, 16, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn partner(id: &str, name: &str, recovery_rate: f64, active: u32, capacity: u32) -> Partner {
    Partner {
        id: PartnerId(id.to_string()),
        name: name.to_string(),
        recovery_rate,
        active_cases: active,
        capacity,
        regions: vec!["NA".to_string()],
    }
}

/// Best recovery rate is `dca-003`; largest capacity is `dca-004`.
pub(super) fn partners() -> Vec<Partner> {
    vec![
        partner("dca-001", "SwiftRecover Global", 0.82, 145, 200),
        partner("dca-002", "Apex Collections", 0.76, 89, 150),
        partner("dca-003", "Northwind Internal Ops", 0.91, 30, 100),
        partner("dca-004", "Harbor Volume Recovery", 0.65, 210, 500),
        partner("dca-005", "Prestige Worldwide", 0.88, 45, 80),
    ]
}

pub(super) fn case(id: &str, amount: f64, days_overdue: i64) -> Case {
    CaseIntake {
        customer_name: Some(format!("Customer {id}")),
        amount: Some(amount),
        currency: None,
        days_overdue: Some(days_overdue),
    }
    .into_case(CaseId(id.to_string()), at())
    .expect("valid intake")
}

pub(super) fn case_with_status(id: &str, amount: f64, status: CaseStatus) -> Case {
    let mut case = case(id, amount, 30);
    case.status = status;
    if !status.is_unassigned() {
        case.assigned_partner_id = Some(PartnerId("dca-002".to_string()));
        case.assigned_at = Some(at());
    }
    case
}

#[derive(Default, Clone)]
pub(super) struct MemoryCases {
    pub(super) records: Arc<Mutex<Vec<Case>>>,
}

impl MemoryCases {
    pub(super) fn seeded(cases: Vec<Case>) -> Self {
        Self {
            records: Arc::new(Mutex::new(cases)),
        }
    }
}

impl CaseRepository for MemoryCases {
    fn insert(&self, case: Case) -> Result<Case, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == case.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(0, case.clone());
        Ok(case)
    }

    fn modify<F, E>(&self, id: &CaseId, change: F) -> Result<Case, E>
    where
        F: FnOnce(&Case) -> Result<Case, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or(RepositoryError::NotFound)?;
        let updated = change(slot)?;
        *slot = updated.clone();
        Ok(updated)
    }

    fn fetch(&self, id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|case| &case.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Case>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPartners {
    pub(super) partners: Vec<Partner>,
}

impl PartnerDirectory for MemoryPartners {
    fn list(&self) -> Result<Vec<Partner>, RepositoryError> {
        Ok(self.partners.clone())
    }
}

pub(super) struct UnavailableCases;

impl CaseRepository for UnavailableCases {
    fn insert(&self, _case: Case) -> Result<Case, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify<F, E>(&self, _id: &CaseId, _change: F) -> Result<Case, E>
    where
        F: FnOnce(&Case) -> Result<Case, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn fetch(&self, _id: &CaseId) -> Result<Option<Case>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Case>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    cases: Vec<Case>,
) -> (RecoveryService<MemoryCases, MemoryPartners>, MemoryCases) {
    build_service_with(cases, partners(), AllocationConfig::default())
}

pub(super) fn build_service_with(
    cases: Vec<Case>,
    partners: Vec<Partner>,
    allocation: AllocationConfig,
) -> (RecoveryService<MemoryCases, MemoryPartners>, MemoryCases) {
    let repository = MemoryCases::seeded(cases);
    let service = RecoveryService::new(
        Arc::new(repository.clone()),
        Arc::new(MemoryPartners { partners }),
        allocation,
    );
    (service, repository)
}

pub(super) fn router_with_service(
    service: RecoveryService<MemoryCases, MemoryPartners>,
) -> axum::Router {
    recovery_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
