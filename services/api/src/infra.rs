use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use recovery_ai::workflows::recovery::{
    Case, CaseId, CaseIntake, CaseRepository, Partner, PartnerDirectory, PartnerId,
    RecoveryError, RepositoryError,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Case store held in process memory, newest case first.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCaseRepository {
    records: Arc<Mutex<Vec<Case>>>,
}

impl InMemoryCaseRepository {
    pub(crate) fn with_cases(cases: Vec<Case>) -> Self {
        Self {
            records: Arc::new(Mutex::new(cases)),
        }
    }
}

impl CaseRepository for InMemoryCaseRepository {
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
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
    }
}

/// Fixed partner directory loaded at startup.
#[derive(Clone)]
pub(crate) struct InMemoryPartnerDirectory {
    partners: Arc<Vec<Partner>>,
}

impl InMemoryPartnerDirectory {
    pub(crate) fn new(partners: Vec<Partner>) -> Self {
        Self {
            partners: Arc::new(partners),
        }
    }
}

impl PartnerDirectory for InMemoryPartnerDirectory {
    fn list(&self) -> Result<Vec<Partner>, RepositoryError> {
        Ok(self.partners.as_ref().clone())
    }
}

fn partner(
    id: &str,
    name: &str,
    recovery_rate: f64,
    active_cases: u32,
    capacity: u32,
    regions: &[&str],
) -> Partner {
    Partner {
        id: PartnerId(id.to_string()),
        name: name.to_string(),
        recovery_rate,
        active_cases,
        capacity,
        regions: regions.iter().map(|region| region.to_string()).collect(),
    }
}

pub(crate) fn demo_partners() -> Vec<Partner> {
    vec![
        partner("dca-001", "SwiftRecover Global", 0.82, 145, 200, &["NA", "EU"]),
        partner("dca-002", "Apex Collections", 0.76, 89, 150, &["APAC"]),
        partner("dca-003", "Meridian Internal Ops", 0.91, 30, 100, &["GLOBAL"]),
        partner("dca-004", "Harbor Volume Recovery", 0.65, 210, 500, &["NA"]),
        partner("dca-005", "Prestige Worldwide", 0.88, 45, 80, &["EU"]),
    ]
}

/// Deterministic demo portfolio: (customer, amount, days overdue).
const DEMO_PORTFOLIO: &[(&str, f64, i64)] = &[
    ("Acme Logistics", 82_500.0, 12),
    ("Globex Corp", 4_350.0, 95),
    ("Soylent Corp", 51_200.0, 140),
    ("Initech", 18_900.0, 33),
    ("Umbrella Corp", 120_000.0, 7),
    ("Stark Industries", 700.0, 171),
    ("Wayne Enterprises", 50_000.0, 60),
    ("Cyberdyne Systems", 27_640.0, 110),
];

pub(crate) fn demo_cases(now: DateTime<Utc>) -> Result<Vec<Case>, RecoveryError> {
    DEMO_PORTFOLIO
        .iter()
        .enumerate()
        .map(|(idx, (customer, amount, days_overdue))| {
            let intake = CaseIntake {
                customer_name: Some(customer.to_string()),
                amount: Some(*amount),
                currency: Some("USD".to_string()),
                days_overdue: Some(*days_overdue),
            };
            let created_at = now - Duration::days(*days_overdue);
            intake.into_case(CaseId(format!("CASE-DEMO-{:03}", idx + 1)), created_at)
        })
        .collect()
}
