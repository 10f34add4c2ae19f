use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Amount above which a case is treated as high value.
pub const HIGH_VALUE_THRESHOLD: f64 = 50_000.0;

/// Identifier wrapper for cases under recovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for collection-agency partners.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartnerId(pub String);

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    New,
    AiProcessed,
    Assigned,
    InProgress,
    Escalated,
    Resolved,
    Closed,
    Unrecoverable,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 8] = [
        CaseStatus::New,
        CaseStatus::AiProcessed,
        CaseStatus::Assigned,
        CaseStatus::InProgress,
        CaseStatus::Escalated,
        CaseStatus::Resolved,
        CaseStatus::Closed,
        CaseStatus::Unrecoverable,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CaseStatus::New => "NEW",
            CaseStatus::AiProcessed => "AI_PROCESSED",
            CaseStatus::Assigned => "ASSIGNED",
            CaseStatus::InProgress => "IN_PROGRESS",
            CaseStatus::Escalated => "ESCALATED",
            CaseStatus::Resolved => "RESOLVED",
            CaseStatus::Closed => "CLOSED",
            CaseStatus::Unrecoverable => "UNRECOVERABLE",
        }
    }

    /// No further transitions leave a terminal status.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            CaseStatus::Resolved | CaseStatus::Closed | CaseStatus::Unrecoverable
        )
    }

    /// Statuses picked up by batch allocation.
    pub const fn is_unassigned(self) -> bool {
        matches!(self, CaseStatus::New | CaseStatus::AiProcessed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse likelihood of a case missing its service-level target.
///
/// `Medium` is part of the published vocabulary but no scoring rule emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlaBreachRisk {
    Low,
    Medium,
    High,
}

/// Scorer output attached to a case. Replaced wholesale on re-scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub recovery_probability: u8,
    pub priority_score: u8,
    pub sla_breach_risk: SlaBreachRisk,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_partner_id: Option<PartnerId>,
    pub rationale: String,
}

/// Collection agency eligible for allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    /// Historical recovery rate in `[0, 1]`.
    pub recovery_rate: f64,
    pub active_cases: u32,
    pub capacity: u32,
    #[serde(default)]
    pub regions: Vec<String>,
}

impl Partner {
    /// Share of capacity currently in use. Zero-capacity partners report zero.
    pub fn utilisation(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            f64::from(self.active_cases) / f64::from(self.capacity)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionKind {
    Call,
    Email,
    Letter,
    Sms,
}

impl InteractionKind {
    pub const fn label(self) -> &'static str {
        match self {
            InteractionKind::Call => "CALL",
            InteractionKind::Email => "EMAIL",
            InteractionKind::Letter => "LETTER",
            InteractionKind::Sms => "SMS",
        }
    }
}

/// Contact attempt logged against a case by the partner working it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub at: DateTime<Utc>,
    pub kind: InteractionKind,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Created,
    AiScoring,
    AllocatedAuto,
    AllocatedManual,
    AllocatedBatch,
    StatusUpdate,
    InteractionLog,
}

/// Who performed an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    System,
    Ai,
    Admin,
    DcaUser,
    Optimizer(String),
}

impl Actor {
    pub fn label(&self) -> &str {
        match self {
            Actor::System => "SYSTEM",
            Actor::Ai => "AI",
            Actor::Admin => "ADMIN",
            Actor::DcaUser => "DCA_USER",
            Actor::Optimizer(name) => name,
        }
    }
}

/// Immutable record of one state-changing action on a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub actor: Actor,
    pub details: String,
}

/// Unit of overdue debt tracked through the recovery workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub customer_name: String,
    pub amount: f64,
    pub currency: String,
    pub days_overdue: u32,
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_partner_id: Option<PartnerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

impl Case {
    pub fn is_high_value(&self) -> bool {
        self.amount > HIGH_VALUE_THRESHOLD
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    pub(crate) fn record(
        &mut self,
        timestamp: DateTime<Utc>,
        action: AuditAction,
        actor: Actor,
        details: String,
    ) {
        self.audit_log.push(AuditEntry {
            timestamp,
            action,
            actor,
            details,
        });
    }

    pub(crate) fn assign(
        &mut self,
        partner_id: PartnerId,
        at: DateTime<Utc>,
        action: AuditAction,
        actor: Actor,
        details: String,
    ) {
        self.assigned_partner_id = Some(partner_id);
        self.assigned_at = Some(at);
        self.status = CaseStatus::Assigned;
        self.record(at, action, actor, details);
    }
}

/// Explicit partner identity for partner-scoped queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerSession {
    pub partner_id: PartnerId,
}

impl PartnerSession {
    pub fn new(partner_id: PartnerId) -> Self {
        Self { partner_id }
    }
}
