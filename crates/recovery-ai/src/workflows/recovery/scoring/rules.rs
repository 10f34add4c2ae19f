use super::super::domain::{Case, SlaBreachRisk};

const HIGH_VALUE_BONUS: f64 = 10.0;
const DECAY_PER_DAY_OVERDUE: f64 = 0.5;
const AXIS_CEILING: f64 = 50.0;
const SLA_RISK_CUTOFF: u8 = 50;

/// Younger debt recovers more often; high-value debt gets a fixed bonus.
pub(crate) fn recovery_probability(case: &Case) -> u8 {
    let mut score = 100.0 - f64::from(case.days_overdue) * DECAY_PER_DAY_OVERDUE;
    if case.is_high_value() {
        score += HIGH_VALUE_BONUS;
    }
    score.floor().clamp(0.0, 100.0) as u8
}

/// Amount and age each contribute up to half of the score, saturating independently.
pub(crate) fn priority_score(case: &Case) -> u8 {
    let amount_weight = (case.amount / 1000.0).min(AXIS_CEILING);
    let age_weight = (f64::from(case.days_overdue) / 2.0).min(AXIS_CEILING);
    (amount_weight + age_weight).floor().clamp(0.0, 100.0) as u8
}

pub(crate) fn sla_breach_risk(recovery_probability: u8) -> SlaBreachRisk {
    if recovery_probability < SLA_RISK_CUTOFF {
        SlaBreachRisk::High
    } else {
        SlaBreachRisk::Low
    }
}
