use super::common::*;
use crate::workflows::recovery::domain::{Case, CaseStatus, PartnerId};
use crate::workflows::recovery::{score_case, ModelQuality, PortfolioSummary};

fn scored_with_status(id: &str, amount: f64, days: i64, status: CaseStatus) -> Case {
    let mut case = score_case(&case(id, amount, days), &partners(), at()).expect("scores");
    case.status = status;
    if !status.is_unassigned() {
        case.assigned_partner_id = Some(PartnerId("dca-001".to_string()));
    }
    case
}

#[test]
fn summary_of_empty_portfolio_is_zeroed() {
    let summary = PortfolioSummary::from_cases(&[], &partners());

    assert_eq!(summary.total_cases, 0);
    assert_eq!(summary.active_cases, 0);
    assert_eq!(summary.prediction_accuracy, 0.0);
    assert_eq!(summary.status_breakdown.len(), CaseStatus::ALL.len());
    assert_eq!(summary.partners.len(), 5);
    assert_eq!(
        summary.model_quality,
        ModelQuality {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0
        }
    );
}

#[test]
fn summary_counts_amounts_and_risk() {
    let cases = vec![
        // probability 95, resolved
        scored_with_status("r1", 10_000.0, 10, CaseStatus::Resolved),
        // probability 75, resolved
        scored_with_status("r2", 4_000.0, 50, CaseStatus::Resolved),
        // probability 20, high risk, still working
        scored_with_status("w1", 6_000.0, 160, CaseStatus::InProgress),
        // probability 90, predicted but closed without recovery
        scored_with_status("c1", 1_000.0, 20, CaseStatus::Closed),
        case("n1", 500.0, 5),
    ];

    let summary = PortfolioSummary::from_cases(&cases, &partners());

    assert_eq!(summary.total_cases, 5);
    assert_eq!(summary.active_cases, 2);
    assert_eq!(summary.outstanding_amount, 6_500.0);
    assert_eq!(summary.recovered_amount, 14_000.0);
    assert_eq!(summary.high_sla_risk, 1);
    assert_eq!(summary.prediction_accuracy, 50.0);
    assert_eq!(summary.count_for(CaseStatus::Resolved), 2);
    assert_eq!(summary.count_for(CaseStatus::New), 1);
    assert_eq!(summary.count_for(CaseStatus::Escalated), 0);

    let swift = summary
        .partners
        .iter()
        .find(|entry| entry.partner_id == PartnerId("dca-001".to_string()))
        .expect("partner listed");
    assert_eq!(swift.assigned_cases, 4);
    assert_eq!(swift.resolved_cases, 2);
    assert_eq!(swift.recovered_amount, 14_000.0);
    assert!((swift.utilisation - 0.725).abs() < 1e-9);

    // predicted: r1, r2, c1 -> tp 2, fp 1; actual resolved r1, r2 -> fn 0
    let quality = summary.model_quality;
    assert!((quality.precision - 2.0 / 3.0).abs() < 1e-9);
    assert!((quality.recall - 1.0).abs() < 1e-9);
    assert!((quality.f1 - 0.8).abs() < 1e-9);
}
