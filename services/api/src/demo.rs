use crate::infra::{demo_cases, demo_partners, InMemoryCaseRepository, InMemoryPartnerDirectory};
use chrono::Utc;
use clap::Args;
use recovery_ai::config::AllocationConfig;
use recovery_ai::error::AppError;
use recovery_ai::workflows::recovery::{
    score, Analysis, Case, CaseId, CaseIntake, PortfolioSummary, RecoveryService,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stop after scoring; leave every case unassigned.
    #[arg(long)]
    pub(crate) skip_batch: bool,
    /// Print the final portfolio summary as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Outstanding amount of the invoice
    #[arg(long)]
    pub(crate) amount: f64,
    /// Days the invoice is past due
    #[arg(long)]
    pub(crate) days_overdue: u32,
    /// Optional customer label for the printed rationale
    #[arg(long)]
    pub(crate) customer: Option<String>,
    /// Print the analysis as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { skip_batch, json } = args;

    let cases = demo_cases(Utc::now())?;
    let service = Arc::new(RecoveryService::new(
        Arc::new(InMemoryCaseRepository::with_cases(cases.clone())),
        Arc::new(InMemoryPartnerDirectory::new(demo_partners())),
        AllocationConfig::default(),
    ));

    println!("Recovery operations demo");
    println!("Scoring {} overdue cases", cases.len());
    for case in &cases {
        let scored = service.score(&case.id)?;
        if let Some(analysis) = &scored.analysis {
            render_analysis_row(&scored, analysis);
        }
    }

    if !skip_batch {
        let batch = service.allocate_batch()?;
        println!(
            "\nBatch allocation: {} cases ({} high value, {} standard)",
            batch.assignments.len(),
            batch.high_value,
            batch.standard
        );
        for (case_id, partner_id) in &batch.assignments {
            println!("  - {case_id} -> {partner_id}");
        }
    }

    let summary = service.insights()?;
    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Portfolio summary unavailable: {err}"),
        }
    } else {
        render_summary(&summary);
    }

    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        amount,
        days_overdue,
        customer,
        json,
    } = args;

    let intake = CaseIntake {
        customer_name: customer,
        amount: Some(amount),
        currency: None,
        days_overdue: Some(i64::from(days_overdue)),
    };
    let case = intake.into_case(CaseId("CASE-ADHOC".to_string()), Utc::now())?;
    let analysis = score(&case, &demo_partners())?;

    if json {
        match serde_json::to_string_pretty(&analysis) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Analysis unavailable: {err}"),
        }
    } else {
        render_analysis_row(&case, &analysis);
        println!("  {}", analysis.rationale);
    }
    Ok(())
}

fn render_analysis_row(case: &Case, analysis: &Analysis) {
    println!(
        "- {} {:<20} {:>10.2} {} | {:>3} days | recovery {:>3}% | priority {:>3} | SLA risk {:?}",
        case.id,
        case.customer_name,
        case.amount,
        case.currency,
        case.days_overdue,
        analysis.recovery_probability,
        analysis.priority_score,
        analysis.sla_breach_risk
    );
}

fn render_summary(summary: &PortfolioSummary) {
    println!("\nPortfolio summary");
    println!(
        "- {} cases | {} active | {:.2} outstanding | {:.2} recovered",
        summary.total_cases,
        summary.active_cases,
        summary.outstanding_amount,
        summary.recovered_amount
    );
    println!("- {} cases at high SLA risk", summary.high_sla_risk);
    println!("Status breakdown:");
    for entry in summary.status_breakdown.iter().filter(|entry| entry.count > 0) {
        println!("  - {}: {}", entry.status, entry.count);
    }
    println!("Partner load:");
    for partner in &summary.partners {
        println!(
            "  - {} ({}): {} assigned | {:.0}% utilised",
            partner.name,
            partner.partner_id,
            partner.assigned_cases,
            partner.utilisation * 100.0
        );
    }
}
