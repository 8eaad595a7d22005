use anyhow::Context;
use std::process::ExitCode;

use sfa_contract::config::{Config, ReportFormat};
use sfa_contract::scenario::{run_scenarios, ScenarioError, VerificationReport};
use sfa_contract::{fixtures, logger, AllocationClient};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // A missing .env is fine; settings fall back to defaults.
    dotenv::dotenv().ok();

    let config = Config::load().context("failed to load configuration")?;
    logger::init_logger(config.log_json)?;

    let client = AllocationClient::from_config(&config)?;
    tracing::info!(
        base_url = %client.base_url(),
        timeout_secs = config.timeout_secs,
        alert_policy = ?config.alert_policy,
        "running allocation contract scenarios"
    );

    let scenarios = fixtures::all_scenarios();
    let results = run_scenarios(&client, &scenarios, config.alert_policy).await;

    let mut all_passed = true;
    let mut reports: Vec<&VerificationReport> = Vec::new();
    let mut errors: Vec<&ScenarioError> = Vec::new();
    for result in &results {
        match result {
            Ok(report) => {
                all_passed &= report.is_success();
                reports.push(report);
            }
            Err(err) => {
                all_passed = false;
                errors.push(err);
            }
        }
    }

    match config.report_format {
        ReportFormat::Text => {
            for report in &reports {
                println!("{report}");
            }
            for err in &errors {
                println!("{err}\n");
            }
        }
        ReportFormat::Json => {
            let errors: Vec<String> = errors.iter().map(|err| err.to_string()).collect();
            let summary = serde_json::json!({
                "passed": all_passed,
                "reports": reports,
                "errors": errors,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
