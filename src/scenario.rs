//! Scenario runner
//!
//! A scenario is one fixture request plus what it is expected to provoke. The
//! runner validates the fixture, submits it, and evaluates every rule against
//! the response. Transport problems abort the scenario; rule failures are
//! collected into the report.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::checks::{verify_response, CheckFailure, CheckOptions, Rule, RuleOutcome, RuleStatus};
use crate::client::{AllocationClient, ClientError};
use crate::config::AlertPolicy;
use crate::models::{AllocationRequest, FixtureError};

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub request: AllocationRequest,
    /// The response is expected to carry at least one alert.
    pub expect_alerts: bool,
}

impl Scenario {
    pub fn new(name: &str, request: AllocationRequest) -> Self {
        Self {
            name: name.to_string(),
            request,
            expect_alerts: false,
        }
    }

    pub fn expecting_alerts(mut self) -> Self {
        self.expect_alerts = true;
        self
    }

    /// Evaluate an already obtained response body.
    pub fn verify(&self, body: &Value, alert_policy: AlertPolicy) -> VerificationReport {
        let options = CheckOptions {
            alert_policy,
            expect_alerts: self.expect_alerts,
        };
        VerificationReport {
            scenario: self.name.clone(),
            station_id: self.request.station_id.clone(),
            outcomes: verify_response(&self.request, body, options),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("scenario {scenario}: invalid fixture: {source}")]
    InvalidFixture {
        scenario: String,
        #[source]
        source: FixtureError,
    },
    #[error("scenario {scenario}: transport failure: {source}")]
    Transport {
        scenario: String,
        #[source]
        source: ClientError,
    },
}

#[derive(Error, Debug)]
#[error("scenario {} failed {} rule(s)\n{}", .0.scenario, .0.failures().count(), .0)]
pub struct VerificationFailed(pub VerificationReport);

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub scenario: String,
    pub station_id: String,
    pub outcomes: Vec<RuleOutcome>,
}

impl VerificationReport {
    pub fn is_success(&self) -> bool {
        !self.outcomes.iter().any(|outcome| outcome.status.is_failed())
    }

    pub fn failures(&self) -> impl Iterator<Item = (Rule, &CheckFailure)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.status.failure().map(|failure| (outcome.rule, failure)))
    }

    pub fn pending(&self) -> impl Iterator<Item = Rule> + '_ {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.is_pending())
            .map(|outcome| outcome.rule)
    }

    pub fn status_of(&self, rule: Rule) -> Option<&RuleStatus> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.rule == rule)
            .map(|outcome| &outcome.status)
    }

    pub fn failed_rules(&self) -> Vec<Rule> {
        self.failures().map(|(rule, _)| rule).collect()
    }

    pub fn into_result(self) -> Result<Self, VerificationFailed> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(VerificationFailed(self))
        }
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        let pending = self.pending().count();
        writeln!(
            f,
            "scenario {} ({}): {} passed, {failed} failed, {pending} pending",
            self.scenario,
            self.station_id,
            self.outcomes.len() - failed - pending,
        )?;
        for outcome in &self.outcomes {
            match &outcome.status {
                RuleStatus::Passed { note: None } => writeln!(f, "  PASS    {}", outcome.rule)?,
                RuleStatus::Passed { note: Some(note) } => {
                    writeln!(f, "  PASS    {} ({note})", outcome.rule)?
                }
                RuleStatus::Pending { reason } => {
                    writeln!(f, "  PENDING {}: {reason}", outcome.rule)?
                }
                RuleStatus::Failed { failure } => {
                    writeln!(f, "  FAIL    {}: {failure}", outcome.rule)?;
                    writeln!(f, "          requirement: {}", outcome.requirement)?
                }
            }
        }
        Ok(())
    }
}

/// Validate, submit, and verify one scenario.
pub async fn run_scenario(
    client: &AllocationClient,
    scenario: &Scenario,
    alert_policy: AlertPolicy,
) -> Result<VerificationReport, ScenarioError> {
    scenario.request.validate().map_err(|source| {
        error!(scenario = %scenario.name, error = %source, "invalid fixture");
        ScenarioError::InvalidFixture {
            scenario: scenario.name.clone(),
            source,
        }
    })?;

    let body = client.allocate(&scenario.request).await.map_err(|source| {
        error!(scenario = %scenario.name, error = %source, "scenario aborted");
        ScenarioError::Transport {
            scenario: scenario.name.clone(),
            source,
        }
    })?;

    let report = scenario.verify(&body, alert_policy);
    if report.is_success() {
        info!(
            scenario = %scenario.name,
            pending = report.pending().count(),
            "scenario passed"
        );
    } else {
        warn!(
            scenario = %scenario.name,
            failed = report.failures().count(),
            "scenario failed"
        );
    }
    Ok(report)
}

/// Run scenarios one after another; one scenario's failure never skips the rest.
pub async fn run_scenarios(
    client: &AllocationClient,
    scenarios: &[Scenario],
    alert_policy: AlertPolicy,
) -> Vec<Result<VerificationReport, ScenarioError>> {
    let mut results = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        results.push(run_scenario(client, scenario, alert_policy).await);
    }
    results
}
