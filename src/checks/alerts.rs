use super::{CheckContext, CheckFailure, RuleStatus};
use crate::models::AlertCode;

/// Every alert is a string code; unknown codes are noted, not failed.
pub(super) fn alert_reporting(ctx: &CheckContext<'_>) -> Result<RuleStatus, CheckFailure> {
    let alerts: Vec<AlertCode> = ctx
        .response
        .alerts()?
        .into_iter()
        .map(AlertCode::parse)
        .collect();

    if ctx.options.expect_alerts && alerts.is_empty() {
        return Err(CheckFailure::assertion(
            "scenario expects alerts but the response has none",
            "at least one alert",
            "[]",
        ));
    }

    let unrecognized: Vec<&str> = alerts
        .iter()
        .filter(|code| !code.is_recognized())
        .map(AlertCode::as_str)
        .collect();
    if unrecognized.is_empty() {
        return Ok(RuleStatus::passed());
    }
    Ok(RuleStatus::passed_with_note(format!(
        "unrecognized alert codes: {}",
        unrecognized.join(", ")
    )))
}
