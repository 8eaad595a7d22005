use super::{CheckContext, CheckFailure, RuleStatus};
use crate::config::AlertPolicy;
use crate::models::AlertCode;
use crate::utils::parse_iso8601;

pub(super) fn delivery_volume(ctx: &CheckContext<'_>) -> Result<RuleStatus, CheckFailure> {
    let volume = ctx.response.recommended_volume()?;
    let demand = ctx.request.forecasted_demand;

    if volume < 0 {
        return Err(CheckFailure::assertion(
            "recommended_volume must not be negative",
            ">= 0",
            volume,
        ));
    }
    if volume as f64 > demand {
        return Err(CheckFailure::assertion(
            "recommended_volume exceeds the forecasted demand",
            format!("<= {demand}"),
            volume,
        ));
    }
    Ok(RuleStatus::passed())
}

/// A suggested time must fall inside the requested window, both ends inclusive.
pub(super) fn schedule_window(ctx: &CheckContext<'_>) -> Result<RuleStatus, CheckFailure> {
    let Some(suggested) = ctx.response.suggested_delivery_time()? else {
        return Ok(RuleStatus::passed_with_note(
            "suggested_delivery_time is null (delivery not possible)",
        ));
    };

    let window = &ctx.request.delivery_window;
    let at = parse_iso8601(suggested).map_err(|_| {
        CheckFailure::assertion(
            "suggested_delivery_time is not an ISO-8601 timestamp",
            "ISO-8601 timestamp",
            suggested,
        )
    })?;
    let within = window
        .contains(at)
        .map_err(|err| CheckFailure::invalid_fixture(err.to_string()))?;

    if !within {
        return Err(CheckFailure::assertion(
            "suggested_delivery_time falls outside the delivery window",
            format!("between {} and {}", window.start, window.end),
            suggested,
        ));
    }
    Ok(RuleStatus::passed())
}

/// Impossible delivery: zero volume, null time and a delivery-blocking alert.
///
/// A delivery-blocking alert anywhere in the list requires zero volume and a
/// null time. A null time without such an alert is a failure. The primary
/// (first) alert must be a recognised code unless the policy is lenient.
pub(super) fn delivery_not_possible(ctx: &CheckContext<'_>) -> Result<RuleStatus, CheckFailure> {
    let view = ctx.response;
    let alerts: Vec<AlertCode> = view.alerts()?.into_iter().map(AlertCode::parse).collect();

    if let (Some(AlertCode::Unrecognized(code)), AlertPolicy::Strict) =
        (alerts.first(), ctx.options.alert_policy)
    {
        return Err(CheckFailure::invalid_fixture(format!(
            "unrecognized primary alert code: {code:?}"
        )));
    }

    if let Some(blocking) = alerts.iter().find(|code| code.blocks_delivery()) {
        return empty_delivery(ctx, blocking);
    }

    if view.suggested_delivery_time()?.is_none() {
        return Err(CheckFailure::assertion(
            "suggested_delivery_time is null without a declared impossible delivery",
            "a delivery-blocking alert",
            format!(
                "alerts [{}]",
                alerts
                    .iter()
                    .map(AlertCode::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }

    match alerts.first() {
        None => Ok(RuleStatus::passed()),
        Some(AlertCode::Unrecognized(code)) => Ok(RuleStatus::passed_with_note(format!(
            "unrecognized primary alert code permitted: {code:?}"
        ))),
        Some(primary) => Ok(RuleStatus::passed_with_note(format!(
            "primary alert {:?} does not declare delivery impossible",
            primary.as_str()
        ))),
    }
}

fn empty_delivery(
    ctx: &CheckContext<'_>,
    blocking: &AlertCode,
) -> Result<RuleStatus, CheckFailure> {
    let volume = ctx.response.recommended_volume()?;
    let time = ctx.response.suggested_delivery_time()?;

    let mut violations = Vec::new();
    if volume != 0 {
        violations.push("recommended_volume should be 0");
    }
    if time.is_some() {
        violations.push("suggested_delivery_time should be null");
    }
    if violations.is_empty() {
        return Ok(RuleStatus::passed());
    }
    Err(CheckFailure::assertion(
        format!("delivery is not possible ({blocking}): {}", violations.join("; ")),
        "recommended_volume 0 and suggested_delivery_time null",
        format!(
            "recommended_volume {volume} and suggested_delivery_time {}",
            time.unwrap_or("null")
        ),
    ))
}
