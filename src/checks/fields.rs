use super::{CheckContext, CheckFailure, RuleStatus};
use crate::models::response::{json_type_name, FieldProblem, REQUIRED_FIELDS};
use crate::utils::parse_iso8601;

/// Presence and type of every required field, all problems reported at once.
///
/// `suggested_delivery_time` is nullable: it must be present, and when it is
/// not null it must be an ISO-8601 string.
pub(super) fn required_fields(ctx: &CheckContext<'_>) -> Result<RuleStatus, CheckFailure> {
    let view = ctx.response;
    if !view.body().is_object() {
        return Err(CheckFailure::assertion(
            "response body is not a JSON object",
            "an object",
            json_type_name(view.body()),
        ));
    }

    let mut problems: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !view.has_field(field))
        .map(|field| format!("missing required field: {field}"))
        .collect();

    let mut field_errors = Vec::new();
    field_errors.extend(view.station_id().err());
    field_errors.extend(view.recommended_volume().err());
    field_errors.extend(view.recommended_unit().err());
    match view.suggested_delivery_time() {
        Ok(Some(time)) => {
            if let Err(err) = parse_iso8601(time) {
                problems.push(format!("suggested_delivery_time: {err}"));
            }
        }
        Ok(None) => {}
        Err(err) => field_errors.push(err),
    }
    field_errors.extend(view.alerts().err());
    field_errors.extend(view.fallback().err());

    // Missing fields are already listed.
    problems.extend(
        field_errors
            .into_iter()
            .filter(|err| err.problem != FieldProblem::Missing)
            .map(|err| err.to_string()),
    );

    if problems.is_empty() {
        Ok(RuleStatus::passed())
    } else {
        Err(CheckFailure::assertion(
            "response violates the required-fields contract",
            format!("fields {}", REQUIRED_FIELDS.join(", ")),
            problems.join("; "),
        ))
    }
}

pub(super) fn station_echo(ctx: &CheckContext<'_>) -> Result<RuleStatus, CheckFailure> {
    let station_id = ctx.response.station_id()?;
    if station_id != ctx.request.station_id {
        return Err(CheckFailure::assertion(
            "station_id does not match the requested station",
            &ctx.request.station_id,
            station_id,
        ));
    }
    Ok(RuleStatus::passed())
}
