use super::{CheckContext, CheckFailure, RuleStatus};
use crate::models::response::BALANCED_FALLBACK;
use crate::models::OptimizationMode;

pub(super) fn optimization_mode(ctx: &CheckContext<'_>) -> Result<RuleStatus, CheckFailure> {
    match &ctx.request.optimization_mode {
        OptimizationMode::Cost => Ok(RuleStatus::pending(
            "Cost mode is not verified: no oracle for the minimal delivery cost",
        )),
        OptimizationMode::Availability => Ok(RuleStatus::pending(
            "Availability mode has no acceptance criteria",
        )),
        OptimizationMode::Balanced => {
            let fallback = ctx.response.fallback()?;
            if fallback != BALANCED_FALLBACK {
                return Err(CheckFailure::assertion(
                    "fallback note does not match for Balanced optimization",
                    format!("{BALANCED_FALLBACK:?}"),
                    format!("{fallback:?}"),
                ));
            }
            Ok(RuleStatus::passed())
        }
        OptimizationMode::Unrecognized(mode) => Err(CheckFailure::invalid_fixture(format!(
            "invalid optimization mode: {mode:?}"
        ))),
    }
}

/// The unit is echoed verbatim; no conversion between liters and gallons.
pub(super) fn unit_echo(ctx: &CheckContext<'_>) -> Result<RuleStatus, CheckFailure> {
    let unit = ctx.response.recommended_unit()?;
    let requested = ctx.request.demand_unit.as_str();
    if unit != requested {
        return Err(CheckFailure::assertion(
            "recommended unit does not match requested demand unit",
            requested,
            unit,
        ));
    }
    Ok(RuleStatus::passed())
}
