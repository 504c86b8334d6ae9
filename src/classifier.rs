use crate::error::{AccrualError, Result};
use crate::period::{PeriodRange, YearMonth};
use crate::schema::{RecordCore, Status};

/// Assigns a status to one record from its extracted delivery window,
/// expected-receive month, and reporting cutoff. Records that already carry a
/// status are left untouched, so re-running the classifier is a no-op.
///
/// The record must have been through period extraction first; a missing
/// extracted range is a stage-level error.
pub fn classify_record(core: &mut RecordCore) -> Result<()> {
    if core.status.is_some() {
        return Ok(());
    }

    let range = core.description_period.ok_or_else(|| {
        AccrualError::StatusError(format!(
            "record {} has no extracted description period",
            core.line_id
        ))
    })?;
    let expected = core.expected_period.unwrap_or(YearMonth::NONE);

    core.status = Some(classify(range, expected, core.cutoff));
    Ok(())
}

/// The classification rules, evaluated top to bottom; the first true
/// predicate wins and the fall-through is `OutOfRange`.
pub fn classify(range: PeriodRange, expected: YearMonth, cutoff: YearMonth) -> Status {
    let in_range = range.contains(expected);
    let rules = [
        (range.is_unparsable(), Status::FormatError),
        (in_range && expected <= cutoff, Status::Completed),
        (in_range && expected > cutoff, Status::Incomplete),
    ];
    for (hit, status) in rules {
        if hit {
            return status;
        }
    }
    Status::OutOfRange
}
