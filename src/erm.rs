use crate::decision::PROCUREMENT_ERROR;
use crate::error::{AccrualError, Result};
use crate::period::{PeriodRange, YearMonth};
use crate::schema::{EntityKind, PoRecord, Status};

/// Refines blank PO statuses using receipt quantities and billing balances
/// before the generic classifier runs. Records the table leaves blank
/// (including unparsable descriptions) fall through to the classifier.
///
/// Lines the procurement team flagged with the literal `error` remark are
/// skipped here; the decision stage declines them outright.
pub fn refine_po_statuses(records: &mut [PoRecord], entity: EntityKind) -> Result<()> {
    for record in records.iter_mut() {
        if record.core.status.is_some() {
            continue;
        }
        if record.core.procurement_remark.as_deref() == Some(PROCUREMENT_ERROR) {
            continue;
        }

        let range = record.core.description_period.ok_or_else(|| {
            AccrualError::StatusError(format!(
                "record {} has no extracted description period",
                record.core.line_id
            ))
        })?;
        let expected = record.core.expected_period.unwrap_or(YearMonth::NONE);

        record.core.status = receipt_status(
            entity,
            range,
            expected,
            record.core.cutoff,
            record.entry_quantity,
            record.received_quantity,
            record.core.entry_amount,
            record.entry_billed_amount,
        );
    }
    Ok(())
}

/// The receipt-aware rule table, evaluated top to bottom, first true
/// predicate wins. Returns `None` where no rule applies.
#[allow(clippy::too_many_arguments)]
fn receipt_status(
    entity: EntityKind,
    range: PeriodRange,
    expected: YearMonth,
    cutoff: YearMonth,
    entry_quantity: f64,
    received_quantity: f64,
    entry_amount: f64,
    billed_amount: f64,
) -> Option<Status> {
    let in_range = range.contains(expected);
    let due = expected <= cutoff;
    let parsable = !range.is_unparsable();
    let qty_match = entry_quantity == received_quantity;
    let billed = billed_amount != 0.0;
    let open_balance = entry_amount - billed_amount != 0.0;
    let received = received_quantity != 0.0;
    let mob = entity == EntityKind::Mob;
    let spt = entity == EntityKind::Spt;

    let rules = [
        (in_range && due && qty_match && !billed, Status::Completed),
        (
            in_range && due && qty_match && billed && !open_balance,
            Status::PaidNotClosed,
        ),
        (
            in_range && due && qty_match && billed && open_balance,
            Status::Completed,
        ),
        (in_range && due && !qty_match, Status::CheckReceipt),
        (in_range && !due && mob, Status::Incomplete),
        (in_range && !due && spt && !received, Status::Incomplete),
        (in_range && !due && spt && received, Status::EarlyComplete),
        (!in_range && parsable && mob, Status::OutOfRange),
        (
            !in_range && parsable && spt && received && qty_match,
            Status::CompletedErm,
        ),
        (
            !in_range && parsable && spt && received && !qty_match,
            Status::PartialErm,
        ),
        (
            !in_range && parsable && spt && !received,
            Status::IncompleteErm,
        ),
    ];

    rules.into_iter().find_map(|(hit, status)| hit.then_some(status))
}
