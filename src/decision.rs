use crate::schema::{AccrualFlag, RecordKind, Status};

/// Procurement remark that promotes an otherwise-undecided record.
pub const PROCUREMENT_COMPLETED: &str = "Completed";

/// Procurement remark that blocks a PO accrual outright.
pub const PROCUREMENT_ERROR: &str = "error";

/// Maps a finalized status (plus the procurement remark) to an accrual flag.
/// Returns `None` where no rule decides, leaving the record for manual
/// review.
pub fn decide(kind: RecordKind, status: &Status, remark: Option<&str>) -> Option<AccrualFlag> {
    let mut flag = table_flag(kind, status);

    if flag.is_none() && remark == Some(PROCUREMENT_COMPLETED) && !override_blocked(kind, status) {
        flag = Some(AccrualFlag::Yes);
    }

    if kind == RecordKind::Po && remark == Some(PROCUREMENT_ERROR) {
        flag = Some(AccrualFlag::No);
    }

    flag
}

fn table_flag(kind: RecordKind, status: &Status) -> Option<AccrualFlag> {
    use Status::*;
    match (kind, status) {
        (_, Completed) => Some(AccrualFlag::Yes),
        (_, Incomplete) => Some(AccrualFlag::No),
        (RecordKind::Po, PendingClose | Booked | IncompleteErm) => Some(AccrualFlag::No),
        (RecordKind::Po, CompletedErm) => Some(AccrualFlag::Yes),
        (RecordKind::Pr, PendingClose | Payroll | NotEstimated) => Some(AccrualFlag::No),
        _ => None,
    }
}

/// Statuses a procurement sign-off must not promote. PO batches additionally
/// hold back the receipt-review statuses, which stay undecided for manual
/// follow-up.
fn override_blocked(kind: RecordKind, status: &Status) -> bool {
    use Status::*;
    if matches!(
        status,
        NotEstimated | Incomplete | Payroll | PendingClose | IncompleteErm | FormatError
            | OutOfRange
    ) {
        return true;
    }
    kind == RecordKind::Po
        && matches!(
            status,
            PaidNotClosed | CheckReceipt | EarlyComplete | PartialErm | CompletedErm
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_table() {
        for kind in [RecordKind::Pr, RecordKind::Po] {
            assert_eq!(
                decide(kind, &Status::Completed, None),
                Some(AccrualFlag::Yes)
            );
            assert_eq!(
                decide(kind, &Status::Incomplete, None),
                Some(AccrualFlag::No)
            );
        }
    }

    #[test]
    fn test_po_specific_table() {
        for status in [Status::PendingClose, Status::Booked, Status::IncompleteErm] {
            assert_eq!(
                decide(RecordKind::Po, &status, None),
                Some(AccrualFlag::No)
            );
        }
        assert_eq!(
            decide(RecordKind::Po, &Status::CompletedErm, None),
            Some(AccrualFlag::Yes)
        );
        // a payroll status only decides PR records
        assert_eq!(decide(RecordKind::Po, &Status::Payroll, None), None);
    }

    #[test]
    fn test_pr_specific_table() {
        for status in [Status::PendingClose, Status::Payroll, Status::NotEstimated] {
            assert_eq!(
                decide(RecordKind::Pr, &status, None),
                Some(AccrualFlag::No)
            );
        }
        // ERM statuses only decide PO records
        assert_eq!(decide(RecordKind::Pr, &Status::CompletedErm, None), None);
    }

    #[test]
    fn test_procurement_sign_off_promotes_undecided() {
        let status = Status::Custom("awaiting invoice".to_string());
        assert_eq!(decide(RecordKind::Pr, &status, None), None);
        assert_eq!(
            decide(RecordKind::Pr, &status, Some(PROCUREMENT_COMPLETED)),
            Some(AccrualFlag::Yes)
        );
    }

    #[test]
    fn test_sign_off_never_promotes_blocked_statuses() {
        for status in [
            Status::FormatError,
            Status::OutOfRange,
            Status::NotEstimated,
            Status::Incomplete,
            Status::Payroll,
            Status::PendingClose,
            Status::IncompleteErm,
        ] {
            let flag = decide(RecordKind::Pr, &status, Some(PROCUREMENT_COMPLETED));
            assert_ne!(flag, Some(AccrualFlag::Yes), "promoted {:?}", status);
        }
    }

    #[test]
    fn test_sign_off_holds_back_po_review_statuses() {
        for status in [
            Status::PaidNotClosed,
            Status::CheckReceipt,
            Status::EarlyComplete,
            Status::PartialErm,
        ] {
            assert_eq!(
                decide(RecordKind::Po, &status, Some(PROCUREMENT_COMPLETED)),
                None,
                "promoted {:?}",
                status
            );
        }
    }

    #[test]
    fn test_error_remark_blocks_po_accrual() {
        let status = Status::Custom("vendor dispute".to_string());
        assert_eq!(
            decide(RecordKind::Po, &status, Some(PROCUREMENT_ERROR)),
            Some(AccrualFlag::No)
        );
        // PR records have no such rule
        assert_eq!(decide(RecordKind::Pr, &status, Some(PROCUREMENT_ERROR)), None);
    }

    #[test]
    fn test_flag_never_set_for_no_accrual_statuses() {
        for status in [
            Status::NotEstimated,
            Status::Payroll,
            Status::PendingClose,
            Status::Incomplete,
            Status::IncompleteErm,
        ] {
            for kind in [RecordKind::Pr, RecordKind::Po] {
                let flag = decide(kind, &status, Some(PROCUREMENT_COMPLETED));
                assert_ne!(flag, Some(AccrualFlag::Yes), "{:?}/{:?}", kind, status);
            }
        }
    }
}
