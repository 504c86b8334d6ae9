use crate::schema::{EngineConfig, PoRecord, PrRecord, RecordBatch, Status};
use log::debug;
use std::collections::BTreeMap;

/// Auxiliary working-paper data merged into a batch before the core stages
/// run: closing lists, procurement remarks, and the previous period's booked
/// product codes.
#[derive(Debug, Clone, Default)]
pub struct IntakeData {
    /// Order ids slated for closing.
    pub closing_list: Vec<String>,
    /// Line id → remark, from the procurement working paper.
    pub procurement_remarks: BTreeMap<String, String>,
    /// Line id → booked product code, from the previous period's result.
    pub previous_booked: BTreeMap<String, String>,
}

/// Runs every intake operation that applies to the batch's shape. All
/// operations are blank-only, so intake is idempotent and never disturbs
/// statuses or remarks set upstream.
pub fn apply_intake(batch: &mut RecordBatch, data: &IntakeData, config: &EngineConfig) {
    apply_closing_list(batch, &data.closing_list);
    apply_procurement_remarks(batch, &data.procurement_remarks);
    apply_previous_booked(batch, &data.previous_booked);

    match batch {
        RecordBatch::Pr(records) => {
            mark_payroll(records);
            mark_no_estimate(records, &config.no_estimate_keywords);
        }
        RecordBatch::Po(records) => mark_booked(records),
    }
}

/// Orders on the closing list go to `PendingClose`; the decision table then
/// declines them.
pub fn apply_closing_list(batch: &mut RecordBatch, closing_list: &[String]) {
    if closing_list.is_empty() {
        return;
    }
    let mut matched = 0usize;
    for core in batch.cores_mut() {
        if core.status.is_none() && closing_list.iter().any(|id| *id == core.order_id) {
            core.status = Some(Status::PendingClose);
            matched += 1;
        }
    }
    debug!("closing list matched {} records", matched);
}

pub fn apply_procurement_remarks(batch: &mut RecordBatch, remarks: &BTreeMap<String, String>) {
    if remarks.is_empty() {
        return;
    }
    let mut matched = 0usize;
    for core in batch.cores_mut() {
        if core.procurement_remark.is_none() {
            if let Some(remark) = remarks.get(&core.line_id) {
                core.procurement_remark = Some(remark.clone());
                matched += 1;
            }
        }
    }
    debug!("procurement remarks matched {} records", matched);
}

/// Carries last period's booked product codes forward, feeding the deriver's
/// book-once guard.
pub fn apply_previous_booked(batch: &mut RecordBatch, previous: &BTreeMap<String, String>) {
    if previous.is_empty() {
        return;
    }
    for core in batch.cores_mut() {
        if core.booked_product_code.is_none() {
            if let Some(code) = previous.get(&core.line_id) {
                core.booked_product_code = Some(code.clone());
            }
        }
    }
}

/// Fully-invoiced PO lines are already in the ledger.
pub fn mark_booked(records: &mut [PoRecord]) {
    for record in records {
        if record.core.status.is_none() && record.fully_invoiced {
            record.core.status = Some(Status::Booked);
        }
    }
}

/// Payroll-tagged PR lines are handled by a separate process.
pub fn mark_payroll(records: &mut [PrRecord]) {
    for record in records {
        let payroll = record
            .ebs_task
            .as_deref()
            .map_or(false, |task| task.to_lowercase().contains("payroll"));
        if record.core.status.is_none() && payroll {
            record.core.status = Some(Status::Payroll);
        }
    }
}

/// PR lines whose description carries a configured keyword are excluded from
/// estimation.
pub fn mark_no_estimate(records: &mut [PrRecord], keywords: &[String]) {
    if keywords.is_empty() {
        return;
    }
    for record in records {
        if record.core.status.is_some() {
            continue;
        }
        let hit = record.core.item_description.as_deref().map_or(false, |desc| {
            keywords.iter().any(|keyword| desc.contains(keyword.as_str()))
        });
        if hit {
            record.core.status = Some(Status::NotEstimated);
        }
    }
}
