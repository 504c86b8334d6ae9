//! # Accrual Engine
//!
//! A library for reconciling open purchase-request (PR) and purchase-order
//! (PO) line items against their expected delivery periods, deciding per line
//! item whether an accounting accrual should be booked this period, and
//! deriving the accrual's financial attributes.
//!
//! ## Core Concepts
//!
//! - **Delivery window**: a `YYYYMM` period range declared at the head of the
//!   free-text item description (e.g. `2024/05-2024/07 cleaning service`)
//! - **Expected-receive month (ERM)**: the period the goods or services are
//!   anticipated, supplied as `%b-%y` text (e.g. `May-24`)
//! - **Reporting cutoff**: the year-month through which the current close is
//!   evaluated
//! - **Status**: whether the window brackets the ERM and whether the ERM has
//!   passed the cutoff; statuses set upstream are never overwritten
//! - **Accrual flag**: `Y`/`N` decision derived from the status, with
//!   entity-specific overrides; undecided records stay blank for review
//!
//! ## Example
//!
//! ```rust,ignore
//! use accrual_engine::*;
//!
//! let config = EngineConfig::for_entity(EntityKind::Mob);
//! let engine = AccrualEngine::new(config)?;
//!
//! let refs = ReferenceTables::from_pairs(
//!     [("650003".to_string(), "Marketing Expense".to_string())],
//!     [("650003".to_string(), "217001".to_string())],
//! );
//!
//! let mut batch = RecordBatch::Pr(vec![PrRecord {
//!     core: RecordCore {
//!         order_id: "PR1001".to_string(),
//!         line_id: "PR1001-1".to_string(),
//!         item_description: Some("2024/05-2024/07 cleaning service".to_string()),
//!         expected_receive_month: Some("May-24".to_string()),
//!         cutoff: YearMonth(202406),
//!         gl_account: "650003".to_string(),
//!         ..RecordCore::default()
//!     },
//!     ebs_task: None,
//! }]);
//!
//! let summary = engine.process(&mut batch, &refs)?;
//! assert_eq!(summary.accrued, 1);
//! ```

pub mod accounts;
pub mod classifier;
pub mod decision;
pub mod erm;
pub mod error;
pub mod fields;
pub mod intake;
pub mod period;
pub mod schema;

pub use accounts::ReferenceTables;
pub use error::{AccrualError, Result};
pub use intake::{apply_intake, IntakeData};
pub use period::{parse_expected_month, CompiledPatterns, PeriodPatterns, PeriodRange, YearMonth};
pub use schema::*;

use log::{debug, info};
use serde::Serialize;

/// Row counts per outcome for one processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub accrued: usize,
    pub declined: usize,
    pub undecided: usize,
    pub format_errors: usize,
}

/// One configured engine instance. Construction compiles the period patterns;
/// an invalid pattern is rejected up front.
pub struct AccrualEngine {
    config: EngineConfig,
    patterns: CompiledPatterns,
}

impl AccrualEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let patterns = CompiledPatterns::compile(&config.patterns)?;
        Ok(Self { config, patterns })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the full pipeline over one batch: period extraction, receipt
    /// refinement (PO only), status classification, the accrual decision, and
    /// financial field derivation. Stages write only their designated fields
    /// and honor the blank-only guards, so processing an already-finished
    /// batch changes nothing.
    pub fn process(&self, batch: &mut RecordBatch, refs: &ReferenceTables) -> Result<BatchSummary> {
        info!(
            "processing {:?} batch of {} records for entity {:?}",
            batch.kind(),
            batch.len(),
            self.config.entity
        );

        self.extract_periods(batch);

        if let RecordBatch::Po(records) = batch {
            erm::refine_po_statuses(records, self.config.entity)?;
        }

        for core in batch.cores_mut() {
            classifier::classify_record(core)?;
        }

        self.decide(batch);
        self.derive(batch, refs);

        let summary = summarize(batch);
        info!(
            "batch complete: {} accrued, {} declined, {} undecided",
            summary.accrued, summary.declined, summary.undecided
        );
        if summary.format_errors > 0 {
            debug!(
                "{} records carry unparsable delivery windows",
                summary.format_errors
            );
        }
        Ok(summary)
    }

    fn extract_periods(&self, batch: &mut RecordBatch) {
        for core in batch.cores_mut() {
            if core.description_period.is_none() {
                core.description_period =
                    Some(self.patterns.extract(core.item_description.as_deref()));
            }
            if core.expected_period.is_none() {
                core.expected_period =
                    Some(parse_expected_month(core.expected_receive_month.as_deref()));
            }
        }
    }

    fn decide(&self, batch: &mut RecordBatch) {
        let kind = batch.kind();
        for core in batch.cores_mut() {
            if core.accrual.is_some() {
                continue;
            }
            let Some(status) = core.status.clone() else {
                continue;
            };
            core.accrual = decision::decide(kind, &status, core.procurement_remark.as_deref());
        }
    }

    fn derive(&self, batch: &mut RecordBatch, refs: &ReferenceTables) {
        let entity = self.config.entity;
        let fixed_assets = &self.config.fixed_asset_accounts;
        match batch {
            RecordBatch::Pr(records) => {
                for record in records {
                    let amount = record.core.entry_amount;
                    fields::derive_core(&mut record.core, amount, entity, refs, fixed_assets);
                }
            }
            RecordBatch::Po(records) => {
                for record in records {
                    let amount = record.core.entry_amount - record.entry_billed_amount;
                    fields::derive_core(&mut record.core, amount, entity, refs, fixed_assets);
                    if record.core.accrual == Some(AccrualFlag::Yes)
                        && record.prepaid_amount.is_none()
                    {
                        record.prepaid_amount = Some(record.entry_prepay_amount);
                    }
                }
            }
        }
    }
}

fn summarize(batch: &RecordBatch) -> BatchSummary {
    let mut summary = BatchSummary {
        total: batch.len(),
        ..BatchSummary::default()
    };
    for core in batch.cores() {
        match core.accrual {
            Some(AccrualFlag::Yes) => summary.accrued += 1,
            Some(AccrualFlag::No) => summary.declined += 1,
            None => summary.undecided += 1,
        }
        if matches!(core.status, Some(Status::FormatError)) {
            summary.format_errors += 1;
        }
    }
    summary
}

/// Convenience entry point: builds an engine from the configuration and
/// processes one batch.
pub fn process_batch(
    batch: &mut RecordBatch,
    config: &EngineConfig,
    refs: &ReferenceTables,
) -> Result<BatchSummary> {
    AccrualEngine::new(config.clone())?.process(batch, refs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs() -> ReferenceTables {
        ReferenceTables::from_pairs(
            [("650003".to_string(), "Marketing Expense".to_string())],
            [("650003".to_string(), "217001".to_string())],
        )
    }

    fn pr_record(line: &str, description: &str, erm: &str) -> PrRecord {
        PrRecord {
            core: RecordCore {
                order_id: line.split('-').next().unwrap_or(line).to_string(),
                line_id: line.to_string(),
                item_description: Some(description.to_string()),
                expected_receive_month: Some(erm.to_string()),
                cutoff: YearMonth(202406),
                gl_account: "650003".to_string(),
                department: "A01-Marketing".to_string(),
                currency: "TWD".to_string(),
                region: "TW".to_string(),
                product_code: "EC_SPE_COM".to_string(),
                project: Some("EC_SPE_COM campaign".to_string()),
                entry_amount: 1000.0,
                ..RecordCore::default()
            },
            ebs_task: None,
        }
    }

    #[test]
    fn test_end_to_end_pr_batch() {
        let engine = AccrualEngine::new(EngineConfig::for_entity(EntityKind::Mob)).unwrap();
        let mut batch = RecordBatch::Pr(vec![
            pr_record("PR1-1", "2024/05-2024/07 cleaning service", "May-24"),
            pr_record("PR2-1", "2024/05-2024/07 cleaning service", "Jul-24"),
            pr_record("PR3-1", "not a date", "May-24"),
        ]);

        let summary = engine.process(&mut batch, &refs()).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.accrued, 1);
        assert_eq!(summary.declined, 1);
        assert_eq!(summary.undecided, 1);
        assert_eq!(summary.format_errors, 1);

        let RecordBatch::Pr(records) = &batch else {
            unreachable!()
        };
        assert_eq!(records[0].core.status, Some(Status::Completed));
        assert_eq!(records[0].core.accrual, Some(AccrualFlag::Yes));
        assert_eq!(records[0].core.accrual_amount, Some(1000.0));
        assert_eq!(records[0].core.liability_account.as_deref(), Some("217001"));

        assert_eq!(records[1].core.status, Some(Status::Incomplete));
        assert_eq!(records[1].core.accrual, Some(AccrualFlag::No));
        assert_eq!(records[1].core.accrual_amount, None);

        assert_eq!(records[2].core.status, Some(Status::FormatError));
        assert_eq!(records[2].core.accrual, None);
    }

    #[test]
    fn test_end_to_end_po_batch_nets_billed_amount() {
        let engine = AccrualEngine::new(EngineConfig::for_entity(EntityKind::Mob)).unwrap();
        let mut batch = RecordBatch::Po(vec![PoRecord {
            core: RecordCore {
                order_id: "PO1".to_string(),
                line_id: "PO1-1".to_string(),
                item_description: Some("2024/05-2024/07 warehouse lease".to_string()),
                expected_receive_month: Some("May-24".to_string()),
                cutoff: YearMonth(202406),
                gl_account: "650003".to_string(),
                department: "A01-Logistics".to_string(),
                currency: "TWD".to_string(),
                region: "TW".to_string(),
                product_code: "LG_OWN".to_string(),
                project: Some("LG_OWN lease".to_string()),
                entry_amount: 1000.0,
                ..RecordCore::default()
            },
            entry_billed_amount: 300.0,
            entry_quantity: 10.0,
            received_quantity: 10.0,
            fully_invoiced: false,
            entry_prepay_amount: 50.0,
            prepaid_amount: None,
        }]);

        let summary = engine.process(&mut batch, &refs()).unwrap();
        assert_eq!(summary.accrued, 1);

        let RecordBatch::Po(records) = &batch else {
            unreachable!()
        };
        assert_eq!(records[0].core.status, Some(Status::Completed));
        assert_eq!(records[0].core.accrual_amount, Some(700.0));
        assert_eq!(records[0].prepaid_amount, Some(50.0));
    }

    #[test]
    fn test_processing_twice_is_identical() {
        let engine = AccrualEngine::new(EngineConfig::for_entity(EntityKind::Mob)).unwrap();
        let mut batch = RecordBatch::Pr(vec![
            pr_record("PR1-1", "2024/05 hosting", "May-24"),
            pr_record("PR2-1", "no window here", "May-24"),
        ]);

        engine.process(&mut batch, &refs()).unwrap();
        let snapshot = serde_json::to_string(&batch).unwrap();
        engine.process(&mut batch, &refs()).unwrap();
        assert_eq!(serde_json::to_string(&batch).unwrap(), snapshot);
    }

    #[test]
    fn test_invalid_pattern_rejected_at_construction() {
        let mut config = EngineConfig::for_entity(EntityKind::Mob);
        config.patterns.year_month = "(".to_string();
        assert!(AccrualEngine::new(config).is_err());
    }
}
