use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, error, info};

use crate::{
    airdrop::{AddressNormalizer, AirdropQueryService, FailureReason, QueryOutcome},
    check::{
        accumulator::{ResultAccumulator, StatsSummary},
        observer::ProgressObserver,
        pacing::PacingController,
    },
    error::{CheckerError, Result},
    storage::{
        self,
        models::{InputRecord, ResultRow},
    },
    transport::{EgressBinder, EgressDescriptor},
    utils,
};

/// Where a record is in its lifecycle. `Recorded` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStage {
    Pending,
    Bound,
    Normalized,
    Paced,
    Dispatched,
    Recorded,
}

impl std::fmt::Display for RecordStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordStage::Pending => "pending",
            RecordStage::Bound => "bound",
            RecordStage::Normalized => "normalized",
            RecordStage::Paced => "paced",
            RecordStage::Dispatched => "dispatched",
            RecordStage::Recorded => "recorded",
        };
        f.write_str(name)
    }
}

/// Rows in input order plus the final statistics
#[derive(Debug)]
pub struct BatchReport {
    pub rows: Vec<ResultRow>,
    pub summary: StatsSummary,
    /// Where the rows were written, if they were
    pub saved_to: Option<PathBuf>,
}

/// Checks a batch of records one at a time, in input order
pub struct BatchChecker<B: EgressBinder> {
    binder: B,
    normalizer: AddressNormalizer,
    pacing: PacingController,
    service: AirdropQueryService,
    observer: Box<dyn ProgressObserver>,
    passthrough_fields: Vec<String>,
    amount_scale: u64,
}

impl<B: EgressBinder> BatchChecker<B> {
    pub fn new(
        binder: B,
        normalizer: AddressNormalizer,
        pacing: PacingController,
        service: AirdropQueryService,
        observer: Box<dyn ProgressObserver>,
    ) -> Self {
        Self {
            binder,
            normalizer,
            pacing,
            service,
            observer,
            passthrough_fields: Vec::new(),
            amount_scale: 1_000_000,
        }
    }

    pub fn with_passthrough_fields(mut self, fields: Vec<String>) -> Self {
        self.passthrough_fields = fields;
        self
    }

    pub fn with_amount_scale(mut self, scale: u64) -> Self {
        self.amount_scale = scale;
        self
    }

    /// Check every record and produce exactly one row per record.
    ///
    /// Per-record failures become error rows; only an empty batch is an error.
    pub async fn run(&self, records: &[InputRecord]) -> Result<BatchReport> {
        if records.is_empty() {
            return Err(CheckerError::NoRecords("input batch".to_string()));
        }

        let total = records.len();
        info!("Checking {} addresses", total);

        let started_at = Utc::now();
        let mut accumulator =
            ResultAccumulator::new(total, self.passthrough_fields.clone(), self.amount_scale);

        for (index, record) in records.iter().enumerate() {
            self.observer.on_progress(index, total, &record.address);
            debug!(
                "[{}/{}] Checking {}",
                index + 1,
                total,
                utils::format_address(&record.address)
            );

            let outcome = self.process_record(index, record).await;
            let row = accumulator.record(record, &outcome);
            debug!(record = %record.sequence_number, stage = %RecordStage::Recorded, "Record finished");

            self.observer.on_outcome(index, row);
        }

        let (rows, summary) = accumulator.finish(started_at, Utc::now());

        info!(
            "Batch complete: {} successful, {} failed, {:.2} total",
            summary.success_count, summary.fail_count, summary.total_amount
        );
        self.observer.on_summary(&summary);

        Ok(BatchReport {
            rows,
            summary,
            saved_to: None,
        })
    }

    /// [`run`](Self::run), then write the rows to `output`.
    ///
    /// A failed write is logged and leaves `saved_to` empty; the run itself
    /// still succeeds.
    pub async fn run_and_report(
        &self,
        records: &[InputRecord],
        output: impl AsRef<Path>,
    ) -> Result<BatchReport> {
        let mut report = self.run(records).await?;
        let output = output.as_ref();

        match storage::write_results(output, &self.passthrough_fields, &report.rows) {
            Ok(()) => {
                info!("Results saved to {}", output.display());
                report.saved_to = Some(output.to_path_buf());
            }
            Err(e) => {
                error!("Failed to write results to {}: {}", output.display(), e);
            }
        }

        Ok(report)
    }

    /// Run one record through its stages, converting any defect into a failure
    async fn process_record(&self, index: usize, record: &InputRecord) -> QueryOutcome {
        let mut stage = RecordStage::Pending;

        let attempt = AssertUnwindSafe(self.dispatch_record(index, record, &mut stage))
            .catch_unwind()
            .await;

        match attempt {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    record = %record.sequence_number,
                    stage = %stage,
                    "Processing error: {}",
                    message
                );
                QueryOutcome::Failure {
                    reason: FailureReason::unknown(format!(
                        "processing failed after {} stage: {}",
                        stage, message
                    )),
                }
            }
        }
    }

    async fn dispatch_record(
        &self,
        index: usize,
        record: &InputRecord,
        stage: &mut RecordStage,
    ) -> QueryOutcome {
        let descriptor = EgressDescriptor::new(record.egress_descriptor.as_str());
        let transport = self.binder.bind(&descriptor);
        *stage = RecordStage::Bound;
        debug!(record = %record.sequence_number, egress = %descriptor, "Transport bound");

        let address = self.normalizer.normalize(&record.address);
        *stage = RecordStage::Normalized;

        if let Some(delay) = self.pacing.delay_for(index) {
            self.observer.on_pacing(delay);
            debug!("Pacing for {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
        *stage = RecordStage::Paced;

        let outcome = self.service.query(&address, &transport).await;
        *stage = RecordStage::Dispatched;

        outcome
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
