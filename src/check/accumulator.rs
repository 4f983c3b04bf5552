use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    airdrop::types::{
        FailureReason, QueryOutcome, RemotePayload, AMOUNT_DECIMALS, MAX_DISPLAY_AMOUNT,
    },
    storage::models::{InputRecord, ResultRow, RowStatus},
};

/// Running counters, updated once per record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    pub total_addresses: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub total_amount: Decimal,
    /// Formatted amounts of successful lookups, in processing order
    pub amounts: Vec<Decimal>,
}

impl RunStatistics {
    pub fn new(total_addresses: usize) -> Self {
        Self {
            total_addresses,
            ..Self::default()
        }
    }

    /// Success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_addresses == 0 {
            0.0
        } else {
            (self.success_count as f64 / self.total_addresses as f64) * 100.0
        }
    }

    /// Count one successful amount. The total saturates at
    /// [`MAX_DISPLAY_AMOUNT`] in either direction.
    pub fn add_success(&mut self, amount: Decimal) {
        self.success_count += 1;
        self.total_amount = self
            .total_amount
            .checked_add(amount)
            .map(|total| total.clamp(-MAX_DISPLAY_AMOUNT, MAX_DISPLAY_AMOUNT))
            .unwrap_or(if amount.is_sign_negative() {
                -MAX_DISPLAY_AMOUNT
            } else {
                MAX_DISPLAY_AMOUNT
            });
        self.amounts.push(amount);
    }

    pub fn summarize(&self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> StatsSummary {
        let mut sorted = self.amounts.clone();
        sorted.sort();

        let min_amount = sorted.first().copied().unwrap_or(Decimal::ZERO);
        let max_amount = sorted.last().copied().unwrap_or(Decimal::ZERO);
        let avg_amount = if sorted.is_empty() {
            Decimal::ZERO
        } else {
            (self.total_amount / Decimal::from(sorted.len())).round_dp(AMOUNT_DECIMALS)
        };

        StatsSummary {
            total_addresses: self.total_addresses,
            success_count: self.success_count,
            fail_count: self.fail_count,
            success_rate: self.success_rate(),
            total_amount: self.total_amount,
            min_amount,
            max_amount,
            avg_amount,
            started_at,
            finished_at,
            elapsed_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
        }
    }
}

/// Final statistics, computed once every record has resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsSummary {
    pub total_addresses: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub success_rate: f64,
    pub total_amount: Decimal,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub avg_amount: Decimal,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Folds outcomes into result rows and statistics
#[derive(Debug)]
pub struct ResultAccumulator {
    rows: Vec<ResultRow>,
    stats: RunStatistics,
    passthrough_fields: Vec<String>,
    amount_scale: u64,
}

impl ResultAccumulator {
    pub fn new(total_addresses: usize, passthrough_fields: Vec<String>, amount_scale: u64) -> Self {
        Self {
            rows: Vec::with_capacity(total_addresses),
            stats: RunStatistics::new(total_addresses),
            passthrough_fields,
            amount_scale,
        }
    }

    /// Append the row for `record` and update the counters
    pub fn record(&mut self, record: &InputRecord, outcome: &QueryOutcome) -> &ResultRow {
        let row = match outcome {
            QueryOutcome::Success { payload } => self.success_row(record, payload),
            QueryOutcome::Failure { reason } => self.failure_row(record, reason),
        };

        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    fn success_row(&mut self, record: &InputRecord, payload: &RemotePayload) -> ResultRow {
        let amount = payload.display_amount(self.amount_scale);

        self.stats.add_success(amount);

        ResultRow {
            num: record.sequence_number.clone(),
            pk: record.secret_material.clone(),
            address: record.address.clone(),
            amount: format!("{:.6}", amount),
            amount_raw: payload.raw_amount(),
            passthrough: self
                .passthrough_fields
                .iter()
                .map(|field| (field.clone(), payload.field_text(field)))
                .collect(),
            status: RowStatus::Success,
            error: String::new(),
        }
    }

    fn failure_row(&mut self, record: &InputRecord, reason: &FailureReason) -> ResultRow {
        self.stats.fail_count += 1;

        ResultRow {
            num: record.sequence_number.clone(),
            pk: record.secret_material.clone(),
            address: record.address.clone(),
            amount: "0".to_string(),
            amount_raw: "0".to_string(),
            passthrough: self
                .passthrough_fields
                .iter()
                .map(|field| (field.clone(), String::new()))
                .collect(),
            status: RowStatus::Error,
            error: reason.to_string(),
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn finish(
        self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> (Vec<ResultRow>, StatsSummary) {
        let summary = self.stats.summarize(started_at, finished_at);
        (self.rows, summary)
    }
}
