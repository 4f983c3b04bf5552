pub mod accumulator;
pub mod observer;
pub mod pacing;
pub mod pipeline;

pub use accumulator::{ResultAccumulator, RunStatistics, StatsSummary};
pub use observer::{ConsoleObserver, ProgressObserver, SummaryFormat};
pub use pacing::PacingController;
pub use pipeline::{BatchChecker, BatchReport, RecordStage};
