//! Grade-aggregation pipeline.
//!
//! `calculator` turns an attempt into a score, `ledger` keeps the latest score
//! per game, `aggregator` folds the best scores of a bimestre into the grade
//! record, and `service` runs the three in order for each submission.

pub mod aggregator;
pub mod calculator;
pub mod ledger;
pub mod service;

pub use aggregator::AggregationOutcome;
pub use service::{GradingService, SubmissionResult};
