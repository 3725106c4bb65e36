// src/models/grading_period.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'grading_periods' table: the bimestre calendar.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct GradingPeriod {
    pub id: i64,
    pub year: i32,
    pub bimestre: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl GradingPeriod {
    /// Both bounds are inclusive and compared against the UTC calendar date.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start_date <= day && day <= self.end_date
    }
}

/// Query parameters for listing the calendar.
#[derive(Debug, Deserialize)]
pub struct PeriodListParams {
    pub year: i32,
}
