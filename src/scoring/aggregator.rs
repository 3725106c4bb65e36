// src/scoring/aggregator.rs

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::{
    config::{AggregationPolicy, GRADE_SCALE},
    error::AppError,
    models::grade_record::GradeKey,
    repository::{
        GradeRecordStore, PeriodCalendar, Repositories, ScoreEntryStore, ScoreFactorStore,
        StudentDirectory,
    },
};

/// What an aggregation run did to the student's grade record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregationOutcome {
    /// The timestamp falls outside every bimestre.
    NoPeriod,
    /// Not enough ranked entries yet; nothing was written.
    InsufficientSamples { samples: usize, required: usize },
    Created { average: i32, year: i32, bimestre: i32 },
    Updated { average: i32, year: i32, bimestre: i32 },
}

/// Maps a raw point total onto the 0-20 grading scale.
///
/// Rounds half away from zero, so a scaled value of 10.5 becomes 11.
pub fn period_average(total: f64, max_score: i32) -> Result<i32, AppError> {
    if max_score <= 0 {
        return Err(AppError::InternalServerError(format!(
            "score factor max_score must be positive, got {}",
            max_score
        )));
    }

    // Scale before dividing so exact halves stay exact.
    let rounded = (total * GRADE_SCALE / f64::from(max_score)).round();

    if !rounded.is_finite() || rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return Err(AppError::InternalServerError(format!(
            "average of total {} over max_score {} is out of range",
            total, max_score
        )));
    }

    Ok(rounded as i32)
}

/// Derives the virtual-practice average of a bimestre from a student's best
/// scores and writes it into their grade record.
#[derive(Clone)]
pub struct PeriodAggregator {
    students: Arc<dyn StudentDirectory>,
    factors: Arc<dyn ScoreFactorStore>,
    calendar: Arc<dyn PeriodCalendar>,
    scores: Arc<dyn ScoreEntryStore>,
    grades: Arc<dyn GradeRecordStore>,
    policy: AggregationPolicy,
}

impl PeriodAggregator {
    pub fn new(repos: &Repositories, policy: AggregationPolicy) -> Self {
        Self {
            students: repos.students.clone(),
            factors: repos.factors.clone(),
            calendar: repos.calendar.clone(),
            scores: repos.scores.clone(),
            grades: repos.grades.clone(),
            policy,
        }
    }

    /// Recomputes the virtual-practice average of `student_id` at `level` for
    /// the bimestre containing `as_of`.
    ///
    /// Every lookup happens before the grade record is touched, so a failure
    /// leaves it unchanged.
    pub async fn aggregate(
        &self,
        student_id: i64,
        level: i32,
        as_of: DateTime<Utc>,
    ) -> Result<AggregationOutcome, AppError> {
        let profile = self
            .students
            .by_student_id(student_id)
            .await?
            .ok_or(AppError::UnknownStudent(student_id))?;

        let Some(period) = self.calendar.find(as_of.year(), as_of).await? else {
            tracing::debug!("No grading period contains {}, skipping aggregation", as_of);
            return Ok(AggregationOutcome::NoPeriod);
        };

        // Already ranked by the store; order is kept as received.
        let top = self
            .scores
            .top_n_by_score(student_id, level, self.policy.top_n)
            .await?;

        if top.len() < self.policy.min_samples {
            return Ok(AggregationOutcome::InsufficientSamples {
                samples: top.len(),
                required: self.policy.min_samples,
            });
        }

        let total: f64 = top.iter().map(|e| e.score).sum();

        let factor = self
            .factors
            .get(level)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Score factor for level {} not found", level)))?;

        let average = period_average(total, factor.max_score)?;

        let key = GradeKey::new(&profile, &period);
        let existed = self.grades.get(&key).await?.is_some();
        self.grades.upsert_virtual_average(&key, average).await?;

        tracing::info!(
            "Virtual practice average {} for student {} (bimestre {} of {}, {} samples)",
            average,
            student_id,
            period.bimestre,
            period.year,
            top.len()
        );

        Ok(if existed {
            AggregationOutcome::Updated {
                average,
                year: period.year,
                bimestre: period.bimestre,
            }
        } else {
            AggregationOutcome::Created {
                average,
                year: period.year,
                bimestre: period.bimestre,
            }
        })
    }
}
