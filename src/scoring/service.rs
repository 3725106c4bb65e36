// src/scoring/service.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    aggregator::{AggregationOutcome, PeriodAggregator},
    calculator::{compute_score, validate_attempt},
    ledger::ScoreLedger,
};
use crate::{
    config::AggregationPolicy,
    error::AppError,
    models::{
        attempt::SubmitAttemptRequest,
        grade_record::{GradeKey, GradeRecord},
        grading_period::GradingPeriod,
        score_entry::ScoreEntry,
        score_factor::ScoreFactor,
        student::StudentProfile,
    },
    repository::Repositories,
};

/// Result of one game submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub score: f64,
    pub entry: ScoreEntry,
    pub aggregation: AggregationOutcome,
}

/// Entry point of the grading pipeline: attempt in, grade record out.
#[derive(Clone)]
pub struct GradingService {
    repos: Repositories,
    ledger: ScoreLedger,
    aggregator: PeriodAggregator,
}

impl GradingService {
    pub fn new(repos: Repositories, policy: AggregationPolicy) -> Self {
        let ledger = ScoreLedger::new(&repos);
        let aggregator = PeriodAggregator::new(&repos, policy);
        Self {
            repos,
            ledger,
            aggregator,
        }
    }

    async fn enrolled(&self, person_id: i64) -> Result<StudentProfile, AppError> {
        self.repos
            .students
            .resolve(person_id)
            .await?
            .ok_or(AppError::UnenrolledPerson(person_id))
    }

    /// Scores an attempt, replaces the student's previous result for the game
    /// and refreshes the bimestre average.
    ///
    /// * Timings are checked before anything is looked up.
    /// * An unknown identity or a missing score factor aborts before the ledger write.
    /// * An aggregation failure after the ledger write is returned as is; the
    ///   new entry stays and the next submission or recompute reconciles it.
    pub async fn submit_attempt(
        &self,
        person_id: i64,
        game_id: i64,
        request: SubmitAttemptRequest,
        now: DateTime<Utc>,
    ) -> Result<SubmissionResult, AppError> {
        let mut attempt = request.into_attempt(0, game_id);
        validate_attempt(&attempt)?;

        attempt.student_id = self.enrolled(person_id).await?.student_id;

        let factor = self
            .repos
            .factors
            .get(attempt.level)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Score factor for level {} not found", attempt.level))
            })?;

        let score = compute_score(&attempt, &factor)?;

        let entry = self
            .ledger
            .record_attempt(
                attempt.student_id,
                attempt.game_id,
                attempt.level,
                score,
                now,
            )
            .await?;

        let aggregation = self
            .aggregator
            .aggregate(attempt.student_id, attempt.level, entry.recorded_at)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "Score entry {} stored but aggregation failed for student {}: {}",
                    entry.id,
                    attempt.student_id,
                    e
                );
                e
            })?;

        Ok(SubmissionResult {
            score,
            entry,
            aggregation,
        })
    }

    /// Re-runs aggregation without a new attempt, reconciling a grade record
    /// left stale by an earlier failure.
    pub async fn recompute(
        &self,
        student_id: i64,
        level: i32,
        as_of: DateTime<Utc>,
    ) -> Result<AggregationOutcome, AppError> {
        tracing::info!("Recomputing level {} average for student {}", level, student_id);
        self.aggregator.aggregate(student_id, level, as_of).await
    }

    pub async fn scores_for(&self, person_id: i64) -> Result<Vec<ScoreEntry>, AppError> {
        let profile = self.enrolled(person_id).await?;
        self.ledger.entries_for(profile.student_id).await
    }

    pub async fn grade_record_for(
        &self,
        person_id: i64,
        year: i32,
        bimestre: i32,
    ) -> Result<GradeRecord, AppError> {
        let profile = self.enrolled(person_id).await?;
        let key = GradeKey::for_term(&profile, year, bimestre);

        self.repos.grades.get(&key).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "No grade record for bimestre {} of {}",
                bimestre, year
            ))
        })
    }

    pub async fn score_factors(&self) -> Result<Vec<ScoreFactor>, AppError> {
        self.repos.factors.list().await
    }

    pub async fn periods(&self, year: i32) -> Result<Vec<GradingPeriod>, AppError> {
        self.repos.calendar.list(year).await
    }
}
