//! Storage seams of the grading pipeline.
//!
//! The pipeline never talks to a connection directly. Each collaborator is a
//! trait object so the Postgres implementation can be swapped for the
//! in-memory one in tests.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        grade_record::{GradeKey, GradeRecord},
        grading_period::GradingPeriod,
        score_entry::{NewScoreEntry, ScoreEntry},
        score_factor::ScoreFactor,
        student::StudentProfile,
    },
};

/// Maps identities to enrolled students.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// Resolves an authenticated person to their enrollment profile.
    async fn resolve(&self, person_id: i64) -> Result<Option<StudentProfile>, AppError>;

    async fn by_student_id(&self, student_id: i64) -> Result<Option<StudentProfile>, AppError>;
}

#[async_trait]
pub trait ScoreFactorStore: Send + Sync {
    async fn get(&self, level: i32) -> Result<Option<ScoreFactor>, AppError>;

    /// Whole table, ordered by level.
    async fn list(&self) -> Result<Vec<ScoreFactor>, AppError>;
}

#[async_trait]
pub trait PeriodCalendar: Send + Sync {
    /// First period of `year` (by start date) whose window contains `as_of`.
    async fn find(&self, year: i32, as_of: DateTime<Utc>)
    -> Result<Option<GradingPeriod>, AppError>;

    async fn list(&self, year: i32) -> Result<Vec<GradingPeriod>, AppError>;
}

#[async_trait]
pub trait ScoreEntryStore: Send + Sync {
    /// Removes the entry for (student, game), if any. Returns the removed count.
    async fn delete_where(&self, student_id: i64, game_id: i64) -> Result<u64, AppError>;

    async fn insert(&self, entry: NewScoreEntry) -> Result<ScoreEntry, AppError>;

    /// Deletes any entry for the same (student, game) and inserts `entry`.
    /// Implementations must make the pair atomic with respect to other
    /// writers of the same key.
    async fn replace(&self, entry: NewScoreEntry) -> Result<ScoreEntry, AppError>;

    /// At most `limit` entries of the student at `level`, highest score first.
    async fn top_n_by_score(
        &self,
        student_id: i64,
        level: i32,
        limit: usize,
    ) -> Result<Vec<ScoreEntry>, AppError>;

    async fn list_for_student(&self, student_id: i64) -> Result<Vec<ScoreEntry>, AppError>;
}

#[async_trait]
pub trait GradeRecordStore: Send + Sync {
    async fn get(&self, key: &GradeKey) -> Result<Option<GradeRecord>, AppError>;

    /// Sets the virtual-practice average for `key`, creating the record with
    /// every other component unset when it does not exist yet.
    async fn upsert_virtual_average(
        &self,
        key: &GradeKey,
        average: i32,
    ) -> Result<GradeRecord, AppError>;
}

/// Bundle of every collaborator the grading service needs.
#[derive(Clone)]
pub struct Repositories {
    pub students: Arc<dyn StudentDirectory>,
    pub factors: Arc<dyn ScoreFactorStore>,
    pub calendar: Arc<dyn PeriodCalendar>,
    pub scores: Arc<dyn ScoreEntryStore>,
    pub grades: Arc<dyn GradeRecordStore>,
}

impl Repositories {
    /// All collaborators backed by the same Postgres pool.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            students: store.clone(),
            factors: store.clone(),
            calendar: store.clone(),
            scores: store.clone(),
            grades: store,
        }
    }
}
