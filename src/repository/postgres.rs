// src/repository/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{GradeRecordStore, PeriodCalendar, ScoreEntryStore, ScoreFactorStore, StudentDirectory};
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

const GRADE_RECORD_COLUMNS: &str = r#"
    id, student_id, school_level_id, grade, bimestre, year,
    process_average, virtual_practice_average, proctored_test, sprint_average,
    term_exam, platform_score, in_class_score, attitude_average, final_grade,
    remarks
"#;

/// Every repository trait backed by one Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentDirectory for PgStore {
    async fn resolve(&self, person_id: i64) -> Result<Option<StudentProfile>, AppError> {
        let profile = sqlx::query_as::<_, StudentProfile>(
            r#"
            SELECT id AS student_id, person_id, school_level_id, grade
            FROM students
            WHERE person_id = $1 AND active
            "#,
        )
        .bind(person_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve person {}: {:?}", person_id, e);
            AppError::from(e)
        })?;

        Ok(profile)
    }

    async fn by_student_id(&self, student_id: i64) -> Result<Option<StudentProfile>, AppError> {
        let profile = sqlx::query_as::<_, StudentProfile>(
            r#"
            SELECT id AS student_id, person_id, school_level_id, grade
            FROM students
            WHERE id = $1 AND active
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}

#[async_trait]
impl ScoreFactorStore for PgStore {
    async fn get(&self, level: i32) -> Result<Option<ScoreFactor>, AppError> {
        let factor = sqlx::query_as::<_, ScoreFactor>(
            "SELECT level, base, duration_base, max_score, factor FROM score_factors WHERE level = $1",
        )
        .bind(level)
        .fetch_optional(&self.pool)
        .await?;

        Ok(factor)
    }

    async fn list(&self) -> Result<Vec<ScoreFactor>, AppError> {
        let factors = sqlx::query_as::<_, ScoreFactor>(
            "SELECT level, base, duration_base, max_score, factor FROM score_factors ORDER BY level",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(factors)
    }
}

#[async_trait]
impl PeriodCalendar for PgStore {
    async fn find(
        &self,
        year: i32,
        as_of: DateTime<Utc>,
    ) -> Result<Option<GradingPeriod>, AppError> {
        let period = sqlx::query_as::<_, GradingPeriod>(
            r#"
            SELECT id, year, bimestre, start_date, end_date
            FROM grading_periods
            WHERE year = $1 AND $2 BETWEEN start_date AND end_date
            ORDER BY start_date, id
            LIMIT 1
            "#,
        )
        .bind(year)
        .bind(as_of.date_naive())
        .fetch_optional(&self.pool)
        .await?;

        Ok(period)
    }

    async fn list(&self, year: i32) -> Result<Vec<GradingPeriod>, AppError> {
        let periods = sqlx::query_as::<_, GradingPeriod>(
            r#"
            SELECT id, year, bimestre, start_date, end_date
            FROM grading_periods
            WHERE year = $1
            ORDER BY start_date, id
            "#,
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(periods)
    }
}

#[async_trait]
impl ScoreEntryStore for PgStore {
    async fn delete_where(&self, student_id: i64, game_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM score_entries WHERE student_id = $1 AND game_id = $2")
            .bind(student_id)
            .bind(game_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert(&self, entry: NewScoreEntry) -> Result<ScoreEntry, AppError> {
        let stored = sqlx::query_as::<_, ScoreEntry>(
            r#"
            INSERT INTO score_entries (student_id, game_id, level, score, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, student_id, game_id, level, score, recorded_at
            "#,
        )
        .bind(entry.student_id)
        .bind(entry.game_id)
        .bind(entry.level)
        .bind(entry.score)
        .bind(entry.recorded_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn replace(&self, entry: NewScoreEntry) -> Result<ScoreEntry, AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to open score replace transaction: {:?}", e);
            AppError::from(e)
        })?;

        // Row lock on the student serializes writers of any of their games.
        sqlx::query("SELECT id FROM students WHERE id = $1 FOR UPDATE")
            .bind(entry.student_id)
            .fetch_optional(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM score_entries WHERE student_id = $1 AND game_id = $2")
            .bind(entry.student_id)
            .bind(entry.game_id)
            .execute(&mut *tx)
            .await?;

        let stored = sqlx::query_as::<_, ScoreEntry>(
            r#"
            INSERT INTO score_entries (student_id, game_id, level, score, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, student_id, game_id, level, score, recorded_at
            "#,
        )
        .bind(entry.student_id)
        .bind(entry.game_id)
        .bind(entry.level)
        .bind(entry.score)
        .bind(entry.recorded_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert score entry: {:?}", e);
            AppError::from(e)
        })?;

        tx.commit().await?;

        Ok(stored)
    }

    async fn top_n_by_score(
        &self,
        student_id: i64,
        level: i32,
        limit: usize,
    ) -> Result<Vec<ScoreEntry>, AppError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let entries = sqlx::query_as::<_, ScoreEntry>(
            r#"
            SELECT id, student_id, game_id, level, score, recorded_at
            FROM score_entries
            WHERE student_id = $1 AND level = $2
            ORDER BY score DESC, id ASC
            LIMIT $3
            "#,
        )
        .bind(student_id)
        .bind(level)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn list_for_student(&self, student_id: i64) -> Result<Vec<ScoreEntry>, AppError> {
        let entries = sqlx::query_as::<_, ScoreEntry>(
            r#"
            SELECT id, student_id, game_id, level, score, recorded_at
            FROM score_entries
            WHERE student_id = $1
            ORDER BY score DESC, id ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait]
impl GradeRecordStore for PgStore {
    async fn get(&self, key: &GradeKey) -> Result<Option<GradeRecord>, AppError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM grade_records
            WHERE student_id = $1 AND school_level_id = $2 AND grade = $3
              AND bimestre = $4 AND year = $5
            "#,
            GRADE_RECORD_COLUMNS
        );

        let record = sqlx::query_as::<_, GradeRecord>(&sql)
            .bind(key.student_id)
            .bind(key.school_level_id)
            .bind(key.grade)
            .bind(key.bimestre)
            .bind(key.year)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn upsert_virtual_average(
        &self,
        key: &GradeKey,
        average: i32,
    ) -> Result<GradeRecord, AppError> {
        // Only the virtual-practice column is touched on conflict.
        let sql = format!(
            r#"
            INSERT INTO grade_records
                (student_id, school_level_id, grade, bimestre, year, virtual_practice_average)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (student_id, school_level_id, grade, bimestre, year) DO UPDATE SET
                virtual_practice_average = EXCLUDED.virtual_practice_average
            RETURNING {}
            "#,
            GRADE_RECORD_COLUMNS
        );

        let record = sqlx::query_as::<_, GradeRecord>(&sql)
            .bind(key.student_id)
            .bind(key.school_level_id)
            .bind(key.grade)
            .bind(key.bimestre)
            .bind(key.year)
            .bind(average)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert grade record {:?}: {:?}", key, e);
                AppError::from(e)
            })?;

        Ok(record)
    }
}
