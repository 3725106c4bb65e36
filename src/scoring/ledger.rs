// src/scoring/ledger.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::score_entry::{NewScoreEntry, ScoreEntry},
    repository::{Repositories, ScoreEntryStore, StudentDirectory},
};

/// Latest-attempt-wins score history, one entry per (student, game).
#[derive(Clone)]
pub struct ScoreLedger {
    students: Arc<dyn StudentDirectory>,
    scores: Arc<dyn ScoreEntryStore>,
}

impl ScoreLedger {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            students: repos.students.clone(),
            scores: repos.scores.clone(),
        }
    }

    /// Stores `score` as the student's result for `game_id`, discarding any
    /// previous result for the same game.
    ///
    /// The write is committed when this returns, so a following aggregation
    /// observes it.
    pub async fn record_attempt(
        &self,
        student_id: i64,
        game_id: i64,
        level: i32,
        score: f64,
        recorded_at: DateTime<Utc>,
    ) -> Result<ScoreEntry, AppError> {
        if self.students.by_student_id(student_id).await?.is_none() {
            return Err(AppError::UnknownStudent(student_id));
        }

        let entry = self
            .scores
            .replace(NewScoreEntry {
                student_id,
                game_id,
                level,
                score,
                recorded_at,
            })
            .await?;

        tracing::info!(
            "Recorded score {:.2} for student {} on game {} (entry {})",
            entry.score,
            student_id,
            game_id,
            entry.id
        );

        Ok(entry)
    }

    /// Current entries of a student, highest score first.
    pub async fn entries_for(&self, student_id: i64) -> Result<Vec<ScoreEntry>, AppError> {
        self.scores.list_for_student(student_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student::StudentProfile;
    use crate::repository::memory::MemoryRepositories;
    use chrono::TimeZone;

    fn repos() -> MemoryRepositories {
        MemoryRepositories::new(
            vec![StudentProfile {
                student_id: 10,
                person_id: 100,
                school_level_id: 2,
                grade: 3,
            }],
            vec![],
            vec![],
        )
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 14, 10, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn test_reattempt_replaces_entry() {
        let memory = repos();
        let ledger = ScoreLedger::new(&memory.repositories());

        let first = ledger.record_attempt(10, 5, 3, 94.5, at(0)).await.unwrap();
        let second = ledger.record_attempt(10, 5, 3, 71.0, at(5)).await.unwrap();

        let all = memory.scores.all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[0].score, 71.0);
        assert_eq!(all[0].recorded_at, at(5));
        assert!(all.iter().all(|e| e.id != first.id));
    }

    #[tokio::test]
    async fn test_different_games_are_kept_apart() {
        let memory = repos();
        let ledger = ScoreLedger::new(&memory.repositories());

        ledger.record_attempt(10, 5, 3, 50.0, at(0)).await.unwrap();
        ledger.record_attempt(10, 6, 3, 80.0, at(1)).await.unwrap();

        let entries = ledger.entries_for(10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].game_id, 6);
        assert_eq!(entries[1].game_id, 5);
    }

    #[tokio::test]
    async fn test_unknown_student_is_refused() {
        let memory = repos();
        let ledger = ScoreLedger::new(&memory.repositories());

        let err = ledger.record_attempt(99, 5, 3, 50.0, at(0)).await.unwrap_err();

        assert!(matches!(err, AppError::UnknownStudent(99)));
        assert!(memory.scores.all().await.is_empty());
    }
}
