//! In-memory repositories.
//!
//! Thread-safe fakes behind `tokio::sync::RwLock`, used by the test suites and
//! for running the service without a database.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{
    GradeRecordStore, PeriodCalendar, Repositories, ScoreEntryStore, ScoreFactorStore,
    StudentDirectory,
};
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

#[derive(Debug, Default)]
pub struct MemoryStudentDirectory {
    students: RwLock<Vec<StudentProfile>>,
}

impl MemoryStudentDirectory {
    pub fn new(students: Vec<StudentProfile>) -> Self {
        Self {
            students: RwLock::new(students),
        }
    }
}

#[async_trait]
impl StudentDirectory for MemoryStudentDirectory {
    async fn resolve(&self, person_id: i64) -> Result<Option<StudentProfile>, AppError> {
        let students = self.students.read().await;
        Ok(students.iter().find(|s| s.person_id == person_id).cloned())
    }

    async fn by_student_id(&self, student_id: i64) -> Result<Option<StudentProfile>, AppError> {
        let students = self.students.read().await;
        Ok(students.iter().find(|s| s.student_id == student_id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct MemoryScoreFactorStore {
    factors: RwLock<HashMap<i32, ScoreFactor>>,
}

impl MemoryScoreFactorStore {
    pub fn new(factors: Vec<ScoreFactor>) -> Self {
        Self {
            factors: RwLock::new(factors.into_iter().map(|f| (f.level, f)).collect()),
        }
    }
}

#[async_trait]
impl ScoreFactorStore for MemoryScoreFactorStore {
    async fn get(&self, level: i32) -> Result<Option<ScoreFactor>, AppError> {
        Ok(self.factors.read().await.get(&level).cloned())
    }

    async fn list(&self) -> Result<Vec<ScoreFactor>, AppError> {
        let mut factors: Vec<ScoreFactor> = self.factors.read().await.values().cloned().collect();
        factors.sort_by_key(|f| f.level);
        Ok(factors)
    }
}

#[derive(Debug, Default)]
pub struct MemoryPeriodCalendar {
    periods: RwLock<Vec<GradingPeriod>>,
}

impl MemoryPeriodCalendar {
    pub fn new(mut periods: Vec<GradingPeriod>) -> Self {
        periods.sort_by_key(|p| (p.start_date, p.id));
        Self {
            periods: RwLock::new(periods),
        }
    }
}

#[async_trait]
impl PeriodCalendar for MemoryPeriodCalendar {
    async fn find(
        &self,
        year: i32,
        as_of: DateTime<Utc>,
    ) -> Result<Option<GradingPeriod>, AppError> {
        let periods = self.periods.read().await;
        Ok(periods
            .iter()
            .find(|p| p.year == year && p.contains(as_of))
            .cloned())
    }

    async fn list(&self, year: i32) -> Result<Vec<GradingPeriod>, AppError> {
        let periods = self.periods.read().await;
        Ok(periods.iter().filter(|p| p.year == year).cloned().collect())
    }
}

#[derive(Debug)]
pub struct MemoryScoreEntryStore {
    entries: RwLock<Vec<ScoreEntry>>,
    next_id: AtomicI64,
}

impl Default for MemoryScoreEntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScoreEntryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Every stored entry, in insertion order.
    pub async fn all(&self) -> Vec<ScoreEntry> {
        self.entries.read().await.clone()
    }

    fn stamp(&self, entry: NewScoreEntry) -> ScoreEntry {
        ScoreEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            student_id: entry.student_id,
            game_id: entry.game_id,
            level: entry.level,
            score: entry.score,
            recorded_at: entry.recorded_at,
        }
    }
}

fn ranked(mut entries: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
    entries
}

#[async_trait]
impl ScoreEntryStore for MemoryScoreEntryStore {
    async fn delete_where(&self, student_id: i64, game_id: i64) -> Result<u64, AppError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| !(e.student_id == student_id && e.game_id == game_id));
        Ok((before - entries.len()) as u64)
    }

    async fn insert(&self, entry: NewScoreEntry) -> Result<ScoreEntry, AppError> {
        let stored = self.stamp(entry);
        self.entries.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn replace(&self, entry: NewScoreEntry) -> Result<ScoreEntry, AppError> {
        // Delete and insert under the same guard.
        let mut entries = self.entries.write().await;
        entries.retain(|e| !(e.student_id == entry.student_id && e.game_id == entry.game_id));
        let stored = self.stamp(entry);
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn top_n_by_score(
        &self,
        student_id: i64,
        level: i32,
        limit: usize,
    ) -> Result<Vec<ScoreEntry>, AppError> {
        let entries = self.entries.read().await;
        let matching = entries
            .iter()
            .filter(|e| e.student_id == student_id && e.level == level)
            .cloned()
            .collect();
        Ok(ranked(matching).into_iter().take(limit).collect())
    }

    async fn list_for_student(&self, student_id: i64) -> Result<Vec<ScoreEntry>, AppError> {
        let entries = self.entries.read().await;
        let matching = entries
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect();
        Ok(ranked(matching))
    }
}

#[derive(Debug)]
pub struct MemoryGradeRecordStore {
    records: RwLock<HashMap<GradeKey, GradeRecord>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
}

impl Default for MemoryGradeRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGradeRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Seeds a record as if another part of the school system had written it.
    pub async fn seed(&self, mut record: GradeRecord) -> GradeRecord {
        record.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.records.write().await.insert(record.key(), record.clone());
        record
    }

    /// Number of trait calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl GradeRecordStore for MemoryGradeRecordStore {
    async fn get(&self, key: &GradeKey) -> Result<Option<GradeRecord>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn upsert_virtual_average(
        &self,
        key: &GradeKey,
        average: i32,
    ) -> Result<GradeRecord, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.write().await;
        let record = records.entry(*key).or_insert_with(|| GradeRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            student_id: key.student_id,
            school_level_id: key.school_level_id,
            grade: key.grade,
            bimestre: key.bimestre,
            year: key.year,
            ..GradeRecord::default()
        });
        record.virtual_practice_average = Some(average);
        Ok(record.clone())
    }
}

/// Concrete handles to the in-memory stores, kept so tests can inspect them
/// after wiring them into a [`Repositories`] bundle.
#[derive(Clone)]
pub struct MemoryRepositories {
    pub students: Arc<MemoryStudentDirectory>,
    pub factors: Arc<MemoryScoreFactorStore>,
    pub calendar: Arc<MemoryPeriodCalendar>,
    pub scores: Arc<MemoryScoreEntryStore>,
    pub grades: Arc<MemoryGradeRecordStore>,
}

impl MemoryRepositories {
    pub fn new(
        students: Vec<StudentProfile>,
        factors: Vec<ScoreFactor>,
        periods: Vec<GradingPeriod>,
    ) -> Self {
        Self {
            students: Arc::new(MemoryStudentDirectory::new(students)),
            factors: Arc::new(MemoryScoreFactorStore::new(factors)),
            calendar: Arc::new(MemoryPeriodCalendar::new(periods)),
            scores: Arc::new(MemoryScoreEntryStore::new()),
            grades: Arc::new(MemoryGradeRecordStore::new()),
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            students: self.students.clone(),
            factors: self.factors.clone(),
            calendar: self.calendar.clone(),
            scores: self.scores.clone(),
            grades: self.grades.clone(),
        }
    }
}

/// Four bimestres covering `year`, roughly following the school calendar.
pub fn school_year(year: i32) -> Vec<GradingPeriod> {
    let bounds = [(3, 1, 5, 9), (5, 20, 7, 25), (8, 5, 10, 10), (10, 21, 12, 20)];
    bounds
        .iter()
        .enumerate()
        .filter_map(|(i, &(sm, sd, em, ed))| {
            Some(GradingPeriod {
                id: i64::from(year) * 10 + i as i64 + 1,
                year,
                bimestre: i as i32 + 1,
                start_date: chrono::NaiveDate::from_ymd_opt(year, sm, sd)?,
                end_date: chrono::NaiveDate::from_ymd_opt(year, em, ed)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(game_id: i64, level: i32, score: f64) -> NewScoreEntry {
        NewScoreEntry {
            student_id: 1,
            game_id,
            level,
            score,
            recorded_at: Utc.with_ymd_and_hms(2026, 8, 20, 8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_delete_where_only_hits_matching_pair() {
        let store = MemoryScoreEntryStore::new();
        store.insert(entry(1, 2, 10.0)).await.unwrap();
        store.insert(entry(2, 2, 20.0)).await.unwrap();

        assert_eq!(store.delete_where(1, 1).await.unwrap(), 1);
        assert_eq!(store.delete_where(1, 1).await.unwrap(), 0);

        let left = store.all().await;
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].game_id, 2);
    }

    #[tokio::test]
    async fn test_top_n_ranks_and_limits() {
        let store = MemoryScoreEntryStore::new();
        for (game, score) in [(1, 30.0), (2, 90.0), (3, 60.0), (4, 90.0)] {
            store.insert(entry(game, 2, score)).await.unwrap();
        }
        store.insert(entry(5, 3, 100.0)).await.unwrap();

        let top = store.top_n_by_score(1, 2, 3).await.unwrap();

        let games: Vec<i64> = top.iter().map(|e| e.game_id).collect();
        // Ties keep the older entry first.
        assert_eq!(games, vec![2, 4, 3]);
    }

    #[tokio::test]
    async fn test_calendar_uses_inclusive_bounds() {
        let calendar = MemoryPeriodCalendar::new(school_year(2026));

        let first_day = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let last_day = Utc.with_ymd_and_hms(2026, 5, 9, 23, 59, 59).unwrap();
        let gap = Utc.with_ymd_and_hms(2026, 5, 12, 12, 0, 0).unwrap();

        assert_eq!(calendar.find(2026, first_day).await.unwrap().unwrap().bimestre, 1);
        assert_eq!(calendar.find(2026, last_day).await.unwrap().unwrap().bimestre, 1);
        assert!(calendar.find(2026, gap).await.unwrap().is_none());
        assert!(calendar.find(2025, first_day).await.unwrap().is_none());
    }
}
