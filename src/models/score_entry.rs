// src/models/score_entry.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'score_entries' table.
/// Holds the latest attempt of a student at a game; older attempts are not kept.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: i64,
    pub student_id: i64,
    pub game_id: i64,
    pub level: i32,
    /// Raw score, possibly negative.
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
}

/// An entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScoreEntry {
    pub student_id: i64,
    pub game_id: i64,
    pub level: i32,
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
}
