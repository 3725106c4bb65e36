// src/models/score_factor.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'score_factors' table.
/// Per-level reference data that turns raw timings into a score.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ScoreFactor {
    /// Difficulty level the factor applies to (primary key).
    pub level: i32,

    /// Points awarded before any time penalty.
    pub base: i32,

    /// Expected duration baseline for the level, in seconds.
    pub duration_base: i32,

    /// Maximum attainable total used to scale period averages.
    pub max_score: i32,

    /// Time-penalty multiplier.
    pub factor: i32,
}
