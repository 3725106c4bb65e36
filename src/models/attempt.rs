// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single game submission, after the caller's identity has been resolved
/// to a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub student_id: i64,
    pub game_id: i64,
    /// Level the game was played at. Also the score factor key.
    pub level: i32,
    pub response: String,
    /// Seconds spent solving.
    pub resolution_time: Option<f64>,
    /// Seconds before the first interaction.
    pub reaction_time: Option<f64>,
}

/// DTO for submitting a game attempt.
/// The game id comes from the path and the student from the bearer token.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(range(min = 1, message = "Level must be a positive integer."))]
    pub level: i32,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub response: String,
    pub resolution_time: Option<f64>,
    pub reaction_time: Option<f64>,
}

impl SubmitAttemptRequest {
    pub fn into_attempt(self, student_id: i64, game_id: i64) -> Attempt {
        Attempt {
            student_id,
            game_id,
            level: self.level,
            response: self.response,
            resolution_time: self.resolution_time,
            reaction_time: self.reaction_time,
        }
    }
}
