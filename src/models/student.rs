// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Enrollment profile of a student, as exposed by the student directory.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: i64,
    /// Identity the bearer token refers to.
    pub person_id: i64,
    pub school_level_id: i64,
    pub grade: i32,
}
