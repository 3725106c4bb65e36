// src/models/grade_record.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{grading_period::GradingPeriod, student::StudentProfile};

/// Natural key of a term grade record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradeKey {
    pub student_id: i64,
    pub school_level_id: i64,
    pub grade: i32,
    pub bimestre: i32,
    pub year: i32,
}

impl GradeKey {
    pub fn new(profile: &StudentProfile, period: &GradingPeriod) -> Self {
        Self::for_term(profile, period.year, period.bimestre)
    }

    pub fn for_term(profile: &StudentProfile, year: i32, bimestre: i32) -> Self {
        Self {
            student_id: profile.student_id,
            school_level_id: profile.school_level_id,
            grade: profile.grade,
            bimestre,
            year,
        }
    }
}

/// Represents the 'grade_records' table.
/// Every component is set independently; this crate only ever writes
/// `virtual_practice_average`.
#[derive(Debug, Clone, PartialEq, Default, FromRow, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: i64,
    pub student_id: i64,
    pub school_level_id: i64,
    pub grade: i32,
    pub bimestre: i32,
    pub year: i32,

    pub process_average: Option<f64>,
    /// 0-20 scale, derived from mini-game scores.
    pub virtual_practice_average: Option<i32>,
    pub proctored_test: Option<f64>,
    pub sprint_average: Option<f64>,
    pub term_exam: Option<f64>,
    pub platform_score: Option<f64>,
    pub in_class_score: Option<f64>,
    pub attitude_average: Option<f64>,
    pub final_grade: Option<f64>,

    pub remarks: Option<String>,
}

impl GradeRecord {
    pub fn key(&self) -> GradeKey {
        GradeKey {
            student_id: self.student_id,
            school_level_id: self.school_level_id,
            grade: self.grade,
            bimestre: self.bimestre,
            year: self.year,
        }
    }
}

/// Query parameters for fetching the caller's record.
#[derive(Debug, Deserialize)]
pub struct GradeQueryParams {
    pub year: i32,
    pub bimestre: i32,
}
