// src/models/mod.rs

pub mod attempt;
pub mod grade_record;
pub mod grading_period;
pub mod score_entry;
pub mod score_factor;
pub mod student;
