// src/scoring/calculator.rs

use crate::{
    error::AppError,
    models::{attempt::Attempt, score_factor::ScoreFactor},
};

/// Checks the timings of an attempt and returns them as
/// `(resolution_time, reaction_time)`.
///
/// Both must be present, finite and non-negative, and the level must be
/// positive since the score formula divides by it.
pub fn validate_attempt(attempt: &Attempt) -> Result<(f64, f64), AppError> {
    if attempt.level <= 0 {
        return Err(AppError::InvalidAttempt(format!(
            "level must be positive, got {}",
            attempt.level
        )));
    }

    let resolution = timing("resolution_time", attempt.resolution_time)?;
    let reaction = timing("reaction_time", attempt.reaction_time)?;

    Ok((resolution, reaction))
}

fn timing(name: &str, value: Option<f64>) -> Result<f64, AppError> {
    match value {
        None => Err(AppError::InvalidAttempt(format!("{} is missing", name))),
        Some(v) if !v.is_finite() => Err(AppError::InvalidAttempt(format!(
            "{} must be a finite number",
            name
        ))),
        Some(v) if v < 0.0 => Err(AppError::InvalidAttempt(format!(
            "{} must not be negative",
            name
        ))),
        Some(v) => Ok(v),
    }
}

/// Converts an attempt into a raw score:
///
/// `base - ((resolution_time + reaction_time) * factor) / level`
///
/// The result is neither rounded nor clamped. Slow attempts can end up below
/// zero and are stored that way; timings so large that the score overflows
/// are rejected.
pub fn compute_score(attempt: &Attempt, factor: &ScoreFactor) -> Result<f64, AppError> {
    let (resolution, reaction) = validate_attempt(attempt)?;

    if factor.level != attempt.level {
        return Err(AppError::InvalidAttempt(format!(
            "attempt played at level {} scored with factor for level {}",
            attempt.level, factor.level
        )));
    }

    let penalty = ((resolution + reaction) * f64::from(factor.factor)) / f64::from(attempt.level);
    let score = f64::from(factor.base) - penalty;

    if !score.is_finite() {
        return Err(AppError::InvalidAttempt(format!(
            "timings {} and {} do not produce a finite score",
            resolution, reaction
        )));
    }

    Ok(score)
}
