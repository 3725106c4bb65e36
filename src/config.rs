// src/config.rs

use std::env;

use dotenvy::dotenv;

use crate::error::AppError;

/// Minimum number of ranked score entries required before a virtual-practice
/// average is written for a period.
pub const DEFAULT_MIN_SAMPLES: usize = 5;

/// How many of a student's best entries per level feed the period average.
pub const DEFAULT_TOP_N: usize = 10;

/// Upper bound of the grading scale the virtual-practice average maps onto.
pub const GRADE_SCALE: f64 = 20.0;

/// Aggregation policy constants. Both are configurable so they can follow
/// whatever the school's ranking query uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationPolicy {
    pub min_samples: usize,
    pub top_n: usize,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            min_samples: DEFAULT_MIN_SAMPLES,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AggregationPolicy {
    pub fn new(min_samples: usize, top_n: usize) -> Result<Self, AppError> {
        if min_samples == 0 {
            return Err(AppError::InternalServerError(
                "AGGREGATION_MIN_SAMPLES must be at least 1".to_string(),
            ));
        }
        // A limit below the threshold would make aggregation unreachable.
        if top_n < min_samples {
            return Err(AppError::InternalServerError(format!(
                "AGGREGATION_TOP_N ({}) must not be smaller than AGGREGATION_MIN_SAMPLES ({})",
                top_n, min_samples
            )));
        }
        Ok(Self { min_samples, top_n })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    pub policy: AggregationPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = parsed_or("PORT", 3000)?;

        let policy = AggregationPolicy::new(
            parsed_or("AGGREGATION_MIN_SAMPLES", DEFAULT_MIN_SAMPLES)?,
            parsed_or("AGGREGATION_TOP_N", DEFAULT_TOP_N)?,
        )?;

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            policy,
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::InternalServerError(format!("{} must be set", key)))
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_constants() {
        let policy = AggregationPolicy::default();
        assert_eq!(policy.min_samples, 5);
        assert_eq!(policy.top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn policy_rejects_limit_below_threshold() {
        assert!(AggregationPolicy::new(5, 4).is_err());
        assert!(AggregationPolicy::new(0, 4).is_err());
        assert_eq!(AggregationPolicy::new(5, 5).unwrap().top_n, 5);
    }
}
