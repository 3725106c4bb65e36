// src/state.rs

use axum::extract::FromRef;

use crate::{config::Config, scoring::GradingService};

#[derive(Clone)]
pub struct AppState {
    pub grading: GradingService,
    pub config: Config,
}

impl FromRef<AppState> for GradingService {
    fn from_ref(state: &AppState) -> Self {
        state.grading.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
