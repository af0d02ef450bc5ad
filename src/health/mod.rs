//! Health scoring of sensor readings and the per-plant score history.

mod history;
mod scorer;

pub use history::{HealthHistory, HistoryEntry, MAX_HISTORY, REPEAT_AFTER_MINUTES};
pub use scorer::{
    component_score, HealthAssessment, HealthInputs, HealthScorer, HealthStatus, SubScores,
    DEFAULT_TEMPERATURE_IDEAL, FRESHNESS_WINDOW_MINUTES, MOISTURE_IDEAL, NEUTRAL_SCORE,
};
