//! API models for request and response payloads

use engine::{Estimate, Profile};
use serde::Serialize;
use uuid::Uuid;

/// Response for profile reads and updates
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub profile: Profile,
}

/// Response for the life-expectancy estimate
///
/// This is the engine's JSON-shaped output consumed by the countdown
/// display; `life_expectancy` is the adjusted years.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub life_expectancy: i64,
    pub days_lived: i64,
    pub days_remaining: i64,
    pub percent_completed: f64,
}

impl From<&Estimate> for EstimateResponse {
    fn from(estimate: &Estimate) -> Self {
        EstimateResponse {
            life_expectancy: estimate.adjusted_years,
            days_lived: estimate.days_lived,
            days_remaining: estimate.days_remaining,
            percent_completed: estimate.percent_completed,
        }
    }
}
