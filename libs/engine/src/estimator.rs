//! Life-expectancy estimator
//!
//! A pure, deterministic function from (profile, now) to an estimate.
//! The demographic assumption is a single fixed baseline; lifestyle flags
//! apply additive adjustments with no clamping. The fixed 365-day year is
//! intentional and keeps the arithmetic exactly reproducible; do not
//! substitute leap-aware year lengths here.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::profile::{Lifestyle, Profile};

/// Fixed baseline life expectancy in years, before lifestyle adjustment.
///
/// No country or gender adjustment is applied even though the profile
/// carries those fields; they stay informational until a specified
/// weighting table exists.
pub const BASELINE_YEARS: i64 = 80;

/// Days per estimation year. Distinct from the projector's display
/// constants on purpose.
pub const DAYS_PER_YEAR: i64 = 365;

const SMOKER_ADJUSTMENT: i64 = -10;
const DRINKER_ADJUSTMENT: i64 = -5;
const EXERCISE_ADJUSTMENT: i64 = 3;
const DIET_ADJUSTMENT: i64 = 3;

/// Errors from the estimator
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateError {
    /// The profile has no birthdate; a partial profile cannot be estimated
    #[error("Profile information incomplete")]
    ProfileIncomplete,

    /// The birthdate lies in the future relative to the reference time
    #[error("Birthdate is in the future")]
    InvalidBirthdate,

    /// Adjusted life expectancy is zero or negative; surfaced, never floored
    #[error("Adjusted life expectancy is not positive")]
    NonPositiveLifeExpectancy,
}

/// The derived life-expectancy/countdown numbers for one profile at one
/// instant. Recomputed in full on every request, never persisted, never
/// returned partially.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub baseline_years: i64,
    pub adjusted_years: i64,
    pub days_lived: i64,
    pub days_remaining: i64,
    pub percent_completed: f64,
    pub projected_end_date: NaiveDate,
    pub reference_now: DateTime<Utc>,
}

/// Apply the lifestyle adjustments to the baseline
///
/// Adjustments are additive, independent, and applied once each.
pub fn adjusted_years(lifestyle: &Lifestyle) -> i64 {
    let mut years = BASELINE_YEARS;
    if lifestyle.smoker {
        years += SMOKER_ADJUSTMENT;
    }
    if lifestyle.drinker {
        years += DRINKER_ADJUSTMENT;
    }
    if lifestyle.regular_exercise {
        years += EXERCISE_ADJUSTMENT;
    }
    if lifestyle.healthy_diet {
        years += DIET_ADJUSTMENT;
    }
    years
}

/// Estimate remaining lifespan for a profile at a reference instant
pub fn estimate(profile: &Profile, now: DateTime<Utc>) -> Result<Estimate, EstimateError> {
    let birthdate = profile.birthdate.ok_or(EstimateError::ProfileIncomplete)?;
    compute(birthdate, adjusted_years(&profile.lifestyle), now)
}

fn compute(
    birthdate: NaiveDate,
    adjusted_years: i64,
    now: DateTime<Utc>,
) -> Result<Estimate, EstimateError> {
    let today = now.date_naive();
    if birthdate > today {
        return Err(EstimateError::InvalidBirthdate);
    }

    if adjusted_years <= 0 {
        return Err(EstimateError::NonPositiveLifeExpectancy);
    }

    // Whole days since the birthdate's midnight; birthdate == today is 0.
    let days_lived = (today - birthdate).num_days();
    let total_days = adjusted_years * DAYS_PER_YEAR;
    let days_remaining = total_days - days_lived;
    let percent_completed = 100.0 * days_lived as f64 / total_days as f64;

    // Calendar-date arithmetic, not millisecond math: adding days to a
    // NaiveDate cannot drift across month or year boundaries.
    let projected_end_date = birthdate
        .checked_add_days(Days::new(total_days as u64))
        .ok_or(EstimateError::InvalidBirthdate)?;

    Ok(Estimate {
        baseline_years: BASELINE_YEARS,
        adjusted_years,
        days_lived,
        days_remaining,
        percent_completed,
        projected_end_date,
        reference_now: now,
    })
}
