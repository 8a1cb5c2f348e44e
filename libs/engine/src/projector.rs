//! Countdown projector
//!
//! Turns an estimate's `days_remaining` into live display values: fixed
//! unit conversions, a linear transition used to smooth the displayed
//! number between successive estimates, and the run-state machine for a
//! single countdown. The projector is presentation plumbing only; every
//! transition starts and ends on values produced by the estimator, and
//! interpolation introduces no new information.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::estimator::{Estimate, EstimateError};

/// Average Gregorian month length in days, for display conversion.
pub const DAYS_PER_WEEK: f64 = 7.0;
pub const DAYS_PER_MONTH: f64 = 30.44;
/// Average Gregorian year length. Deliberately distinct from the
/// estimator's fixed 365-day year: display smoothing and estimation
/// arithmetic use different constants and must not be unified.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Display unit for the remaining-time countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Days,
    Weeks,
    Months,
    Years,
}

impl Unit {
    pub const ALL: [Unit; 4] = [Unit::Days, Unit::Weeks, Unit::Months, Unit::Years];

    /// Convert a remaining-day count into this unit
    pub fn convert(&self, days_remaining: f64) -> f64 {
        match self {
            Unit::Days => days_remaining,
            Unit::Weeks => days_remaining / DAYS_PER_WEEK,
            Unit::Months => days_remaining / DAYS_PER_MONTH,
            Unit::Years => days_remaining / DAYS_PER_YEAR,
        }
    }
}

/// The remaining duration expressed in all display units at once
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    pub days: f64,
    pub weeks: f64,
    pub months: f64,
    pub years: f64,
}

impl Breakdown {
    pub fn from_days(days_remaining: i64) -> Self {
        let days = days_remaining as f64;
        Breakdown {
            days,
            weeks: Unit::Weeks.convert(days),
            months: Unit::Months.convert(days),
            years: Unit::Years.convert(days),
        }
    }
}

/// Why a countdown run has no usable estimate
///
/// An incomplete profile is a degraded-but-expected display state and must
/// stay distinguishable from a genuine fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayFailure {
    IncompleteProfile,
    Fetch(String),
}

impl From<EstimateError> for DisplayFailure {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::ProfileIncomplete => DisplayFailure::IncompleteProfile,
            other => DisplayFailure::Fetch(other.to_string()),
        }
    }
}

/// Run state for a single countdown
///
/// `Idle → Fetching → Ready`, `Ready → Fetching` on refresh; any fetch may
/// fail into `Error`, which is terminal until the next explicit refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Fetching,
    Ready(Estimate),
    Error(DisplayFailure),
}

impl Phase {
    pub fn new() -> Self {
        Phase::Idle
    }

    /// Begin a fetch. From `Error` this is the explicit refresh that ends
    /// the terminal state; from `Ready` it is a background refresh.
    pub fn begin_fetch(&mut self) {
        *self = Phase::Fetching;
    }

    /// Record a fetched estimate
    pub fn resolve(&mut self, estimate: Estimate) {
        *self = Phase::Ready(estimate);
    }

    /// Record a failure; the countdown display degrades, never crashes
    pub fn fail(&mut self, failure: DisplayFailure) {
        *self = Phase::Error(failure);
    }

    pub fn reset(&mut self) {
        *self = Phase::Idle;
    }

    pub fn estimate(&self) -> Option<&Estimate> {
        match self {
            Phase::Ready(estimate) => Some(estimate),
            _ => None,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::new()
    }
}

/// Linear interpolation between two known display values over a fixed
/// window
///
/// The transition is pure display smoothing: it starts at the previously
/// displayed value and converges exactly to the target at the end of the
/// window, every time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    start: f64,
    target: f64,
    window: Duration,
}

impl Transition {
    pub fn new(start: f64, target: f64, window: Duration) -> Self {
        Transition {
            start,
            target,
            window,
        }
    }

    /// The interpolated value after `elapsed` time; exactly `target` at or
    /// past the end of the window
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        if elapsed >= self.window || self.window.is_zero() {
            return self.target;
        }
        let progress = elapsed.as_secs_f64() / self.window.as_secs_f64();
        self.start + (self.target - self.start) * progress
    }

    /// Supersede this transition mid-window: the new one restarts the full
    /// window from the current interpolated value, not from zero
    pub fn retarget(&self, elapsed: Duration, new_target: f64) -> Transition {
        Transition {
            start: self.value_at(elapsed),
            target: new_target,
            window: self.window,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

/// Tick period for the animation loop.
const TICK: Duration = Duration::from_millis(16);

/// A cancellable animated value for one displayed quantity
///
/// Each `Animator` owns at most one running interpolation task; starting a
/// new transition aborts the prior task before spawning the next, so two
/// competing loops can never drive the same quantity. The current value is
/// published through a watch channel for the display to render.
pub struct Animator {
    value: Arc<watch::Sender<f64>>,
    window: Duration,
    task: Option<JoinHandle<()>>,
}

impl Animator {
    pub fn new(initial: f64, window: Duration) -> Self {
        let (tx, _) = watch::channel(initial);
        Animator {
            value: Arc::new(tx),
            window,
            task: None,
        }
    }

    /// Subscribe to the displayed value
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.value.subscribe()
    }

    /// The value currently displayed
    pub fn current(&self) -> f64 {
        *self.value.borrow()
    }

    /// Animate from the currently displayed value to `target` over the
    /// fixed window, atomically superseding any transition in flight
    pub fn animate_to(&mut self, target: f64) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let start = self.current();
        let transition = Transition::new(start, target, self.window);
        let value = Arc::clone(&self.value);

        debug!(start, target, "starting display transition");

        self.task = Some(tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let mut ticker = tokio::time::interval(TICK);
            loop {
                ticker.tick().await;
                let elapsed = started.elapsed();
                if elapsed >= transition.window {
                    break;
                }
                // send_replace publishes even while nobody subscribes, so
                // `current` keeps advancing before the first subscriber
                // arrives.
                value.send_replace(transition.value_at(elapsed));
            }
            // The loop always lands exactly on the estimator-produced
            // target, regardless of tick jitter.
            value.send_replace(transition.target());
        }));
    }

    /// Cancel any transition in flight, leaving the current value as-is
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// One animator per display unit, all driven from the same estimator
/// output
pub struct CountdownDisplay {
    animators: HashMap<Unit, Animator>,
}

impl CountdownDisplay {
    pub fn new(window: Duration) -> Self {
        let animators = Unit::ALL
            .iter()
            .map(|&unit| (unit, Animator::new(0.0, window)))
            .collect();
        CountdownDisplay { animators }
    }

    /// Feed a newly fetched remaining-day count to every unit's animator
    pub fn set_days_remaining(&mut self, days_remaining: i64) {
        for (unit, animator) in self.animators.iter_mut() {
            animator.animate_to(unit.convert(days_remaining as f64));
        }
    }

    pub fn subscribe(&self, unit: Unit) -> Option<watch::Receiver<f64>> {
        self.animators.get(&unit).map(Animator::subscribe)
    }

    pub fn current(&self, unit: Unit) -> Option<f64> {
        self.animators.get(&unit).map(Animator::current)
    }

    /// Tear down all animation tasks
    pub fn teardown(&mut self) {
        for animator in self.animators.values_mut() {
            animator.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::estimate;
    use crate::profile::{Lifestyle, Profile};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_unit_conversions() {
        assert_eq!(Unit::Days.convert(18250.0), 18250.0);
        assert!((Unit::Weeks.convert(18250.0) - 18250.0 / 7.0).abs() < 1e-9);
        assert!((Unit::Months.convert(18250.0) - 18250.0 / 30.44).abs() < 1e-9);
        assert!((Unit::Years.convert(18250.0) - 18250.0 / 365.25).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_matches_units() {
        let breakdown = Breakdown::from_days(-100);
        assert_eq!(breakdown.days, -100.0);
        assert!((breakdown.years - (-100.0 / 365.25)).abs() < 1e-9);
    }

    #[test]
    fn test_transition_converges_exactly() {
        let t = Transition::new(0.0, 1000.0, Duration::from_secs(2));
        assert_eq!(t.value_at(Duration::ZERO), 0.0);
        assert!((t.value_at(Duration::from_secs(1)) - 500.0).abs() < 1e-9);
        assert_eq!(t.value_at(Duration::from_secs(2)), 1000.0);
        assert_eq!(t.value_at(Duration::from_secs(10)), 1000.0);
    }

    #[test]
    fn test_retarget_restarts_from_current_value() {
        let t = Transition::new(0.0, 1000.0, Duration::from_secs(2));
        // Halfway through, a new target arrives.
        let t2 = t.retarget(Duration::from_secs(1), 200.0);
        assert!((t2.value_at(Duration::ZERO) - 500.0).abs() < 1e-9);
        // The superseding transition still converges exactly.
        assert_eq!(t2.value_at(Duration::from_secs(2)), 200.0);
    }

    #[test]
    fn test_retarget_sequence_ends_on_last_target() {
        let window = Duration::from_secs(2);
        let mut t = Transition::new(0.0, 100.0, window);
        // Targets keep arriving before the prior window elapses.
        for target in [250.0, -40.0, 9000.0] {
            t = t.retarget(Duration::from_millis(300), target);
        }
        assert_eq!(t.value_at(window), 9000.0);
    }

    #[test]
    fn test_zero_window_transition_is_immediate() {
        let t = Transition::new(5.0, 42.0, Duration::ZERO);
        assert_eq!(t.value_at(Duration::ZERO), 42.0);
    }

    #[test]
    fn test_phase_run_lifecycle() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let profile = Profile {
            birthdate: Some(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()),
            lifestyle: Lifestyle::default(),
            ..Default::default()
        };
        let est = estimate(&profile, now).unwrap();

        let mut phase = Phase::new();
        assert_eq!(phase, Phase::Idle);

        phase.begin_fetch();
        assert_eq!(phase, Phase::Fetching);

        phase.resolve(est.clone());
        assert_eq!(phase.estimate(), Some(&est));

        // Refresh from Ready.
        phase.begin_fetch();
        assert_eq!(phase, Phase::Fetching);

        phase.fail(DisplayFailure::Fetch("connection reset".into()));
        assert!(matches!(phase, Phase::Error(DisplayFailure::Fetch(_))));

        // Error holds until an explicit refresh.
        phase.begin_fetch();
        assert_eq!(phase, Phase::Fetching);
    }

    #[test]
    fn test_incomplete_profile_is_a_distinct_display_state() {
        let failure: DisplayFailure = EstimateError::ProfileIncomplete.into();
        assert_eq!(failure, DisplayFailure::IncompleteProfile);

        let failure: DisplayFailure = EstimateError::InvalidBirthdate.into();
        assert!(matches!(failure, DisplayFailure::Fetch(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_animator_converges_to_target() {
        let mut animator = Animator::new(0.0, Duration::from_millis(200));
        let rx = animator.subscribe();

        animator.animate_to(1000.0);
        tokio::time::sleep(Duration::from_millis(400)).await;
        // Let the spawned task run to completion of its window.
        tokio::task::yield_now().await;

        assert_eq!(*rx.borrow(), 1000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animator_converges_without_a_subscriber() {
        // No one has subscribed yet; the value must still advance and
        // land exactly on the target.
        let mut animator = Animator::new(0.0, Duration::from_millis(200));

        animator.animate_to(18250.0);
        tokio::time::sleep(Duration::from_millis(400)).await;
        tokio::task::yield_now().await;

        assert_eq!(animator.current(), 18250.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animator_supersession_converges_to_last_target() {
        let mut animator = Animator::new(0.0, Duration::from_millis(200));
        let rx = animator.subscribe();

        // Retrigger repeatedly before the window elapses; only the last
        // target may win.
        animator.animate_to(500.0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        animator.animate_to(-80.0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        animator.animate_to(18250.0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        tokio::task::yield_now().await;

        assert_eq!(*rx.borrow(), 18250.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_the_loop() {
        let mut animator = Animator::new(0.0, Duration::from_millis(200));

        animator.animate_to(100.0);
        tokio::time::sleep(Duration::from_millis(50)).await;
        animator.cancel();
        let frozen = animator.current();

        tokio::time::sleep(Duration::from_millis(400)).await;
        tokio::task::yield_now().await;

        // No competing loop keeps mutating the value after teardown.
        assert_eq!(animator.current(), frozen);
        assert_ne!(animator.current(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_drives_all_units_from_one_count() {
        let mut display = CountdownDisplay::new(Duration::from_millis(100));
        display.set_days_remaining(18250);

        tokio::time::sleep(Duration::from_millis(300)).await;
        tokio::task::yield_now().await;

        assert_eq!(display.current(Unit::Days), Some(18250.0));
        let years = display.current(Unit::Years).unwrap();
        assert!((years - 18250.0 / 365.25).abs() < 1e-9);

        display.teardown();
    }
}
