//! Estimation and countdown engine for the Memento application
//!
//! This crate holds the decision logic shared by the services and the
//! presentation layer: the profile model with its merge semantics, the
//! pure life-expectancy estimator, and the countdown projector that
//! turns an estimate into live, unit-convertible display values.

pub mod estimator;
pub mod profile;
pub mod projector;

pub use estimator::{Estimate, EstimateError, estimate};
pub use profile::{Gender, Lifestyle, Profile, ProfileUpdate};
