//! Common library for the Memento services
//!
//! This crate provides shared functionality used across the Memento
//! services: PostgreSQL connectivity, database error types, and the
//! token service that issues and validates session credentials.

pub mod database;
pub mod error;
pub mod token;
