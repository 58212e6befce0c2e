//! Carecast - On-device forecasting engine for infant-care rhythms
//!
//! Carecast turns a log of care events (feedings, diaper changes, sleep,
//! pumping) into forward-looking forecasts through a deterministic pipeline:
//! interval extraction → age-banded norms → cross-activity correlation →
//! weighted blending → status resolution.
//!
//! ## Modules
//!
//! - **Forecasting**: Predict the next occurrence of each activity with a
//!   confidence tier and overdue/skip handling
//! - **Suggestions & Goals**: Blend observed feeding amounts with caregiver
//!   preferences and derive daily count targets
//!
//! The engine never reads a clock; every entry point takes the reference
//! time as an argument, so the same log replays identically anywhere.

pub mod age;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod goals;
pub mod intervals;
pub mod norms;
pub mod schema;
pub mod suggest;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use engine::{
    daily_goals, feeding_suggestions, forecast_all, forecast_diaper, forecast_feeding,
    forecast_sleep, CareEngine, REPORT_VERSION,
};
pub use error::EngineError;
pub use forecast::ActivityForecaster;

// Schema exports
pub use schema::{EventLogAdapter, EventRecord, SCHEMA_VERSION};

/// Carecast version embedded in all forecast reports
pub const CARECAST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for forecast reports
pub const PRODUCER_NAME: &str = "carecast";
