//! care.event.v1 input schema
//!
//! This module defines the versioned wire format for care event logs and
//! the adapter that turns serialized logs (JSON array or NDJSON) into the
//! engine's event type.

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;
