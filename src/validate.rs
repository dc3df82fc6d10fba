//! Flight completeness filter

use crate::types::{FlightRecord, ValidFlightRecord};
use tracing::debug;

/// Keep flights with a complete route and schedule, in their original order.
/// Incomplete drafts are dropped silently; garbled sections are normal input.
#[must_use]
pub fn validate(flights: Vec<FlightRecord>) -> Vec<ValidFlightRecord> {
    let total = flights.len();
    let valid: Vec<ValidFlightRecord> = flights
        .into_iter()
        .filter_map(ValidFlightRecord::new)
        .collect();

    if valid.len() < total {
        debug!("Dropped {} incomplete flights", total - valid.len());
    }
    valid
}
