//! Core types for extracted booking data

use serde::{Deserialize, Serialize};
use std::fmt;

/// Booking-level metadata found once per email
///
/// Every field is optional: vendors omit fields freely and a missing value
/// is the common case, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    /// Passenger name in display order ("FIRSTNAME LASTNAME")
    pub passenger_name: Option<String>,

    /// Booking-level record locator
    pub booking_reference: Option<String>,

    /// Date the booking was issued, as printed
    pub booking_date: Option<String>,

    /// Group or trip label
    pub group_label: Option<String>,

    /// Electronic ticket number
    pub ticket_number: Option<String>,
}

impl BookingRecord {
    /// True when nothing could be extracted
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.passenger_name.is_none()
            && self.booking_reference.is_none()
            && self.booking_date.is_none()
            && self.group_label.is_none()
            && self.ticket_number.is_none()
    }
}

/// One end of a flight segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub city: Option<String>,

    /// Airport code or name found in parentheses
    pub airport: Option<String>,

    /// Day and month abbreviation, e.g. "12 JAN"
    pub date: Option<String>,

    /// Local time, "HH:MM"
    pub time: Option<String>,
}

/// Cabin part of a fare class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cabin {
    Economy,
    Business,
    First,
}

impl Cabin {
    /// Parse a cabin word, ignoring case
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ECONOMY" => Some(Self::Economy),
            "BUSINESS" => Some(Self::Business),
            "FIRST" => Some(Self::First),
            _ => None,
        }
    }
}

impl fmt::Display for Cabin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Economy => write!(f, "Economy"),
            Self::Business => write!(f, "Business"),
            Self::First => write!(f, "First"),
        }
    }
}

/// Fare class: cabin plus the optional booking-class code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareClass {
    pub cabin: Cabin,
    pub booking_code: Option<String>,
}

impl fmt::Display for FareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.booking_code {
            Some(code) => write!(f, "{} ({code})", self.cabin),
            None => write!(f, "{}", self.cabin),
        }
    }
}

/// A flight segment as extracted, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Carrier code and number, e.g. "NH 123"
    pub flight_number: Option<String>,

    pub airline: Option<String>,

    pub departure: Endpoint,

    pub arrival: Endpoint,

    pub duration: Option<String>,

    pub aircraft_type: Option<String>,

    /// Per-segment record locator, may differ from the booking-level one
    pub booking_ref: Option<String>,

    pub fare_class: Option<FareClass>,

    pub meal_service: Option<String>,

    pub baggage_allowance: Option<String>,
}

impl FlightRecord {
    /// Whether the section carried enough to be worth keeping as a draft
    #[must_use]
    pub const fn is_worth_keeping(&self) -> bool {
        self.flight_number.is_some()
            || (self.departure.city.is_some() && self.arrival.city.is_some())
    }
}

/// A flight record with a complete route and schedule
///
/// Guarantees non-empty flight number, departure and arrival city, and
/// departure and arrival date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidFlightRecord(FlightRecord);

impl ValidFlightRecord {
    /// Accept a record only if every required field is present and non-blank
    #[must_use]
    pub fn new(record: FlightRecord) -> Option<Self> {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        let complete = filled(&record.flight_number)
            && filled(&record.departure.city)
            && filled(&record.arrival.city)
            && filled(&record.departure.date)
            && filled(&record.arrival.date);

        complete.then_some(Self(record))
    }

    #[must_use]
    pub fn flight_number(&self) -> &str {
        self.0.flight_number.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub const fn record(&self) -> &FlightRecord {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> FlightRecord {
        self.0
    }
}

impl std::ops::Deref for ValidFlightRecord {
    type Target = FlightRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Booking plus the flights that survived validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    pub booking: BookingRecord,
    pub flights: Vec<ValidFlightRecord>,
}
