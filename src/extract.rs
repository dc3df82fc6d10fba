//! Field extraction from decoded booking-confirmation text
//!
//! Nothing in here fails: a field whose rules all miss stays `None`, and a
//! flight section with too little in it is skipped.

use crate::rules::{Rule, RuleChain, first_group, group, named, squash_whitespace};
use crate::types::{BookingRecord, Cabin, Endpoint, FareClass, FlightRecord};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{Month, NaiveTime};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

// Subject handling

static ENCODED_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)=\?UTF-8\?B\?([^?]+)\?=").expect("valid encoded-word pattern")
});

static PASSENGER_NAME: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "passenger_name",
        vec![Rule::new(
            r"(?P<name>[A-Z][A-Z \t/]*?)[ \t]+\d{1,2}[A-Z]{3}\d{4}",
            display_name,
        )],
    )
});

// Booking-level fields

static BOOKING_REFERENCE: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "booking_reference",
        vec![
            Rule::first_group(r"(?i)\bBOOKING REF:[ \t]*([A-Z0-9]{6,8})\b"),
            Rule::first_group(r"(?i)FLIGHT BOOKING REF:[ \t]*[A-Z0-9]{2}/([A-Z0-9]{6,8})\b"),
            Rule::first_group(r"(?i)\bREF:[ \t]*([A-Z0-9]{6,8})\b"),
        ],
    )
});

static BOOKING_DATE: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "booking_date",
        vec![
            Rule::new(
                r"(?i)\bDATE:[ \t]*(\d{1,2}[ \t]+[A-Z]+[ \t]+\d{4})\b",
                worded_date,
            ),
            Rule::first_group(r"(?i)\bDATE:[ \t]*(\d{1,2}/\d{1,2}/\d{4})\b"),
            Rule::new(r"(?i)\b(\d{1,2}[ \t]+[A-Z]+[ \t]+\d{4})\b", worded_date),
        ],
    )
});

// Anchored to label positions so prose like "HAVE A GOOD TRIP" never matches
static GROUP_LABEL: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "group_label",
        vec![
            Rule::first_group(r"(?im)^[ \t]*GROUP[ \t]+BOOKING:[ \t]*(.+?)[ \t]*$"),
            Rule::first_group(r"(?im)^[ \t]*GROUP:[ \t]*(.+?)[ \t]*$"),
            Rule::first_group(r"(?im)^[ \t]*TRIP(?:[ \t]+ID)?[ \t]*:[ \t]*(.+?)[ \t]*$"),
            Rule::first_group(r"(?im)\b(?:GROUP|TRIP[ \t]+ID)[ \t]*:[ \t]*(.+?)[ \t]*$"),
            // Bare heading, uppercase only
            Rule::first_group(r"(?m)^[ \t]*GROUP[ \t]+([^:\n]+?)[ \t]*$"),
        ],
    )
});

static TICKET_NUMBER: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "ticket_number",
        vec![
            Rule::new(
                r"(?i)\bTICKET:[ \t]*([A-Z0-9/][A-Z0-9/ \t]*?)[ \t]+FOR\b",
                ticket,
            ),
            Rule::new(r"(?i)\bETKT[ \t]+\d+[ \t]+(\d+)[ \t]+FOR\b", ticket),
            Rule::new(
                r"(?im)\bTICKET(?::[ \t]*|[ \t]+)([A-Z0-9/][A-Z0-9/ \t]*?)(?:[ \t]+FOR\b|[ \t]*$)",
                ticket,
            ),
        ],
    )
});

// Flight segmentation

static FLIGHT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bFLIGHT[ \t]+[A-Z0-9][A-Z0-9 \t]*-[ \t]*[A-Z]").expect("valid header pattern")
});

static SECTION_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)FLIGHT\(S\)\s+CALCULATED|GENERAL\s+INFORMATION|FLIGHT\s+TICKET")
        .expect("valid terminal pattern")
});

// Per-segment fields

static FLIGHT_IDENT: LazyLock<RuleChain<(String, String)>> = LazyLock::new(|| {
    const NUMBER: &str = r"FLIGHT[ \t]+(?P<number>(?:[A-Z]{2}|[A-Z]\d|\d[A-Z])[ \t]*\d{1,4})[ \t]*-[ \t]*";
    RuleChain::new(
        "flight_number",
        vec![
            Rule::new(
                &format!(
                    r"{NUMBER}(?P<airline>[A-Z][A-Z \t]*?)[ \t]+[A-Z]{{3}}[ \t]+\d{{1,2}}[ \t]+[A-Z]+[ \t]+\d{{4}}"
                ),
                flight_ident,
            ),
            Rule::new(
                &format!(r"{NUMBER}(?P<airline>[A-Z][A-Z \t]*?)[ \t]+\w+[ \t]+\d+"),
                flight_ident,
            ),
            Rule::new(
                &format!(r"{NUMBER}(?P<airline>[A-Z](?:[A-Z \t]*[A-Z])?)"),
                flight_ident,
            ),
        ],
    )
});

static DEPARTURE: LazyLock<RuleChain<Endpoint>> =
    LazyLock::new(|| endpoint_chain("departure", "DEPARTURE"));

static ARRIVAL: LazyLock<RuleChain<Endpoint>> =
    LazyLock::new(|| endpoint_chain("arrival", "ARRIVAL"));

static SEGMENT_BOOKING_REF: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "segment_booking_ref",
        vec![
            Rule::first_group(r"(?i)FLIGHT BOOKING REF:[ \t]*([A-Z0-9/]+)"),
            Rule::first_group(r"(?i)BOOKING REF:[ \t]*([A-Z0-9/]+)"),
        ],
    )
});

static FARE_CLASS: LazyLock<RuleChain<FareClass>> = LazyLock::new(|| {
    RuleChain::new(
        "fare_class",
        vec![
            Rule::new(
                r"(?i)RESERVATION CONFIRMED,[ \t]*(ECONOMY|BUSINESS|FIRST)[ \t]*\(([^)\n]+)\)",
                fare_class,
            ),
            Rule::new(
                r"(?i)\b(BUSINESS|ECONOMY|FIRST)[ \t]*\(([^)\n]+)\)",
                fare_class,
            ),
            Rule::new(r"(?i)\b(ECONOMY|BUSINESS|FIRST)[ \t]+CLASS\b", fare_class),
        ],
    )
});

static DURATION: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "duration",
        vec![
            Rule::first_group(r"(?i)DURATION:[ \t]*(\d{1,2}:\d{2})"),
            Rule::new(r"(?i)DURATION:?[ \t]*(\d{1,2}H[ \t]*\d{2}M?)", |caps| {
                group(caps, 1).map(|d| squash_whitespace(&d))
            }),
            Rule::first_group(r"(?i)FLIGHT TIME:[ \t]*(\d{1,2}:\d{2})"),
        ],
    )
});

static AIRCRAFT: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "aircraft_type",
        vec![
            Rule::first_group(r"(?im)EQUIPMENT:[ \t]*([A-Z0-9 ()\-]+?)[ \t]*$"),
            Rule::first_group(r"(?im)AIRCRAFT:[ \t]*(.+?)[ \t]*$"),
            Rule::first_group(r"(?im)\bAC:[ \t]*(.+?)[ \t]*$"),
        ],
    )
});

static MEAL: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "meal_service",
        vec![
            // Continuation lines only count when the block is closed by a
            // NON STOP or FLIGHT line, or the end of the section
            Rule::new(
                r"(?i)MEAL:[ \t]*([A-Z /]+(?:\n[ \t]+[A-Z /]+)*)[ \t]*(?:\n[ \t]*(?:NON STOP|FLIGHT)|\n?\z)",
                meal_lines,
            ),
            Rule::first_group(r"(?im)MEAL:[ \t]*(.+?)[ \t]*$"),
            Rule::first_group(r"(?im)CATERING:[ \t]*(.+?)[ \t]*$"),
        ],
    )
});

static BAGGAGE: LazyLock<RuleChain<String>> = LazyLock::new(|| {
    RuleChain::new(
        "baggage_allowance",
        vec![
            Rule::first_group(r"(?i)BAGGAGE ALLOWANCE:[ \t]*([A-Z0-9]+)"),
            Rule::first_group(r"(?i)BAGGAGE:[ \t]*([A-Z0-9]+)"),
            Rule::first_group(r"(?i)\bBAG:[ \t]*([A-Z0-9]+)"),
        ],
    )
});

/// Build the departure or arrival chain. Each rule names its own captures
/// (`city`, `airport`, `when`) instead of relying on group positions.
fn endpoint_chain(field: &'static str, label: &str) -> RuleChain<Endpoint> {
    const WHEN: &str = r"(?P<when>\d{1,2}\s+[A-Z]{3}\s+\d{2}:\d{2})";
    const TERMINAL: &str = r"(?:,[ \t]*TERMINAL[ \t]*\w+)?";

    RuleChain::new(
        field,
        vec![
            // CITY, CC (AIRPORT), TERMINAL n  12 JAN 10:00
            Rule::new(
                &format!(
                    r"{label}:[ \t]*(?P<city>[^,(\n]+?)(?:,[ \t]*(?P<country>[A-Z]{{2}}))?[ \t]*\((?P<airport>[^)\n]+)\){TERMINAL}\s*{WHEN}"
                ),
                endpoint,
            ),
            // CITY, STATE, COUNTRY (AIRPORT)  12 JAN 10:00
            Rule::new(
                &format!(
                    r"{label}:[ \t]*(?P<city>[^(\n]+?)[ \t]*\((?P<airport>[^)\n]+)\){TERMINAL}\s*{WHEN}"
                ),
                endpoint,
            ),
            // CITY  12 JAN 10:00
            Rule::new(
                &format!(r"{label}:[ \t]*(?P<city>[^\n]+?)\s*{WHEN}"),
                endpoint,
            ),
        ],
    )
}

/// Extract booking metadata and flight drafts from decoded text
#[must_use]
pub fn extract(text: &str, subject: &str) -> (BookingRecord, Vec<FlightRecord>) {
    (extract_booking(text, subject), extract_flights(text))
}

/// Booking-level fields: passenger from the subject, the rest from the body
#[must_use]
pub fn extract_booking(text: &str, subject: &str) -> BookingRecord {
    BookingRecord {
        passenger_name: passenger_name(subject),
        booking_reference: BOOKING_REFERENCE.resolve(text),
        booking_date: BOOKING_DATE.resolve(text),
        group_label: GROUP_LABEL.resolve(text),
        ticket_number: TICKET_NUMBER.resolve(text),
    }
}

/// Passenger name from a `LASTNAME/FIRSTNAME 12JAN2024 ROUTE` subject,
/// returned in display order.
#[must_use]
pub fn passenger_name(subject: &str) -> Option<String> {
    PASSENGER_NAME.resolve(&decode_encoded_words(subject))
}

/// Replace `=?UTF-8?B?...?=` encoded words with their decoded text.
/// Words that do not decode are left untouched.
#[must_use]
pub fn decode_encoded_words(subject: &str) -> String {
    ENCODED_WORD
        .replace_all(subject, |caps: &Captures<'_>| {
            STANDARD
                .decode(&caps[1])
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Split text into flight sections, in source order
///
/// A section runs from a `FLIGHT <code> - <name>` header to the next header,
/// a terminal marker, or the end of the text.
#[must_use]
pub fn segment_flights(text: &str) -> Vec<&str> {
    let headers: Vec<_> = FLIGHT_HEADER.find_iter(text).collect();

    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let limit = headers.get(idx + 1).map_or(text.len(), regex::Match::start);
            let end = SECTION_END
                .find(&text[header.end()..limit])
                .map_or(limit, |m| header.end() + m.start());
            &text[header.start()..end]
        })
        .collect()
}

/// Flight drafts for every section that names a flight or a route
#[must_use]
pub fn extract_flights(text: &str) -> Vec<FlightRecord> {
    let sections = segment_flights(text);
    let total = sections.len();

    let flights: Vec<FlightRecord> = sections
        .into_iter()
        .map(parse_section)
        .filter(FlightRecord::is_worth_keeping)
        .collect();

    debug!("Extracted {} of {} flight sections", flights.len(), total);
    flights
}

fn parse_section(section: &str) -> FlightRecord {
    let (flight_number, airline) = FLIGHT_IDENT.resolve(section).unzip();

    FlightRecord {
        flight_number,
        airline,
        departure: DEPARTURE.resolve(section).unwrap_or_default(),
        arrival: ARRIVAL.resolve(section).unwrap_or_default(),
        duration: DURATION.resolve(section),
        aircraft_type: AIRCRAFT.resolve(section),
        booking_ref: SEGMENT_BOOKING_REF.resolve(section),
        fare_class: FARE_CLASS.resolve(section),
        meal_service: MEAL.resolve(section),
        baggage_allowance: BAGGAGE.resolve(section),
    }
}

// Transforms

fn display_name(caps: &Captures<'_>) -> Option<String> {
    let raw = named(caps, "name")?;
    let mut parts = raw.split('/');
    let last = squash_whitespace(parts.next().unwrap_or_default());

    let name = match parts.next() {
        Some(first) => format!("{} {last}", squash_whitespace(first)),
        None => last,
    };
    let name = name.trim().to_string();
    (!name.is_empty()).then_some(name)
}

fn worded_date(caps: &Captures<'_>) -> Option<String> {
    let date = squash_whitespace(&first_group(caps)?);
    let month = date.split(' ').nth(1)?;
    month.parse::<Month>().ok()?;
    Some(date)
}

fn ticket(caps: &Captures<'_>) -> Option<String> {
    first_group(caps)
        .map(|t| squash_whitespace(&t))
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
}

fn flight_ident(caps: &Captures<'_>) -> Option<(String, String)> {
    let number = squash_whitespace(&named(caps, "number")?);
    let airline = squash_whitespace(&named(caps, "airline")?);
    Some((number, airline))
}

fn endpoint(caps: &Captures<'_>) -> Option<Endpoint> {
    let city = named(caps, "city")?
        .trim_end_matches([',', ' ', '\t'])
        .to_string();
    if city.is_empty() {
        return None;
    }
    let (date, time) = split_schedule(caps.name("when")?.as_str())?;

    Some(Endpoint {
        city: Some(city),
        airport: named(caps, "airport"),
        date: Some(date),
        time: Some(time),
    })
}

/// Split "12 JAN 10:00" into ("12 JAN", "10:00"), rejecting tokens that are
/// not a real day, month abbreviation and clock time.
#[must_use]
pub fn split_schedule(when: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = when.split_whitespace().collect();
    let [day, month, time] = parts.as_slice() else {
        return None;
    };

    let day_number: u32 = day.parse().ok()?;
    if !(1..=31).contains(&day_number) {
        return None;
    }
    month.parse::<Month>().ok()?;
    NaiveTime::parse_from_str(time, "%H:%M").ok()?;

    Some((format!("{day} {month}"), (*time).to_string()))
}

fn fare_class(caps: &Captures<'_>) -> Option<FareClass> {
    let cabin = Cabin::parse(caps.get(1)?.as_str())?;
    Some(FareClass {
        cabin,
        booking_code: group(caps, 2),
    })
}

fn meal_lines(caps: &Captures<'_>) -> Option<String> {
    let block = caps.get(1)?.as_str();
    let mut lines = block.lines().map(str::trim);
    let mut meal = vec![lines.next()?];

    for line in lines {
        let upper = line.to_ascii_uppercase();
        if upper.starts_with("NON STOP") || upper.starts_with("FLIGHT") {
            break;
        }
        meal.push(line);
    }

    let meal = squash_whitespace(&meal.join(" "));
    (!meal.is_empty()).then_some(meal)
}
