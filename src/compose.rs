//! Document composition: extracted records to a structured itinerary document

use crate::config::{Branding, ComposerConfig};
use crate::types::{BookingRecord, Endpoint, ValidFlightRecord};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

const PLACEHOLDER: &str = "N/A";

static CO2_EMISSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CO2 EMISSIONS IS ([\d.]+) KG/PERSON").expect("valid emissions pattern")
});

static BRACKETED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z]{3})\)").expect("valid code pattern"));

static CODE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{3})\b").expect("valid code pattern"));

static WHOLE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid code pattern"));

/// Escape text for inclusion in HTML
#[must_use]
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Text already escaped and safe to place in markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escaped(String);

impl Escaped {
    #[must_use]
    pub fn text(raw: &str) -> Self {
        Self(escape_html(raw))
    }

    /// Escaped value, or the "N/A" placeholder when missing or blank
    #[must_use]
    pub fn or_placeholder(raw: Option<&str>) -> Self {
        Self::text(raw.filter(|s| !s.trim().is_empty()).unwrap_or(PLACEHOLDER))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Escaped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Departure or arrival side of a flight card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardEndpoint {
    /// Three-letter airport code, best effort
    pub code: Escaped,
    pub label: Escaped,
    pub date: Escaped,
    pub time: Escaped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightCard {
    pub flight_number: Escaped,
    pub airline: Escaped,
    pub departure: CardEndpoint,
    pub arrival: CardEndpoint,
    pub duration: Escaped,
    pub fare_class: Escaped,
    pub aircraft: Escaped,
    pub baggage: Escaped,
    pub booking_ref: Option<Escaped>,
    pub meal: Option<Escaped>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub phone: Escaped,
    pub email: Escaped,
    pub address_lines: Vec<Escaped>,
    pub license_title: Escaped,
    pub license_number: Escaped,
}

/// One node of the document, in render order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Header {
        company_name: Escaped,
        logo_url: Option<Escaped>,
    },
    BookingSummary {
        passenger: Escaped,
        booking_reference: Escaped,
        booking_date: Escaped,
        group_label: Option<Escaped>,
    },
    FlightCard(Box<FlightCard>),
    TicketInfo {
        ticket_number: Escaped,
        passenger: Escaped,
    },
    EnvironmentalNote {
        kg_per_person: Escaped,
    },
    Footer(Footer),
}

/// Composed itinerary, ready to hand to a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredDocument {
    stylesheet: String,
    sections: Vec<Section>,
}

impl StructuredDocument {
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn flight_cards(&self) -> impl Iterator<Item = &FlightCard> {
        self.sections.iter().filter_map(|s| match s {
            Section::FlightCard(card) => Some(card.as_ref()),
            _ => None,
        })
    }

    /// Fully resolved markup
    #[must_use]
    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StructuredDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html>")?;
        writeln!(f, "<head>")?;
        writeln!(f, "<meta charset=\"UTF-8\">")?;
        writeln!(f, "<style>{}</style>", self.stylesheet)?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        writeln!(f, "</body>")?;
        writeln!(f, "</html>")
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header {
                company_name,
                logo_url,
            } => {
                writeln!(f, "<div class=\"company-header\">")?;
                match logo_url {
                    Some(url) => writeln!(
                        f,
                        "<img src=\"{url}\" alt=\"{company_name}\" class=\"company-logo\">"
                    )?,
                    None => writeln!(f, "<h1>{company_name}</h1>")?,
                }
                writeln!(f, "</div>")
            }
            Self::BookingSummary {
                passenger,
                booking_reference,
                booking_date,
                group_label,
            } => {
                writeln!(f, "<div class=\"booking-summary\">")?;
                writeln!(f, "<h2>Flight Booking Confirmation</h2>")?;
                writeln!(f, "<div class=\"passenger-info\">")?;
                info_item(f, "Passenger", passenger)?;
                info_item(f, "Booking Reference", booking_reference)?;
                info_item(f, "Booking Date", booking_date)?;
                writeln!(f, "</div>")?;
                if let Some(group) = group_label {
                    info_item(f, "Group", group)?;
                }
                writeln!(f, "</div>")
            }
            Self::FlightCard(card) => write!(f, "{card}"),
            Self::TicketInfo {
                ticket_number,
                passenger,
            } => {
                writeln!(f, "<div class=\"ticket-info\">")?;
                writeln!(f, "<h3>Ticket Information</h3>")?;
                writeln!(f, "<div><strong>Ticket Number:</strong> {ticket_number}</div>")?;
                writeln!(f, "<div><strong>Passenger:</strong> {passenger}</div>")?;
                writeln!(f, "</div>")
            }
            Self::EnvironmentalNote { kg_per_person } => {
                writeln!(f, "<div class=\"environmental-note\">")?;
                writeln!(
                    f,
                    "<strong>ENVIRONMENTAL IMPACT:</strong> Estimated CO2 emissions: {kg_per_person} kg per person<br>"
                )?;
                writeln!(f, "Source: ICAO Carbon Emissions Calculator")?;
                writeln!(f, "</div>")
            }
            Self::Footer(footer) => write!(f, "{footer}"),
        }
    }
}

fn info_item(f: &mut fmt::Formatter<'_>, label: &str, value: &Escaped) -> fmt::Result {
    writeln!(
        f,
        "<div class=\"info-item\"><div class=\"info-label\">{label}</div><div>{value}</div></div>"
    )
}

fn detail_item(f: &mut fmt::Formatter<'_>, label: &str, value: &Escaped) -> fmt::Result {
    writeln!(
        f,
        "<div class=\"detail-item\"><div class=\"detail-label\">{label}</div><div>{value}</div></div>"
    )
}

impl fmt::Display for CardEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<div class=\"airport-info\">")?;
        writeln!(f, "<div class=\"airport-code\">{}</div>", self.code)?;
        writeln!(f, "<div class=\"airport-name\">{}</div>", self.label)?;
        writeln!(f, "<div class=\"datetime\">{}</div>", self.date)?;
        writeln!(f, "<div class=\"datetime\">{}</div>", self.time)?;
        writeln!(f, "</div>")
    }
}

impl fmt::Display for FlightCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<div class=\"flight-card\">")?;
        writeln!(
            f,
            "<div class=\"flight-header\">Flight {} - {}</div>",
            self.flight_number, self.airline
        )?;
        writeln!(f, "<div class=\"flight-route\">")?;
        write!(f, "{}", self.departure)?;
        writeln!(f, "<div class=\"flight-arrow\">&#8594;</div>")?;
        write!(f, "{}", self.arrival)?;
        writeln!(f, "</div>")?;
        writeln!(f, "<div class=\"flight-details\">")?;
        detail_item(f, "Duration", &self.duration)?;
        detail_item(f, "Class", &self.fare_class)?;
        detail_item(f, "Aircraft", &self.aircraft)?;
        detail_item(f, "Baggage", &self.baggage)?;
        writeln!(f, "</div>")?;
        if let Some(reference) = &self.booking_ref {
            writeln!(
                f,
                "<div class=\"flight-extra\"><strong>Booking Ref:</strong> {reference}</div>"
            )?;
        }
        if let Some(meal) = &self.meal {
            writeln!(f, "<div class=\"flight-extra\"><strong>Meal:</strong> {meal}</div>")?;
        }
        writeln!(f, "</div>")
    }
}

impl fmt::Display for Footer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<div class=\"company-info\">")?;
        writeln!(f, "<div class=\"contact-grid\">")?;
        writeln!(f, "<div>")?;
        writeln!(
            f,
            "<div class=\"contact-item\"><strong>Phone:</strong> {}</div>",
            self.phone
        )?;
        writeln!(
            f,
            "<div class=\"contact-item\"><strong>Email:</strong> {}</div>",
            self.email
        )?;
        writeln!(f, "</div>")?;
        writeln!(f, "<div>")?;
        write!(f, "<div class=\"contact-item\"><strong>Address:</strong>")?;
        for line in &self.address_lines {
            write!(f, "<br>{line}")?;
        }
        writeln!(f, "</div>")?;
        writeln!(f, "</div>")?;
        writeln!(f, "</div>")?;
        writeln!(
            f,
            "<div class=\"license\"><strong>{}</strong><br>{}</div>",
            self.license_title, self.license_number
        )?;
        writeln!(f, "</div>")
    }
}

/// Builds documents from extracted records using a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: ComposerConfig,
}

impl Composer {
    #[must_use]
    pub const fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Compose the document. Header, booking summary and footer are always
    /// present so even an empty extraction renders as a usable page.
    #[must_use]
    pub fn compose(
        &self,
        booking: &BookingRecord,
        flights: &[ValidFlightRecord],
        text: &str,
    ) -> StructuredDocument {
        let branding = &self.config.branding;
        let mut sections = vec![header(branding), booking_summary(booking)];

        sections.extend(
            flights
                .iter()
                .map(|flight| Section::FlightCard(Box::new(flight_card(flight)))),
        );

        if let Some(ticket_number) = booking.ticket_number.as_deref() {
            sections.push(Section::TicketInfo {
                ticket_number: Escaped::text(ticket_number),
                passenger: Escaped::or_placeholder(booking.passenger_name.as_deref()),
            });
        }

        if let Some(caps) = CO2_EMISSIONS.captures(text) {
            sections.push(Section::EnvironmentalNote {
                kg_per_person: Escaped::text(&caps[1]),
            });
        }

        sections.push(Section::Footer(footer(branding)));

        debug!(
            "Composed document with {} sections, {} flight cards",
            sections.len(),
            flights.len()
        );

        StructuredDocument {
            stylesheet: self.config.stylesheet.as_str().to_string(),
            sections,
        }
    }
}

fn header(branding: &Branding) -> Section {
    Section::Header {
        company_name: Escaped::text(&branding.company_name),
        logo_url: branding.logo_url.as_deref().map(Escaped::text),
    }
}

fn booking_summary(booking: &BookingRecord) -> Section {
    Section::BookingSummary {
        passenger: Escaped::or_placeholder(booking.passenger_name.as_deref()),
        booking_reference: Escaped::or_placeholder(booking.booking_reference.as_deref()),
        booking_date: Escaped::or_placeholder(booking.booking_date.as_deref()),
        group_label: booking.group_label.as_deref().map(Escaped::text),
    }
}

fn footer(branding: &Branding) -> Footer {
    Footer {
        phone: Escaped::text(&branding.phone),
        email: Escaped::text(&branding.email),
        address_lines: branding
            .address_lines
            .iter()
            .map(|line| Escaped::text(line))
            .collect(),
        license_title: Escaped::text(&branding.license_title),
        license_number: Escaped::text(&branding.license_number),
    }
}

fn flight_card(flight: &ValidFlightRecord) -> FlightCard {
    let fare_class = flight.fare_class.as_ref().map(ToString::to_string);

    FlightCard {
        flight_number: Escaped::text(flight.flight_number()),
        airline: Escaped::or_placeholder(flight.airline.as_deref()),
        departure: card_endpoint(&flight.departure),
        arrival: card_endpoint(&flight.arrival),
        duration: Escaped::or_placeholder(flight.duration.as_deref()),
        fare_class: Escaped::or_placeholder(fare_class.as_deref()),
        aircraft: Escaped::or_placeholder(flight.aircraft_type.as_deref()),
        baggage: Escaped::or_placeholder(flight.baggage_allowance.as_deref()),
        booking_ref: flight.booking_ref.as_deref().map(Escaped::text),
        meal: flight.meal_service.as_deref().map(Escaped::text),
    }
}

fn card_endpoint(endpoint: &Endpoint) -> CardEndpoint {
    let (code, label) = airport_code(
        endpoint.city.as_deref().unwrap_or_default(),
        endpoint.airport.as_deref(),
    );

    CardEndpoint {
        code: Escaped::text(&code),
        label: Escaped::text(&label),
        date: Escaped::or_placeholder(endpoint.date.as_deref()),
        time: Escaped::or_placeholder(endpoint.time.as_deref()),
    }
}

/// Best-effort three-letter code and a readable label for one endpoint
///
/// An airport field that is itself a code wins. Otherwise the code comes
/// from a bracketed or standalone token in the city, and finally from the
/// first three letters of the city, with the airport name as the label.
#[must_use]
pub fn airport_code(city: &str, airport: Option<&str>) -> (String, String) {
    let city = city.split(',').next().unwrap_or_default().trim();
    let airport = airport.map(str::trim).filter(|a| !a.is_empty());

    if let Some(code) = airport.filter(|a| WHOLE_CODE.is_match(a)) {
        return (code.to_string(), city.to_string());
    }

    let in_city = BRACKETED_CODE
        .captures(city)
        .or_else(|| CODE_TOKEN.captures(city))
        .map(|caps| caps[1].to_string());

    if let Some(code) = in_city {
        let label = city
            .replacen(&code, "", 1)
            .trim_matches(|c: char| c == ' ' || c == '(' || c == ')')
            .to_string();
        let label = if label.is_empty() {
            airport.unwrap_or_default().to_string()
        } else {
            label
        };
        return (code, label);
    }

    let code: String = city.chars().take(3).collect::<String>().to_uppercase();
    let label = airport.unwrap_or(city).to_string();
    (code, label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_airport() {
        assert_eq!(
            airport_code("TOKYO", Some("NRT")),
            ("NRT".to_string(), "TOKYO".to_string())
        );
    }

    #[test]
    fn test_code_from_city() {
        assert_eq!(
            airport_code("OSAKA (KIX)", None),
            ("KIX".to_string(), "OSAKA".to_string())
        );
    }

    #[test]
    fn test_airport_name_is_not_a_code() {
        assert_eq!(
            airport_code("SAPPORO", Some("NEW CHITOSE")),
            ("SAP".to_string(), "NEW CHITOSE".to_string())
        );
        assert_eq!(
            airport_code("NAGOYA", Some("CHUBU CENTRAIR")),
            ("NAG".to_string(), "CHUBU CENTRAIR".to_string())
        );
    }

    #[test]
    fn test_code_fallback() {
        assert_eq!(
            airport_code("Sapporo", Some("New Chitose")),
            ("SAP".to_string(), "New Chitose".to_string())
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_html("<b>A&B</b>"), "&lt;b&gt;A&amp;B&lt;/b&gt;");
    }
}
