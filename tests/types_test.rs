use eml_itinerary::*;

fn complete_flight() -> FlightRecord {
    FlightRecord {
        flight_number: Some("NH 106".into()),
        airline: Some("ALL NIPPON AIRWAYS".into()),
        departure: Endpoint {
            city: Some("TOKYO".into()),
            airport: Some("NRT".into()),
            date: Some("12 JAN".into()),
            time: Some("10:00".into()),
        },
        arrival: Endpoint {
            city: Some("LOS ANGELES".into()),
            airport: Some("LAX".into()),
            date: Some("12 JAN".into()),
            time: Some("04:05".into()),
        },
        ..FlightRecord::default()
    }
}

// --- ValidFlightRecord ---

#[test]
fn test_valid_flight_accepts_complete() {
    let valid = ValidFlightRecord::new(complete_flight()).unwrap();
    assert_eq!(valid.flight_number(), "NH 106");
    assert_eq!(valid.record(), &complete_flight());
}

#[test]
fn test_valid_flight_requires_each_field() {
    let strip: [fn(&mut FlightRecord); 5] = [
        |f| f.flight_number = None,
        |f| f.departure.city = None,
        |f| f.arrival.city = None,
        |f| f.departure.date = None,
        |f| f.arrival.date = None,
    ];
    for (idx, remove) in strip.iter().enumerate() {
        let mut flight = complete_flight();
        remove(&mut flight);
        assert!(
            ValidFlightRecord::new(flight).is_none(),
            "field {idx} should be required"
        );
    }
}

#[test]
fn test_valid_flight_rejects_blank() {
    let mut flight = complete_flight();
    flight.arrival.date = Some("   ".into());
    assert!(ValidFlightRecord::new(flight).is_none());
}

#[test]
fn test_valid_flight_optional_fields() {
    let mut flight = complete_flight();
    flight.departure.time = None;
    flight.airline = None;
    assert!(ValidFlightRecord::new(flight).is_some());
}

// --- validate ---

#[test]
fn test_validate_keeps_order() {
    let mut second = complete_flight();
    second.flight_number = Some("NH 5".into());
    let mut broken = complete_flight();
    broken.departure.date = None;
    let mut third = complete_flight();
    third.flight_number = Some("JL 61".into());

    let valid = validate(vec![complete_flight(), broken, second, third]);
    let numbers: Vec<&str> = valid.iter().map(ValidFlightRecord::flight_number).collect();
    assert_eq!(numbers, ["NH 106", "NH 5", "JL 61"]);
}

#[test]
fn test_validate_empty() {
    assert!(validate(Vec::new()).is_empty());
}

// --- FlightRecord ---

#[test]
fn test_worth_keeping() {
    assert!(complete_flight().is_worth_keeping());

    let number_only = FlightRecord {
        flight_number: Some("NH 1".into()),
        ..FlightRecord::default()
    };
    assert!(number_only.is_worth_keeping());

    let one_city = FlightRecord {
        departure: Endpoint {
            city: Some("TOKYO".into()),
            ..Endpoint::default()
        },
        ..FlightRecord::default()
    };
    assert!(!one_city.is_worth_keeping());
}

// --- Fare class ---

#[test]
fn test_cabin_parse() {
    assert_eq!(Cabin::parse("economy"), Some(Cabin::Economy));
    assert_eq!(Cabin::parse("BUSINESS"), Some(Cabin::Business));
    assert_eq!(Cabin::parse(" First "), Some(Cabin::First));
    assert_eq!(Cabin::parse("PREMIUM"), None);
}

#[test]
fn test_fare_class_display() {
    let with_code = FareClass {
        cabin: Cabin::Economy,
        booking_code: Some("Y".into()),
    };
    assert_eq!(with_code.to_string(), "Economy (Y)");

    let plain = FareClass {
        cabin: Cabin::First,
        booking_code: None,
    };
    assert_eq!(plain.to_string(), "First");
}

// --- BookingRecord ---

#[test]
fn test_booking_is_empty() {
    assert!(BookingRecord::default().is_empty());
    let booking = BookingRecord {
        ticket_number: Some("1234567890".into()),
        ..BookingRecord::default()
    };
    assert!(!booking.is_empty());
}

// --- Itinerary ---

#[test]
fn test_itinerary_serializes_flat_flights() {
    let itinerary = Itinerary {
        booking: BookingRecord {
            booking_reference: Some("AB1234".into()),
            ..BookingRecord::default()
        },
        flights: validate(vec![complete_flight()]),
    };

    let json = serde_json::to_value(&itinerary).unwrap();
    assert_eq!(json["booking"]["booking_reference"], "AB1234");
    assert_eq!(json["flights"][0]["flight_number"], "NH 106");
    assert_eq!(json["flights"][0]["departure"]["airport"], "NRT");
}

// --- Branding ---

#[test]
fn test_branding_default_contact() {
    let branding = Branding::default();
    assert_eq!(branding.email, "info@triptojapan.com");
    assert_eq!(branding.address_lines.len(), 3);
}

#[test]
fn test_branding_partial_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("branding.json");
    std::fs::write(&path, r#"{"company_name": "Acme Travel", "logo_url": null}"#).unwrap();

    let branding = Branding::from_json_file(&path).unwrap();
    assert_eq!(branding.company_name, "Acme Travel");
    assert!(branding.logo_url.is_none());
    assert_eq!(branding.phone, Branding::default().phone);
}

#[test]
fn test_branding_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("branding.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        Branding::from_json_file(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_branding_missing_file() {
    assert!(matches!(
        Branding::from_json_file(std::path::Path::new("/nonexistent/branding.json")),
        Err(ConfigError::Read { .. })
    ));
}
