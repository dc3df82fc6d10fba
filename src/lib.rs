// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Booking Confirmation Itineraries
//!
//! Pulls airline booking data out of the plain-text body of confirmation
//! emails and turns it into a styled itinerary document, rendered to PDF by
//! an external HTML/CSS engine.
//!
//! # Pipeline
//!
//! - [`decode`]: raw bytes to subject, plain-text and HTML bodies
//! - [`extract()`]: ordered fallback rules to booking and flight drafts
//! - [`validate()`]: keep flights with a complete route and schedule
//! - [`Composer`]: records to a [`StructuredDocument`]
//! - [`Renderer`]: document to a file on disk
//! - [`batch`]: input discovery and output layout for directory runs
//!
//! # Example
//!
//! ```rust
//! use eml_itinerary::{Composer, Converter, HtmlRenderer};
//!
//! let raw = b"Subject: DOE/JOHN 12JAN2024 TYO-LAX\r\n\r\n\
//!             BOOKING REF: AB1234\n\
//!             FLIGHT NH 123 - ANA\n\
//!             DEPARTURE: TOKYO (NRT) 12 JAN 10:00\n\
//!             ARRIVAL: LOS ANGELES (LAX) 12 JAN 22:00\n";
//!
//! let converter = Converter::new(Composer::default(), HtmlRenderer);
//! let document = converter.document_from_bytes(raw).unwrap();
//!
//! assert_eq!(document.flight_cards().count(), 1);
//! println!("{}", document.to_html());
//! ```

pub mod batch;
mod compose;
mod config;
mod convert;
pub mod decode;
mod error;
pub mod extract;
pub mod rules;
mod render;
mod types;
mod validate;

pub use compose::{
    CardEndpoint, Composer, Escaped, FlightCard, Footer, Section, StructuredDocument,
    airport_code, escape_html,
};
pub use config::{Branding, ComposerConfig, Stylesheet};
pub use convert::{BatchReport, Converter, itinerary_from_bytes};
pub use decode::DecodedMessage;
pub use error::{ConfigError, ConvertError, DecodeError, RenderError, Result};
pub use extract::extract;
pub use render::{CommandRenderer, HtmlRenderer, Renderer};
pub use types::*;
pub use validate::validate;
