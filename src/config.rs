//! Document configuration: company branding and stylesheet

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Company contact block shown in the header and footer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub company_name: String,
    pub logo_url: Option<String>,
    pub phone: String,
    pub email: String,
    pub address_lines: Vec<String>,
    pub license_title: String,
    pub license_number: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company_name: "Trip to Japan".into(),
            logo_url: Some("https://www.triptojapan.com/logo.svg".into()),
            phone: "+81 03-4578-2152".into(),
            email: "info@triptojapan.com".into(),
            address_lines: vec![
                "Takanawa Travel K.K.,".into(),
                "Kitashinagawa 5-11-1".into(),
                "Shinagawa, Tokyo, Japan".into(),
            ],
            license_title: "Certified Travel License".into(),
            license_number: "Tokyo Metropolitan Government Office: No.3-8367".into(),
        }
    }
}

impl Branding {
    /// Load branding from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// CSS embedded in every document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet(String);

impl Stylesheet {
    pub fn new(css: impl Into<String>) -> Self {
        Self(css.into())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        std::fs::read_to_string(path)
            .map(Self)
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self(DEFAULT_CSS.to_string())
    }
}

/// Everything the composer needs besides the extracted data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerConfig {
    pub branding: Branding,
    pub stylesheet: Stylesheet,
}

const DEFAULT_CSS: &str = r"
@page { size: A4; margin: 20mm; }
body {
    font-family: 'Helvetica Now', 'Helvetica Neue', 'Helvetica', 'Arial', sans-serif;
    margin: 0;
    line-height: 1.4;
    color: #000;
    font-size: 11px;
}
.company-header { text-align: center; margin-bottom: 15px; padding-bottom: 10px; }
.company-logo { max-height: 60px; margin-bottom: 10px; }
.company-info { padding: 10px 0; margin-top: 20px; font-size: 9px; line-height: 1.3; text-align: center; }
.company-info .contact-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 10px; }
.company-info .contact-item { margin-bottom: 3px; }
.company-info .license { margin-top: 8px; font-size: 8px; }
.booking-summary { border: 2px solid #000; padding: 15px; margin-bottom: 20px; }
.booking-summary h2 { margin: 0 0 10px 0; font-size: 16px; font-weight: bold; text-transform: uppercase; }
.passenger-info { display: grid; grid-template-columns: 1fr 1fr 1fr; gap: 15px; margin-bottom: 10px; }
.info-item { font-size: 11px; }
.info-label { font-weight: bold; }
.flight-card { border: 2px solid #000; margin-bottom: 15px; overflow: hidden; }
.flight-header {
    background-color: #000;
    color: #fff;
    padding: 10px 15px;
    font-weight: bold;
    font-size: 12px;
    text-transform: uppercase;
}
.flight-route { display: grid; grid-template-columns: 1fr auto 1fr; align-items: center; padding: 15px; gap: 20px; }
.airport-info { text-align: center; }
.airport-code { font-size: 20px; font-weight: bold; }
.airport-name { font-size: 9px; margin-top: 2px; }
.datetime { font-size: 10px; font-weight: bold; margin-top: 5px; }
.flight-arrow { text-align: center; font-size: 16px; font-weight: bold; }
.flight-details {
    border-top: 1px solid #000;
    padding: 10px 15px;
    display: grid;
    grid-template-columns: repeat(4, 1fr);
    gap: 10px;
    font-size: 9px;
}
.flight-extra { padding: 10px 15px; font-size: 9px; border-top: 1px solid #000; }
.detail-item { text-align: center; }
.detail-label { font-weight: bold; margin-bottom: 2px; }
.ticket-info { border: 1px solid #000; padding: 10px; margin-top: 15px; font-size: 10px; }
.ticket-info h3 { margin: 0 0 8px 0; font-size: 11px; font-weight: bold; }
.environmental-note { border: 1px solid #000; padding: 10px; margin-top: 15px; font-size: 9px; text-align: center; }
";
