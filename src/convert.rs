//! Per-file conversion pipeline: decode, extract, validate, compose, render

use crate::compose::{Composer, StructuredDocument};
use crate::decode::decode;
use crate::error::{ConvertError, DecodeError};
use crate::extract::extract;
use crate::render::Renderer;
use crate::types::Itinerary;
use crate::validate::validate;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Destination files written, in input order
    pub converted: Vec<PathBuf>,

    /// Inputs that failed, with their error
    pub failed: Vec<ConvertError>,
}

impl BatchReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    /// At least one file was converted
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.converted.is_empty()
    }
}

/// Extract the itinerary from raw email bytes.
/// Also returns the scanned text, which the composer searches for extras.
pub fn itinerary_from_bytes(raw: &[u8]) -> Result<(Itinerary, String), DecodeError> {
    let message = decode(raw)?;
    let text = message.best_text();

    let (booking, drafts) = extract(&text, &message.subject);
    let flights = validate(drafts);

    Ok((Itinerary { booking, flights }, text))
}

/// Runs the whole pipeline with one composer and one rendering backend
#[derive(Debug, Clone, Default)]
pub struct Converter<R> {
    composer: Composer,
    renderer: R,
}

impl<R: Renderer> Converter<R> {
    pub const fn new(composer: Composer, renderer: R) -> Self {
        Self { composer, renderer }
    }

    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Compose the document for raw email bytes without rendering it
    pub fn document_from_bytes(&self, raw: &[u8]) -> Result<StructuredDocument, DecodeError> {
        let (itinerary, text) = itinerary_from_bytes(raw)?;
        Ok(self
            .composer
            .compose(&itinerary.booking, &itinerary.flights, &text))
    }

    /// Convert one email file into `destination`
    pub fn convert_file(&self, input: &Path, destination: &Path) -> Result<PathBuf, ConvertError> {
        // The handle is closed before any further stage runs
        let raw = std::fs::read(input).map_err(|source| ConvertError::Read {
            path: input.to_path_buf(),
            source,
        })?;

        let document = self
            .document_from_bytes(&raw)
            .map_err(|source| ConvertError::Decode {
                path: input.to_path_buf(),
                source,
            })?;

        let written = self
            .renderer
            .render(&document, destination)
            .map_err(|source| ConvertError::Render {
                path: input.to_path_buf(),
                source,
            })?;

        info!("Converted {} -> {}", input.display(), written.display());
        Ok(written)
    }

    /// Convert each input in turn. A failure is logged and recorded, and the
    /// remaining inputs are still processed.
    pub fn convert_batch<I, F>(&self, inputs: I, destination_for: F) -> BatchReport
    where
        I: IntoIterator<Item = PathBuf>,
        F: Fn(&Path) -> PathBuf,
    {
        let mut report = BatchReport::default();

        for input in inputs {
            let destination = destination_for(&input);
            match self.convert_file(&input, &destination) {
                Ok(path) => report.converted.push(path),
                Err(e) => {
                    warn!("{e}");
                    report.failed.push(e);
                }
            }
        }

        info!(
            "Batch finished: {} converted, {} failed",
            report.converted.len(),
            report.failed.len()
        );
        report
    }
}
