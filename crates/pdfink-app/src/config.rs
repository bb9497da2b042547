//! Session configuration.

use pdfink_core::view::{DEFAULT_BRUSH_WIDTH, DEFAULT_ZOOM, MIN_ZOOM, ZOOM_STEP};
use pdfink_render::EXPORT_FILE_NAME;
use serde::{Deserialize, Serialize};

/// MIME type of files the session accepts.
pub const PDF_MIME: &str = "application/pdf";

/// Tunables of a [`Session`](crate::Session).
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub zoom_step: f64,
    pub brush_width: f64,
    pub export_file_name: String,
    pub accepted_mime: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            zoom_step: ZOOM_STEP,
            brush_width: DEFAULT_BRUSH_WIDTH,
            export_file_name: EXPORT_FILE_NAME.to_string(),
            accepted_mime: PDF_MIME.to_string(),
        }
    }
}

impl SessionConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
