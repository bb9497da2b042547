//! View state: page, zoom and tool selection.

use crate::tools::{Tool, ToolKind};
use serde::{Deserialize, Serialize};

/// Zoom level shown as "100%".
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Lowest zoom reachable with zoom out.
pub const MIN_ZOOM: f64 = 0.5;
/// Amount one zoom in/out press changes the scale by.
pub const ZOOM_STEP: f64 = 0.25;
/// Brush size before the user touches the size slider.
pub const DEFAULT_BRUSH_WIDTH: f64 = 1.0;

/// Transient view state of the editor.
///
/// Owned by a single controller and never persisted. Zoom has a floor but
/// no ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Current page (1-based).
    pub page: u32,
    /// Current zoom scale.
    pub scale: f64,
    /// Currently selected tool.
    pub tool: ToolKind,
    /// Brush width for pen/highlighter, radius for the eraser (page units).
    pub brush_width: f64,
    pub min_zoom: f64,
    pub zoom_step: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 1,
            scale: DEFAULT_ZOOM,
            tool: ToolKind::default(),
            brush_width: DEFAULT_BRUSH_WIDTH,
            min_zoom: MIN_ZOOM,
            zoom_step: ZOOM_STEP,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected tool combined with the current brush width.
    pub fn active_tool(&self) -> Tool {
        self.tool.with_size(self.brush_width)
    }

    pub fn zoom_in(&mut self) {
        self.scale += self.zoom_step;
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - self.zoom_step).max(self.min_zoom);
    }

    /// Go to the previous page. Returns false if already on the first one.
    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Go to the next page. Returns false if already on the last one.
    pub fn next_page(&mut self, page_count: u32) -> bool {
        if self.page >= page_count {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    /// Set the brush width. Non-positive and non-finite values are ignored.
    pub fn set_brush_width(&mut self, width: f64) -> bool {
        if !width.is_finite() || width <= 0.0 {
            return false;
        }
        self.brush_width = width;
        true
    }

    /// Go back to the first page, keeping zoom and tool.
    pub fn reset_page(&mut self) {
        self.page = 1;
    }
}
