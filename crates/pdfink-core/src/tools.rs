//! Drawing tools.

use crate::stroke::StrokeKind;
use serde::{Deserialize, Serialize};

/// Tool selected in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pen,
    Highlighter,
    Eraser,
}

impl ToolKind {
    /// Get display name for this tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Highlighter => "Highlighter",
            ToolKind::Eraser => "Eraser",
        }
    }

    /// Lowercase identifier, the inverse of [`ToolKind::from_id`].
    pub fn id(self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Highlighter => "highlighter",
            ToolKind::Eraser => "eraser",
        }
    }

    /// Parse a tool from its lowercase identifier (`pen`, `highlighter`, `eraser`).
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "pen" => Some(ToolKind::Pen),
            "highlighter" => Some(ToolKind::Highlighter),
            "eraser" => Some(ToolKind::Eraser),
            _ => None,
        }
    }

    /// Combine with a brush size into a concrete tool.
    pub fn with_size(self, size: f64) -> Tool {
        match self {
            ToolKind::Pen => Tool::Pen { width: size },
            ToolKind::Highlighter => Tool::Highlighter { width: size },
            ToolKind::Eraser => Tool::Eraser { radius: size },
        }
    }
}

/// A tool together with its size parameter.
///
/// Pen and highlighter produce strokes; the eraser only removes them and
/// never ends up in the annotation store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Tool {
    Pen { width: f64 },
    Highlighter { width: f64 },
    Eraser { radius: f64 },
}

impl Tool {
    /// Stroke kind and width this tool paints with, if it paints at all.
    pub fn paint(&self) -> Option<(StrokeKind, f64)> {
        match *self {
            Tool::Pen { width } => Some((StrokeKind::Pen, width)),
            Tool::Highlighter { width } => Some((StrokeKind::Highlighter, width)),
            Tool::Eraser { .. } => None,
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Pen { .. } => ToolKind::Pen,
            Tool::Highlighter { .. } => ToolKind::Highlighter,
            Tool::Eraser { .. } => ToolKind::Eraser,
        }
    }
}
