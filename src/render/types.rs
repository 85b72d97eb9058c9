//! Public types and constants for the render module.

use serde::{Deserialize, Serialize};

/// Screen corner an overlay control is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl OverlayPosition {
    pub fn is_top(self) -> bool {
        matches!(self, OverlayPosition::TopLeft | OverlayPosition::TopRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, OverlayPosition::TopLeft | OverlayPosition::BottomLeft)
    }

    /// Leaflet control position name (`"bottomright"`, ...).
    pub fn control_name(self) -> &'static str {
        match self {
            OverlayPosition::TopLeft => "topleft",
            OverlayPosition::TopRight => "topright",
            OverlayPosition::BottomLeft => "bottomleft",
            OverlayPosition::BottomRight => "bottomright",
        }
    }
}

/// Legends sit in the bottom-right corner unless configured otherwise.
pub const DEFAULT_LEGEND_POSITION: OverlayPosition = OverlayPosition::BottomRight;
