use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X coordinate of the top-left corner
    pub x1: i32,
    /// Y coordinate of the top-left corner
    pub y1: i32,
    /// X coordinate of the bottom-right corner
    pub x2: i32,
    /// Y coordinate of the bottom-right corner
    pub y2: i32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Check that the box has positive area.
    pub fn is_valid(&self) -> bool {
        self.x2 > self.x1 && self.y2 > self.y1
    }
}

/// A single object detection reported by the detector for one frame.
///
/// Ephemeral: produced per frame and never retained past the frame that
/// carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label (e.g. "fire", "smoke")
    pub label: String,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    /// Location of the detection in the frame
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl Detection {
    /// Create a new detection.
    pub fn new(label: impl Into<String>, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}
