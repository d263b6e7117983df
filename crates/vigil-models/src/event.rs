//! Frame events from the external detector feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detection::Detection;

/// One frame's worth of detector output.
///
/// The detector is a black box upstream of the pipeline: each event carries
/// the detections it produced for a frame, an optional JPEG of the frame
/// itself (base64 on the wire), and an optional detector error. A frame
/// whose detector failed still flows through the pipeline so that cooldown
/// windows keep expiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameEvent {
    /// Frame timestamp
    pub timestamp: DateTime<Utc>,
    /// Detections for this frame
    #[serde(default)]
    pub detections: Vec<Detection>,
    /// Frame image as JPEG bytes, base64-encoded on the wire
    #[serde(default, with = "b64_opt", skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    /// Detector error for this frame, if the detector failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FrameEvent {
    /// An event with detections and no frame image.
    pub fn new(timestamp: DateTime<Utc>, detections: Vec<Detection>) -> Self {
        Self {
            timestamp,
            detections,
            image: None,
            error: None,
        }
    }

    /// Attach a frame image.
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// An event standing in for a frame the detector failed on.
    pub fn failed(timestamp: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            timestamp,
            detections: Vec::new(),
            image: None,
            error: Some(error.into()),
        }
    }
}

/// Base64 (de)serialization for optional byte payloads.
mod b64_opt {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => ser.serialize_str(&STANDARD.encode(bytes)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Vec<u8>>, D::Error> {
        let value: Option<String> = Option::deserialize(de)?;
        match value {
            Some(s) => STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    #[test]
    fn test_event_image_roundtrip() {
        let event = FrameEvent::new(
            Utc::now(),
            vec![Detection::new("fire", 0.9, BoundingBox::new(0, 0, 10, 10))],
        )
        .with_image(vec![0xff, 0xd8, 0xff]);

        let json = serde_json::to_string(&event).unwrap();
        let parsed: FrameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.image.as_deref(), Some(&[0xff, 0xd8, 0xff][..]));
        assert_eq!(parsed.detections.len(), 1);
    }

    #[test]
    fn test_event_minimal_wire_form() {
        // Feed lines may omit detections, image and error entirely.
        let parsed: FrameEvent =
            serde_json::from_str(r#"{"timestamp":"2026-01-01T00:00:00Z"}"#).unwrap();
        assert!(parsed.detections.is_empty());
        assert!(parsed.image.is_none());
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_failed_event_has_no_detections() {
        let event = FrameEvent::failed(Utc::now(), "model exploded");
        assert!(event.detections.is_empty());
        assert_eq!(event.error.as_deref(), Some("model exploded"));
    }
}
