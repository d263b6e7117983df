//! Detection normalization.

use vigil_models::Detection;

/// Collapse raw detections into the frame's active label set.
///
/// Returns the distinct labels whose confidence is strictly greater than
/// `threshold`, in the order they first appear in `detections`. Order is
/// what later drives alert description text.
pub fn active_labels(detections: &[Detection], threshold: f64) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for det in detections {
        if det.confidence > threshold && !labels.iter().any(|l| l == &det.label) {
            labels.push(det.label.clone());
        }
    }
    labels
}
