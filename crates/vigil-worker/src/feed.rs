//! Detection event feed.
//!
//! The external detector is consumed as a stream of NDJSON frame events,
//! one per line. A malformed line never aborts the feed: it becomes a
//! frame with zero detections so the pipeline's cooldowns keep ticking.

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

use vigil_models::FrameEvent;

use crate::error::WorkerResult;

/// NDJSON frame-event reader.
pub struct DetectionFeed<R> {
    lines: tokio::io::Lines<R>,
}

impl DetectionFeed<BufReader<Stdin>> {
    /// Feed reading from stdin.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> DetectionFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Read the next frame event.
    ///
    /// Returns `Ok(None)` at end of stream. Blank lines are skipped; a
    /// line that fails to parse yields a detector-failed event.
    pub async fn next_event(&mut self) -> WorkerResult<Option<FrameEvent>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<FrameEvent>(line) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => {
                    warn!("Malformed feed line, treating as empty frame: {}", e);
                    return Ok(Some(FrameEvent::failed(Utc::now(), e.to_string())));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(input: &'static str) -> DetectionFeed<BufReader<&'static [u8]>> {
        DetectionFeed::new(BufReader::new(input.as_bytes()))
    }

    #[tokio::test]
    async fn test_reads_events_in_order() {
        let mut feed = feed(
            "{\"timestamp\":\"2026-01-01T00:00:00Z\",\"detections\":[{\"label\":\"fire\",\"confidence\":0.9,\"box\":{\"x1\":0,\"y1\":0,\"x2\":10,\"y2\":10}}]}\n\
             \n\
             {\"timestamp\":\"2026-01-01T00:00:01Z\"}\n",
        );

        let first = feed.next_event().await.unwrap().unwrap();
        assert_eq!(first.detections.len(), 1);
        assert_eq!(first.detections[0].label, "fire");

        let second = feed.next_event().await.unwrap().unwrap();
        assert!(second.detections.is_empty());

        assert!(feed.next_event().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_line_becomes_failed_frame() {
        let mut feed = feed("this is not json\n{\"timestamp\":\"2026-01-01T00:00:01Z\"}\n");

        let bad = feed.next_event().await.unwrap().unwrap();
        assert!(bad.error.is_some());
        assert!(bad.detections.is_empty());

        // the feed keeps going
        let good = feed.next_event().await.unwrap().unwrap();
        assert!(good.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_input_ends_immediately() {
        let mut feed = feed("");
        assert!(feed.next_event().await.unwrap().is_none());
    }
}
