//! Decoder for the streamed `/birth-chart/roast-placements` body.
//!
//! The body is a sequence of `data: {json}` lines. Each payload is either a
//! single placement roast `{"planet": .., "roast": ..}` or the terminal
//! `{"complete": true, "all_roasts": {..}}`.
//!
//! # Invariants
//! - Lines and UTF-8 sequences split across chunks are reassembled before
//!   parsing.
//! - A malformed line is logged and skipped; it never ends the stream.
//! - A line longer than [`MAX_LINE_BYTES`] is dropped whole.
//! - Once `Complete` is seen, [`RoastProgress`] ignores further events.

use log::warn;
use serde::Deserialize;

use crate::model::PlacementRoasts;

const DATA_PREFIX: &str = "data: ";
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoastEvent {
    Placement { planet: String, roast: String },
    Complete(PlacementRoasts),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    complete: bool,
    #[serde(default)]
    all_roasts: Option<PlacementRoasts>,
    #[serde(default)]
    planet: Option<String>,
    #[serde(default)]
    roast: Option<String>,
}

/// Incremental line decoder; feed it body chunks as they arrive.
#[derive(Debug, Default)]
pub struct RoastStreamDecoder {
    pending: Vec<u8>,
    skipped_lines: usize,
    /// Dropping the tail of an overlong line up to its newline.
    discarding: bool,
}

impl RoastStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one chunk and returns the events completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RoastEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line = self.pending.drain(..=newline).collect::<Vec<_>>();
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if let Some(event) = self.decode_line(&line[..line.len() - 1]) {
                events.push(event);
            }
        }

        if self.pending.len() > MAX_LINE_BYTES {
            if !self.discarding {
                self.skipped_lines += 1;
                warn!(
                    "event=roast_stream module=client status=skip reason=line_too_long max_bytes={}",
                    MAX_LINE_BYTES
                );
            }
            self.pending.clear();
            self.discarding = true;
        }
        events
    }

    /// Flushes a final line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<RoastEvent> {
        let line = std::mem::take(&mut self.pending);
        if std::mem::take(&mut self.discarding) || line.is_empty() {
            return None;
        }
        self.decode_line(&line)
    }

    /// Number of `data:` lines that could not be decoded so far.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<RoastEvent> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(err) => {
                self.skipped_lines += 1;
                warn!("event=roast_stream module=client status=skip reason=invalid_utf8 error={err}");
                return None;
            }
        };
        let payload = line.strip_prefix(DATA_PREFIX)?;

        match serde_json::from_str::<RawEvent>(payload) {
            Ok(raw_event) => {
                let event = into_event(raw_event);
                if event.is_none() {
                    self.skipped_lines += 1;
                    warn!("event=roast_stream module=client status=skip reason=unrecognized_payload");
                }
                event
            }
            Err(err) => {
                self.skipped_lines += 1;
                warn!("event=roast_stream module=client status=skip reason=invalid_json error={err}");
                None
            }
        }
    }
}

fn into_event(raw: RawEvent) -> Option<RoastEvent> {
    if raw.complete {
        return Some(RoastEvent::Complete(raw.all_roasts.unwrap_or_default()));
    }
    match (raw.planet, raw.roast) {
        (Some(planet), Some(roast)) if !planet.is_empty() && !roast.is_empty() => {
            Some(RoastEvent::Placement { planet, roast })
        }
        _ => None,
    }
}

/// Per-planet roasts accumulated from stream events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoastProgress {
    roasts: PlacementRoasts,
    complete: bool,
}

impl RoastProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event; returns `false` when it was ignored because the
    /// stream already completed.
    pub fn apply(&mut self, event: RoastEvent) -> bool {
        if self.complete {
            return false;
        }
        match event {
            RoastEvent::Placement { planet, roast } => {
                self.roasts.insert(planet, roast);
            }
            RoastEvent::Complete(all_roasts) => {
                self.roasts = all_roasts;
                self.complete = true;
            }
        }
        true
    }

    pub fn roasts(&self) -> &PlacementRoasts {
        &self.roasts
    }

    pub fn into_roasts(self) -> PlacementRoasts {
        self.roasts
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

#[cfg(test)]
mod tests {
    use super::{RoastEvent, RoastProgress, RoastStreamDecoder, MAX_LINE_BYTES};

    fn placement(planet: &str, roast: &str) -> RoastEvent {
        RoastEvent::Placement {
            planet: planet.to_string(),
            roast: roast.to_string(),
        }
    }

    #[test]
    fn decodes_placements_and_completion() {
        let mut decoder = RoastStreamDecoder::new();
        let events = decoder.feed(
            concat!(
                "data: {\"planet\": \"Sun\", \"roast\": \"Bright, loud.\"}\n\n",
                "data: {\"complete\": true, \"all_roasts\": {\"Sun\": \"Bright, loud.\"}}\n\n",
            )
            .as_bytes(),
        );

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], placement("Sun", "Bright, loud."));
        match &events[1] {
            RoastEvent::Complete(all) => assert_eq!(all["Sun"], "Bright, loud."),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn reassembles_lines_split_across_chunks() {
        let body = "data: {\"planet\": \"Moon\", \"roast\": \"Moody.\"}\r\n".as_bytes();
        let mut decoder = RoastStreamDecoder::new();

        assert!(decoder.feed(&body[..10]).is_empty());
        assert!(decoder.feed(&body[10..31]).is_empty());
        assert_eq!(decoder.feed(&body[31..]), vec![placement("Moon", "Moody.")]);
    }

    #[test]
    fn reassembles_multibyte_characters_split_across_chunks() {
        let body = "data: {\"planet\": \"Venus\", \"roast\": \"Любовь\"}\n".as_bytes();
        let split = body.iter().position(|byte| *byte >= 0x80).unwrap() + 1;
        let mut decoder = RoastStreamDecoder::new();

        assert!(decoder.feed(&body[..split]).is_empty());
        assert_eq!(decoder.feed(&body[split..]), vec![placement("Venus", "Любовь")]);
        assert_eq!(decoder.skipped_lines(), 0);
    }

    #[test]
    fn malformed_lines_are_skipped_without_stopping() {
        let mut decoder = RoastStreamDecoder::new();
        let events = decoder.feed(
            concat!(
                ": keep-alive\n",
                "data: {not json}\n",
                "data: {\"planet\": \"Mars\"}\n",
                "data: {\"planet\": \"\", \"roast\": \"orphan\"}\n",
                "data: {\"planet\": \"Mars\", \"roast\": \"Picks fights.\"}\n",
            )
            .as_bytes(),
        );

        assert_eq!(events, vec![placement("Mars", "Picks fights.")]);
        assert_eq!(decoder.skipped_lines(), 3);
    }

    #[test]
    fn overlong_line_is_dropped_and_decoding_resumes() {
        let mut decoder = RoastStreamDecoder::new();
        let filler = vec![b'x'; MAX_LINE_BYTES / 2 + 1];

        assert!(decoder.feed(b"data: {\"planet\": \"Sun\", \"roast\": \"").is_empty());
        assert!(decoder.feed(&filler).is_empty());
        assert!(decoder.feed(&filler).is_empty());
        assert!(decoder.feed(&filler).is_empty());
        assert_eq!(decoder.skipped_lines(), 1);

        let events = decoder.feed(
            b"\"}\ndata: {\"planet\": \"Moon\", \"roast\": \"Moody.\"}\n",
        );
        assert_eq!(events, vec![placement("Moon", "Moody.")]);
        assert_eq!(decoder.skipped_lines(), 1);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn finish_flushes_unterminated_last_line() {
        let mut decoder = RoastStreamDecoder::new();
        assert!(decoder
            .feed(b"data: {\"complete\": true, \"all_roasts\": {}}")
            .is_empty());
        assert_eq!(decoder.finish(), Some(RoastEvent::Complete(Default::default())));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn progress_accumulates_then_finalizes_on_completion() {
        let mut progress = RoastProgress::new();
        assert!(progress.apply(placement("Sun", "first")));
        assert!(progress.apply(placement("Moon", "second")));
        assert!(progress.apply(placement("Sun", "revised")));
        assert_eq!(progress.roasts().len(), 2);
        assert_eq!(progress.roasts()["Sun"], "revised");
        assert!(!progress.is_complete());

        let mut final_map = progress.roasts().clone();
        final_map.insert("overall_synthesis".to_string(), "A mess.".to_string());
        assert!(progress.apply(RoastEvent::Complete(final_map.clone())));
        assert!(progress.is_complete());

        assert!(!progress.apply(placement("Pluto", "late")));
        assert_eq!(progress.into_roasts(), final_map);
    }
}
