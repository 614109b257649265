//! Tagged event sub-stream attached to each tick.
//!
//! Block layout: `u32 eventDeltaNanos`, then tagged records until a zero tag.
//! Record times are signed nanosecond offsets from the running event time.

use super::cursor::ByteCursor;
use super::schema::{MarkerPhase, MarkerRow};
use crate::aggregator::thread::ThreadModel;
use crate::utils::config::NANOS_PER_MILLI;
use crate::utils::error::DecodeError;

pub const TAG_END: u32 = 0;
pub const TAG_GC: u32 = 1;
pub const TAG_GAME_STATE: u32 = 0x10001;
pub const TAG_GAME_TICK: u32 = 0x10002;

/// Human label for a game state code, if it is a known one
pub fn game_state_label(code: u32) -> Option<&'static str> {
    Some(match code {
        10 => "Login screen",
        11 => "Login screen authenticator",
        20 => "Logging in",
        25 => "Loading",
        30 => "Logged in",
        40 => "Connection lost",
        50 => "Hopping",
        _ => return None,
    })
}

/// Decoder state carried across ticks
#[derive(Debug, Clone, Default)]
pub struct MarkerDecoder {
    event_time_ms: f64,
}

impl MarkerDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_time_ms(&self) -> f64 {
        self.event_time_ms
    }

    /// Decode one tick's marker block into `thread`
    ///
    /// **Public** - called once per tick by the sample stream decoder
    ///
    /// # Returns
    /// Number of markers appended
    ///
    /// # Errors
    /// * `DecodeError::UnknownMarkerTag` - a tag outside the known set
    /// * `DecodeError::TruncatedInput` - the block runs off the section
    pub fn decode_tick(
        &mut self,
        cursor: &mut ByteCursor<'_>,
        thread: &mut ThreadModel,
    ) -> Result<usize, DecodeError> {
        self.event_time_ms += cursor.u32()? as f64 / NANOS_PER_MILLI;

        let mut count = 0;
        loop {
            let tag_offset = cursor.offset();
            let row = match cursor.u32()? {
                TAG_END => break,
                TAG_GC => {
                    let start_time = self.read_time(cursor)?;
                    let end_time = self.read_time(cursor)?;
                    MarkerRow {
                        name: thread.intern_string("GC"),
                        start_time,
                        end_time: Some(end_time),
                        phase: MarkerPhase::Interval,
                        category: 0,
                    }
                }
                TAG_GAME_STATE => {
                    let start_time = self.read_time(cursor)?;
                    let code = cursor.u32()?;
                    let name = match game_state_label(code) {
                        Some(label) => format!("Game State {}", label),
                        None => format!("Game State {}", code),
                    };
                    instant(thread.intern_string(&name), start_time)
                }
                TAG_GAME_TICK => {
                    let start_time = self.read_time(cursor)?;
                    instant(thread.intern_string("GameTick"), start_time)
                }
                tag => {
                    return Err(DecodeError::UnknownMarkerTag {
                        tag,
                        offset: tag_offset,
                    })
                }
            };
            thread.push_marker(row);
            count += 1;
        }

        Ok(count)
    }

    fn read_time(&self, cursor: &mut ByteCursor<'_>) -> Result<f64, DecodeError> {
        Ok(self.event_time_ms + cursor.i32()? as f64 / NANOS_PER_MILLI)
    }
}

fn instant(name: usize, start_time: f64) -> MarkerRow {
    MarkerRow {
        name,
        start_time,
        end_time: None,
        phase: MarkerPhase::Instant,
        category: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::cursor::ByteOrder;

    fn words(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_empty_block() {
        let bytes = words(&[2_000_000, TAG_END, 0xDEAD]);
        let mut cursor = ByteCursor::new(&bytes, ByteOrder::Little);
        let mut thread = ThreadModel::new("Client");
        let mut decoder = MarkerDecoder::new();

        assert_eq!(decoder.decode_tick(&mut cursor, &mut thread).unwrap(), 0);
        assert_eq!(decoder.event_time_ms(), 2.0);
        // the word after the terminator is left for the next reader
        assert_eq!(cursor.offset(), 8);
        assert_eq!(cursor.u32().unwrap(), 0xDEAD);
    }

    #[test]
    fn test_gc_interval() {
        let bytes = words(&[
            10_000_000,
            TAG_GC,
            (-1_000_000i32) as u32,
            3_000_000,
            TAG_END,
        ]);
        let mut cursor = ByteCursor::new(&bytes, ByteOrder::Little);
        let mut thread = ThreadModel::new("Client");
        let mut decoder = MarkerDecoder::new();

        decoder.decode_tick(&mut cursor, &mut thread).unwrap();

        let row = thread.markers.row(0).unwrap();
        assert_eq!(thread.strings.get(row.name), Some("GC"));
        assert_eq!(row.start_time, 9.0);
        assert_eq!(row.end_time, Some(13.0));
        assert_eq!(row.phase, MarkerPhase::Interval);
    }

    #[test]
    fn test_game_state_labels() {
        let bytes = words(&[
            0,
            TAG_GAME_STATE,
            500_000,
            30,
            TAG_GAME_STATE,
            0,
            77,
            TAG_GAME_TICK,
            0,
            TAG_END,
        ]);
        let mut cursor = ByteCursor::new(&bytes, ByteOrder::Little);
        let mut thread = ThreadModel::new("Client");
        let mut decoder = MarkerDecoder::new();

        assert_eq!(decoder.decode_tick(&mut cursor, &mut thread).unwrap(), 3);

        let names: Vec<_> = (0..3)
            .map(|i| {
                let row = thread.markers.row(i).unwrap();
                thread.strings.get(row.name).unwrap().to_string()
            })
            .collect();
        assert_eq!(names, vec!["Game State Logged in", "Game State 77", "GameTick"]);
        assert_eq!(thread.markers.row(0).unwrap().start_time, 0.5);
        assert_eq!(thread.markers.row(0).unwrap().end_time, None);
        assert_eq!(thread.markers.row(2).unwrap().phase, MarkerPhase::Instant);
    }

    #[test]
    fn test_event_time_accumulates_across_ticks() {
        let bytes = words(&[1_000_000, TAG_END, 1_000_000, TAG_GAME_TICK, 250_000, TAG_END]);
        let mut cursor = ByteCursor::new(&bytes, ByteOrder::Little);
        let mut thread = ThreadModel::new("Client");
        let mut decoder = MarkerDecoder::new();

        decoder.decode_tick(&mut cursor, &mut thread).unwrap();
        decoder.decode_tick(&mut cursor, &mut thread).unwrap();

        assert_eq!(thread.markers.row(0).unwrap().start_time, 2.25);
    }

    #[test]
    fn test_unknown_tag() {
        let bytes = words(&[0, 0x42]);
        let mut cursor = ByteCursor::new(&bytes, ByteOrder::Little);
        let mut thread = ThreadModel::new("Client");
        let mut decoder = MarkerDecoder::new();

        match decoder.decode_tick(&mut cursor, &mut thread) {
            Err(DecodeError::UnknownMarkerTag { tag, offset }) => {
                assert_eq!(tag, 0x42);
                assert_eq!(offset, 4);
            }
            other => panic!("expected unknown tag, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_terminator_is_truncated() {
        let bytes = words(&[0, TAG_GAME_TICK, 0]);
        let mut cursor = ByteCursor::new(&bytes, ByteOrder::Little);
        let mut thread = ThreadModel::new("Client");
        let mut decoder = MarkerDecoder::new();

        assert!(matches!(
            decoder.decode_tick(&mut cursor, &mut thread),
            Err(DecodeError::TruncatedInput { .. })
        ));
    }
}
