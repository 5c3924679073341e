//! Streamed chat events and the frame decoder that produces them
//!
//! The chat endpoint answers with newline-delimited records of the form
//! `data: {json}\n`. Chunks off the wire are arbitrary byte slices with no
//! alignment to record boundaries, so [`FrameDecoder`] carries undelimited
//! bytes between calls and only decodes complete lines.

use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

use crate::error;

/// Events emitted by the chat endpoint during a streamed reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Server acknowledged the turn and may reassign the session id
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },
    /// A fragment of the assistant reply
    Content {
        #[serde(default)]
        content: String,
    },
    /// Reply finished
    End,
    /// Producer-side failure
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Event kind this client does not know about; ignored for forward
    /// compatibility
    #[serde(other)]
    Unknown,
}

impl ChatEvent {
    /// Check if this event ends the turn (End or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::End | ChatEvent::Error { .. })
    }
}

/// A stream of chat events; `Err` items are transport failures, which are
/// distinct from a clean end of the stream and from [`ChatEvent::Error`]
pub type ChatEventStream = Pin<Box<dyn Stream<Item = error::Result<ChatEvent>> + Send>>;

/// Outcome of decoding one complete record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A well-formed event
    Event(ChatEvent),
    /// A `data:` record whose payload did not parse; reported, not fatal
    Warning { payload: String, reason: String },
    /// A line that is not a data record (keep-alives, blanks, comments)
    Skip,
}

/// The literal prefix marking a data record, including the trailing space.
const DATA_PREFIX: &str = "data: ";

/// Incremental decoder turning raw byte chunks into [`Decoded`] records.
///
/// The carry buffer holds bytes, not text: a `\n` byte never occurs inside a
/// multi-byte UTF-8 sequence, so splitting on the delimiter before decoding
/// keeps characters split across chunk boundaries intact.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    carry: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning the outcome of every record it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Decoded> {
        self.carry.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.carry.drain(..=pos).collect();
            out.push(decode_line(&line[..line.len() - 1]));
        }
        out
    }

    /// Consume the decoder at end-of-stream, returning how many carried
    /// bytes were discarded.
    ///
    /// A legitimately terminated stream ends its last record with the
    /// delimiter, so leftover carry is a truncated record and is never
    /// flushed as one.
    pub fn finish(self) -> usize {
        self.carry.len()
    }
}

fn decode_line(line: &[u8]) -> Decoded {
    let text = String::from_utf8_lossy(line);
    let text = text.strip_suffix('\r').unwrap_or(&text);

    let Some(payload) = text.strip_prefix(DATA_PREFIX) else {
        return Decoded::Skip;
    };

    match serde_json::from_str::<ChatEvent>(payload) {
        Ok(event) => Decoded::Event(event),
        Err(_) if payload.trim().is_empty() => Decoded::Skip,
        Err(e) => Decoded::Warning {
            payload: payload.to_string(),
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(chunks: &[&str]) -> Vec<Decoded> {
        let mut decoder = FrameDecoder::new();
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(decoder.feed(chunk.as_bytes()));
        }
        out
    }

    fn events(decoded: Vec<Decoded>) -> Vec<ChatEvent> {
        decoded
            .into_iter()
            .filter_map(|d| match d {
                Decoded::Event(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_chunk_content() {
        let out = feed_all(&["data: {\"type\":\"content\",\"content\":\"Hello\"}\n"]);
        assert_eq!(
            events(out),
            vec![ChatEvent::Content {
                content: "Hello".into()
            }]
        );
    }

    #[test]
    fn test_record_split_across_chunks() {
        // The exact split from the wire: prefix and payload sliced mid-token
        let out = feed_all(&[
            "data: {\"typ",
            "e\":\"content\",\"content\":\"Hel",
            "lo\"}\n",
        ]);
        assert_eq!(
            events(out),
            vec![ChatEvent::Content {
                content: "Hello".into()
            }]
        );
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let line = "data: {\"type\":\"content\",\"content\":\"你好\"}\n".as_bytes();
        // Split inside the second byte of 你 (a 3-byte sequence)
        let split = line.iter().position(|&b| b >= 0x80).unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        let mut out = decoder.feed(&line[..split]);
        out.extend(decoder.feed(&line[split..]));
        assert_eq!(
            events(out),
            vec![ChatEvent::Content {
                content: "你好".into()
            }]
        );
    }

    #[test]
    fn test_byte_at_a_time_equals_one_chunk() {
        let input =
            "data: {\"type\":\"start\",\"session_id\":\"s1\"}\ndata: {\"type\":\"content\",\"content\":\"héllo\"}\ndata: {\"type\":\"end\"}\n";

        let whole = events(feed_all(&[input]));

        let mut decoder = FrameDecoder::new();
        let mut trickled = Vec::new();
        for byte in input.as_bytes() {
            trickled.extend(decoder.feed(std::slice::from_ref(byte)));
        }
        assert_eq!(whole, events(trickled));
        assert_eq!(whole.len(), 3);
    }

    #[test]
    fn test_multiple_records_in_one_chunk() {
        let out = feed_all(&[
            "data: {\"type\":\"content\",\"content\":\"A\"}\ndata: {\"type\":\"content\",\"content\":\"B\"}\ndata: {\"type\":\"end\"}\n",
        ]);
        assert_eq!(
            events(out),
            vec![
                ChatEvent::Content { content: "A".into() },
                ChatEvent::Content { content: "B".into() },
                ChatEvent::End,
            ]
        );
    }

    #[test]
    fn test_non_data_lines_are_skipped() {
        let out = feed_all(&[": keep-alive\n\nevent: ping\n"]);
        assert_eq!(out, vec![Decoded::Skip, Decoded::Skip, Decoded::Skip]);
    }

    #[test]
    fn test_prefix_requires_the_space() {
        let out = feed_all(&["data:{\"type\":\"end\"}\n"]);
        assert_eq!(out, vec![Decoded::Skip]);
    }

    #[test]
    fn test_unparseable_payload_warns_and_continues() {
        let out = feed_all(&["data: not json at all\ndata: {\"type\":\"end\"}\n"]);
        assert!(matches!(out[0], Decoded::Warning { .. }));
        assert_eq!(out[1], Decoded::Event(ChatEvent::End));
    }

    #[test]
    fn test_blank_payload_is_skipped_not_warned() {
        let out = feed_all(&["data: \ndata:  \n"]);
        assert_eq!(out, vec![Decoded::Skip, Decoded::Skip]);
    }

    #[test]
    fn test_crlf_delimited_records() {
        let out = feed_all(&["data: {\"type\":\"end\"}\r\n"]);
        assert_eq!(events(out), vec![ChatEvent::End]);
    }

    #[test]
    fn test_unknown_event_kind_decodes_to_unknown() {
        let out = feed_all(&["data: {\"type\":\"usage\",\"tokens\":12}\n"]);
        assert_eq!(events(out), vec![ChatEvent::Unknown]);
    }

    #[test]
    fn test_start_without_session_id() {
        let out = feed_all(&["data: {\"type\":\"start\"}\n"]);
        assert_eq!(events(out), vec![ChatEvent::Start { session_id: None }]);
    }

    #[test]
    fn test_error_event_with_and_without_message() {
        let out = feed_all(&[
            "data: {\"type\":\"error\",\"message\":\"boom\"}\ndata: {\"type\":\"error\"}\n",
        ]);
        assert_eq!(
            events(out),
            vec![
                ChatEvent::Error {
                    message: Some("boom".into())
                },
                ChatEvent::Error { message: None },
            ]
        );
    }

    #[test]
    fn test_trailing_carry_is_discarded_at_finish() {
        let mut decoder = FrameDecoder::new();
        let out = decoder.feed(b"data: {\"type\":\"end\"}\ndata: {\"type\":\"content\"");
        assert_eq!(events(out), vec![ChatEvent::End]);
        assert!(decoder.finish() > 0);
    }

    #[test]
    fn test_clean_stream_finishes_empty() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(b"data: {\"type\":\"end\"}\n");
        assert_eq!(decoder.finish(), 0);
    }

    #[test]
    fn test_terminal_classification() {
        assert!(ChatEvent::End.is_terminal());
        assert!(ChatEvent::Error { message: None }.is_terminal());
        assert!(!ChatEvent::Start { session_id: None }.is_terminal());
        assert!(!ChatEvent::Content { content: "x".into() }.is_terminal());
        assert!(!ChatEvent::Unknown.is_terminal());
    }
}
