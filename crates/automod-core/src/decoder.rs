//! Streamed completion decoding
//!
//! Turns raw chunks of a streamed chat-completion body into text fragments.
//! Two wire framings are accepted, chunk by chunk:
//! ```text
//! {"choices":[{"delta":{"content":"Safety: "}}]}
//! data: {"choices":[{"delta":{"content":"Unsafe"}}]}
//! data: [DONE]
//! ```
//! A chunk that fits neither framing is skipped; it never aborts the stream.

use serde::Deserialize;
use tracing::debug;

/// End-of-stream sentinel used by event-stream backends
const DONE_SENTINEL: &str = "[DONE]";

/// Event-stream field prefix
const DATA_PREFIX: &str = "data:";

/// One chunk after framing has been recognized
#[derive(Debug, Clone)]
pub enum Frame {
    /// The whole chunk was one JSON object
    Json(CompletionChunk),

    /// A `data:`-framed event carrying a JSON object
    Event(CompletionChunk),

    /// The `[DONE]` sentinel
    Done,

    /// Nothing to decode (empty chunk, blank line, empty `data:` field)
    Empty,

    /// Neither framing matched
    Malformed(String),
}

impl Frame {
    /// Recognize the framing of a single chunk
    pub fn parse(chunk: &str) -> Self {
        if chunk.is_empty() {
            return Self::Empty;
        }

        if let Ok(parsed) = serde_json::from_str::<CompletionChunk>(chunk) {
            return Self::Json(parsed);
        }

        let trimmed = chunk.trim();
        let payload = trimmed
            .strip_prefix(DATA_PREFIX)
            .map(str::trim)
            .unwrap_or(trimmed);

        if payload.is_empty() {
            return Self::Empty;
        }
        if payload == DONE_SENTINEL {
            return Self::Done;
        }

        match serde_json::from_str::<CompletionChunk>(payload) {
            Ok(parsed) => Self::Event(parsed),
            Err(e) => Self::Malformed(e.to_string()),
        }
    }

    /// Content delta carried by this frame, if any
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Json(chunk) | Self::Event(chunk) => chunk.content(),
            Self::Done | Self::Empty | Self::Malformed(_) => None,
        }
    }
}

/// The subset of a chat-completion stream chunk automod reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

impl CompletionChunk {
    /// `choices[0].delta.content`, when present and non-empty
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.as_ref())
            .and_then(|delta| delta.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Decodes body chunks of a streamed completion into ordered text fragments.
///
/// The decoder holds no state between chunks; every chunk is framed and
/// decoded on its own. Stream termination is left to the transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamDecoder;

impl StreamDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode one chunk into zero or one fragments
    pub fn decode(&self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }

        let text = match std::str::from_utf8(chunk) {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "Skipping chunk with invalid UTF-8");
                return Vec::new();
            }
        };

        let frame = Frame::parse(text);
        if let Frame::Malformed(reason) = &frame {
            debug!(%reason, chunk = %text, "Skipping unparseable chunk");
        }

        frame.content().map(str::to_owned).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn delta(content: &str) -> String {
        serde_json::json!({ "choices": [{ "delta": { "content": content } }] }).to_string()
    }

    #[test]
    fn test_bare_json_chunk() {
        let decoder = StreamDecoder::new();
        let chunk = r#"{"choices":[{"delta":{"content":"Safety: Safe"}}]}"#;
        assert_eq!(decoder.decode(chunk.as_bytes()), vec!["Safety: Safe"]);
    }

    #[test]
    fn test_event_stream_matches_bare_json() {
        let decoder = StreamDecoder::new();
        let bare = r#"{"choices":[{"delta":{"content":"Safety: Safe"}}]}"#;
        let framed = format!("data: {}", bare);

        assert_eq!(
            decoder.decode(framed.as_bytes()),
            decoder.decode(bare.as_bytes())
        );
    }

    #[test]
    fn test_data_prefix_without_space_and_trailing_newline() {
        let decoder = StreamDecoder::new();
        let framed = format!("data:{}\r\n", delta("hi"));
        assert_eq!(decoder.decode(framed.as_bytes()), vec!["hi"]);
    }

    #[test]
    fn test_done_sentinel_is_skipped() {
        let decoder = StreamDecoder::new();
        assert!(matches!(Frame::parse("data: [DONE]"), Frame::Done));
        assert!(decoder.decode(b"data: [DONE]").is_empty());
    }

    #[test]
    fn test_blank_and_empty_chunks() {
        let decoder = StreamDecoder::new();
        assert!(decoder.decode(b"").is_empty());
        assert!(decoder.decode(b"\n").is_empty());
        assert!(decoder.decode(b"data:   ").is_empty());
        assert!(matches!(Frame::parse("  data:  "), Frame::Empty));
    }

    #[test]
    fn test_missing_or_empty_content() {
        let decoder = StreamDecoder::new();
        assert!(decoder.decode(br#"{"choices":[]}"#).is_empty());
        assert!(decoder.decode(br#"{"choices":[{"delta":{}}]}"#).is_empty());
        assert!(decoder.decode(br#"{"choices":[{"delta":{"content":""}}]}"#).is_empty());
        assert!(decoder.decode(br#"{"choices":[{"delta":{"role":"assistant"}}]}"#).is_empty());
        assert!(decoder.decode(br#"{"id":"chatcmpl-1"}"#).is_empty());
    }

    #[test]
    fn test_only_first_choice_is_read() {
        let decoder = StreamDecoder::new();
        let chunk = r#"{"choices":[{"delta":{"content":"a"}},{"delta":{"content":"b"}}]}"#;
        assert_eq!(decoder.decode(chunk.as_bytes()), vec!["a"]);
    }

    #[test]
    fn test_malformed_chunk_does_not_abort() {
        let decoder = StreamDecoder::new();
        let chunks: Vec<Vec<u8>> = vec![
            delta("Safety: ").into_bytes(),
            b"data: {not json".to_vec(),
            vec![0xff, 0xfe, 0x00],
            delta("Unsafe").into_bytes(),
        ];

        let text: String = chunks.iter().flat_map(|c| decoder.decode(c)).collect();
        assert_eq!(text, "Safety: Unsafe");
        assert!(matches!(Frame::parse("data: {not json"), Frame::Malformed(_)));
    }

    proptest! {
        #[test]
        fn prop_fragments_concatenate_in_order(
            contents in proptest::collection::vec("[a-zA-Z0-9 :\\n\"]{1,12}", 1..16),
            framed in proptest::collection::vec(any::<bool>(), 16),
            noise in proptest::collection::vec(any::<bool>(), 16),
        ) {
            let decoder = StreamDecoder::new();
            let mut decoded = String::new();

            for (i, content) in contents.iter().enumerate() {
                if noise[i] {
                    let garbage = decoder.decode(b"data: garbage {");
                    prop_assert!(garbage.is_empty());
                }
                let chunk = if framed[i] {
                    format!("data: {}", delta(content))
                } else {
                    delta(content)
                };
                for fragment in decoder.decode(chunk.as_bytes()) {
                    decoded.push_str(&fragment);
                }
            }

            prop_assert_eq!(decoded, contents.concat());
        }
    }
}
