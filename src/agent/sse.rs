use crate::error::ChatResult;
use futures::{Stream, StreamExt, stream};
use serde::Deserialize;

const DATA_PREFIX: &str = "data: ";

/// What one decoded chunk contributed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedChunk {
    /// Token text extracted from this chunk only.
    pub text: String,
    /// Message of an `event: error` frame completed in this chunk.
    pub server_error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamEvent {
    Token(String),
    ServerError(String),
}

#[derive(Deserialize)]
struct Frame {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
}

/// Incremental decoder for the agent's `text/event-stream` body.
///
/// Holds partial UTF-8 sequences and partial lines between chunks, so a
/// frame split anywhere decodes the same as the frame delivered whole.
/// One decoder per response.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending_bytes: Vec<u8>,
    pending_line: String,
    event: Option<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> DecodedChunk {
        self.pending_bytes.extend_from_slice(chunk);
        let text = self.take_utf8();
        self.pending_line.push_str(&text);

        let mut out = DecodedChunk::default();
        while let Some(pos) = self.pending_line.find('\n') {
            let mut line: String = self.pending_line.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            self.process_line(&line, &mut out);
        }
        out
    }

    /// Flush whatever is still buffered once the body has ended.
    pub fn finish(&mut self) -> DecodedChunk {
        let mut out = DecodedChunk::default();
        if !self.pending_bytes.is_empty() {
            let tail = String::from_utf8_lossy(&self.pending_bytes).into_owned();
            self.pending_bytes.clear();
            self.pending_line.push_str(&tail);
        }
        let line = std::mem::take(&mut self.pending_line);
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if !line.is_empty() {
            self.process_line(line, &mut out);
        }
        self.event = None;
        out
    }

    /// Decode the longest valid UTF-8 prefix, keeping an incomplete
    /// trailing sequence for the next chunk. Invalid bytes become U+FFFD.
    fn take_utf8(&mut self) -> String {
        let mut decoded = String::new();
        loop {
            match std::str::from_utf8(&self.pending_bytes) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    self.pending_bytes.clear();
                    return decoded;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    decoded.push_str(&String::from_utf8_lossy(
                        &self.pending_bytes[..valid_up_to],
                    ));
                    match err.error_len() {
                        Some(bad) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            self.pending_bytes.drain(..valid_up_to + bad);
                        }
                        None => {
                            self.pending_bytes.drain(..valid_up_to);
                            return decoded;
                        }
                    }
                }
            }
        }
    }

    fn process_line(&mut self, line: &str, out: &mut DecodedChunk) {
        if line.is_empty() {
            self.event = None;
            return;
        }

        if let Some(name) = line.strip_prefix("event:") {
            self.event = Some(name.trim().to_string());
            return;
        }

        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return;
        };

        if self.event.as_deref() == Some("error") {
            tracing::warn!(reason = payload, "agent stream reported an error");
            out.server_error = Some(payload.to_string());
            return;
        }

        match serde_json::from_str::<Frame>(payload) {
            Ok(Frame {
                kind: Some(kind),
                text: Some(text),
            }) if kind == "token" => out.text.push_str(&text),
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(line, error = %err, "skipping malformed SSE line");
            }
        }
    }
}

impl DecodedChunk {
    fn into_events(self) -> Vec<ChatResult<StreamEvent>> {
        let mut events = Vec::new();
        if !self.text.is_empty() {
            events.push(Ok(StreamEvent::Token(self.text)));
        }
        if let Some(message) = self.server_error {
            events.push(Ok(StreamEvent::ServerError(message)));
        }
        events
    }
}

/// Adapt a response body into a lazy sequence of stream events.
///
/// Malformed frames never show up here; only transport errors of the
/// underlying byte stream are forwarded as `Err`.
pub fn decode_stream<S>(body: S) -> impl Stream<Item = ChatResult<StreamEvent>>
where
    S: Stream<Item = ChatResult<Vec<u8>>> + Unpin,
{
    stream::unfold(
        (body, SseDecoder::new(), false),
        |(mut body, mut decoder, finished)| async move {
            if finished {
                return None;
            }
            let (items, finished) = match body.next().await {
                Some(Ok(bytes)) => (decoder.decode(&bytes).into_events(), false),
                Some(Err(err)) => (vec![Err(err)], true),
                None => (decoder.finish().into_events(), true),
            };
            Some((stream::iter(items), (body, decoder, finished)))
        },
    )
    .flatten()
}
