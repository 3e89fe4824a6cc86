//! SSE 帧解码：`data:` 负载即 `GlobalEnvelope` JSON

use crate::kernel::event::GlobalEnvelope;

/// Incremental decoder for the server's global event stream.
///
/// Bytes are buffered until a blank line closes a frame, so chunks may split
/// frames (and UTF-8 sequences) anywhere.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<GlobalEnvelope> {
        self.buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));
        let mut envelopes = Vec::new();

        while let Some(split) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..split + 2).collect();
            let frame = String::from_utf8_lossy(&frame[..split]);

            let Some(payload) = extract_data_payload(&frame) else {
                continue;
            };
            match serde_json::from_str::<GlobalEnvelope>(&payload) {
                Ok(envelope) => envelopes.push(envelope),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed event frame");
                }
            }
        }

        envelopes
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|pair| pair == b"\n\n")
}

/// Joined `data:` lines of one frame; comments and heartbeats yield `None`.
fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/event_stream.rs"]
mod tests;
