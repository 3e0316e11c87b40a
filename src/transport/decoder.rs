// src/transport/decoder.rs — Incremental `data:` record decoder
//
// Bytes arrive in arbitrary pieces. A record ends at a blank line; only
// complete records are yielded. Whatever is left when the body ends is
// dropped, never acted on.

use crate::infra::errors::BulkOpsError;

const DATA_MARKER: &str = "data:";

/// Line-oriented framing. Lines end in `\n`, `\r\n` or a lone `\r`; an
/// empty line closes the record.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// The line being read.
    line: Vec<u8>,
    /// Completed lines of the current record, each followed by `\n`.
    record: Vec<u8>,
    /// The previous byte was `\r`, so a `\n` right after it is part of the
    /// same line ending, even across a chunk boundary.
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every record it completed, in order.
    ///
    /// A record that is not valid UTF-8 comes back as an `Err` in its slot;
    /// decoding carries on with the next record.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<String, BulkOpsError>> {
        let mut records = Vec::new();

        for &byte in chunk {
            if std::mem::take(&mut self.after_cr) && byte == b'\n' {
                continue;
            }
            match byte {
                b'\r' => {
                    self.after_cr = true;
                    self.end_line(&mut records);
                }
                b'\n' => self.end_line(&mut records),
                _ => self.line.push(byte),
            }
        }

        records
    }

    /// End of stream. Returns the number of unterminated bytes discarded.
    pub fn finish(&mut self) -> usize {
        let dropped = self.record.len() + self.line.len();
        if dropped > 0 {
            tracing::debug!("discarding {dropped} bytes of unterminated trailing record");
        }
        self.record.clear();
        self.line.clear();
        self.after_cr = false;
        dropped
    }

    fn end_line(&mut self, records: &mut Vec<Result<String, BulkOpsError>>) {
        if !self.line.is_empty() {
            self.record.append(&mut self.line);
            self.record.push(b'\n');
            return;
        }
        if self.record.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.record);
        if let Some(record) = decode_record(&raw) {
            records.push(record);
        }
    }
}

/// Extract the payload from one record. `None` when it has no data lines
/// (comments, `event:`-only records, keep-alives).
fn decode_record(raw: &[u8]) -> Option<Result<String, BulkOpsError>> {
    let text = match std::str::from_utf8(raw) {
        Ok(t) => t,
        Err(e) => {
            return Some(Err(BulkOpsError::RecordDecode {
                message: format!("invalid UTF-8 in record: {e}"),
            }))
        }
    };

    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix(DATA_MARKER))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();

    if data.is_empty() {
        None
    } else {
        Some(Ok(data.join("\n")))
    }
}
