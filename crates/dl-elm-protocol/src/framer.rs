//! Reassembles notification fragments into prompt-terminated line batches.
//!
//! ELM327 adapters terminate lines with bare `\r` and print `>` once a
//! response is complete. BLE notifications can split a response at any byte
//! boundary, so fragments accumulate until the prompt shows up.

use crate::commands::PROMPT;

/// Accumulates text fragments and emits one batch of lines per prompt.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded fragment; returns the completed batch once the
    /// buffer contains the prompt, clearing the buffer.
    ///
    /// The prompt and the run of carriage returns immediately before it are
    /// stripped, the remainder splits on `\r`, and each line is trimmed. A
    /// batch can hold zero, one, or many lines, empty ones included — the
    /// adapter prints blank lines ahead of the prompt.
    pub fn push(&mut self, fragment: &str) -> Option<Vec<String>> {
        self.buf.push_str(fragment);

        let prompt = self.buf.find(PROMPT)?;
        let mut lead = prompt;
        while lead > 0 && self.buf.as_bytes()[lead - 1] == b'\r' {
            lead -= 1;
        }

        let mut rest = String::with_capacity(self.buf.len());
        rest.push_str(&self.buf[..lead]);
        rest.push_str(&self.buf[prompt + 1..]);
        self.buf.clear();

        Some(rest.split('\r').map(|line| line.trim().to_string()).collect())
    }

    /// Text accumulated since the last emitted batch.
    pub fn pending(&self) -> &str {
        &self.buf
    }
}
