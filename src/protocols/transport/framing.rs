// SPDX-License-Identifier: GPL-3.0-only
//! Splits a byte stream into lines on CR or LF

/// Longest line kept while waiting for a delimiter
const MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed received bytes and return every line they complete
    ///
    /// Empty lines (e.g. the LF of a CRLF pair) are skipped.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &byte in bytes {
            match byte {
                b'\r' | b'\n' => {
                    if !self.buf.is_empty() {
                        lines.push(String::from_utf8_lossy(&self.buf).into_owned());
                        self.buf.clear();
                    }
                }
                _ => {
                    if self.buf.len() >= MAX_LINE_LEN {
                        warn!("Discarding {} bytes without a line delimiter", self.buf.len());
                        self.buf.clear();
                    }
                    self.buf.push(byte);
                }
            }
        }

        lines
    }

    /// Bytes held back waiting for a delimiter
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
