// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Accumulates raw bytes into complete, newline-terminated lines.
//!
//! Splitting on `\n` is always a safe place to cut a UTF-8 byte stream: `\n`
//! (0x0A) never appears as a continuation byte of a multi-byte sequence, so
//! each slice handed to `on_line` is a complete, independently valid UTF-8
//! string whenever the input is.

use std::io::{self, Read};

/// Buffers partial lines across calls to [`LineReader::feed`].
#[derive(Debug, Default)]
pub struct LineReader {
    buffer: Vec<u8>,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of bytes, invoking `on_line` once per complete line
    /// (including its trailing `\n`) found across this call and any
    /// buffered remainder from previous calls. A non-UTF-8 line is dropped
    /// silently rather than handed to the classifier mangled.
    pub fn feed(&mut self, bytes: &[u8], mut on_line: impl FnMut(&str)) {
        self.buffer.extend_from_slice(bytes);
        let mut start = 0;
        while let Some(pos) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos + 1;
            if let Ok(line) = std::str::from_utf8(&self.buffer[start..end]) {
                on_line(line);
            }
            start = end;
        }
        self.buffer.drain(..start);
    }

    /// Whether bytes remain buffered without yet completing a line.
    pub fn has_partial_tail(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Discards any undelivered partial tail. Per the line reader's
    /// end-of-stream contract, an unterminated tail is never handed to the
    /// classifier — it's dropped here instead.
    pub fn discard_partial_tail(&mut self) {
        self.buffer.clear();
    }

    /// Reads from `source` until EOF, invoking `on_line` for each complete
    /// line. Returns whether a partial tail was discarded at end-of-stream,
    /// which callers typically pair with a synthesized connection loss.
    pub fn read_from(
        &mut self,
        mut source: impl Read,
        mut on_line: impl FnMut(&str),
    ) -> io::Result<bool> {
        let mut chunk = [0u8; 8192];
        loop {
            let n = source.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            self.feed(&chunk[..n], &mut on_line);
        }
        let had_tail = self.has_partial_tail();
        self.discard_partial_tail();
        Ok(had_tail)
    }
}
