// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Where unrecognized bytes go.
//!
//! Anything the classifier doesn't recognize as a directive is, by
//! protocol design, ordinary program output interleaved with the subunit
//! stream. It must still reach somewhere a human can read it.

use std::io::Write;

/// Destination for bytes the protocol doesn't interpret as a directive.
pub trait PassThroughSink {
    fn forward(&mut self, line: &str);
}

/// Drops pass-through output on the floor. The default for callers that
/// only care about structured results.
#[derive(Debug, Default)]
pub struct Discarding;

impl PassThroughSink for Discarding {
    fn forward(&mut self, _line: &str) {}
}

/// Writes pass-through output to an arbitrary [`Write`]r, e.g. the
/// process's own stdout or a log file, so a human still sees ordinary
/// test-runner chatter.
pub struct WriteTo<W: Write> {
    writer: W,
}

impl<W: Write> WriteTo<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PassThroughSink for WriteTo<W> {
    fn forward(&mut self, line: &str) {
        if let Err(err) = self.writer.write_all(line.as_bytes()) {
            tracing::warn!(error = %err, "failed to forward pass-through output");
        }
    }
}

impl<T: PassThroughSink + ?Sized> PassThroughSink for Box<T> {
    fn forward(&mut self, line: &str) {
        (**self).forward(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discarding_accepts_anything() {
        let mut sink = Discarding;
        sink.forward("whatever\n");
    }

    #[test]
    fn write_to_forwards_bytes() {
        let mut sink = WriteTo::new(Vec::new());
        sink.forward("hello\n");
        sink.forward("world\n");
        assert_eq!(sink.into_inner(), b"hello\nworld\n");
    }
}
