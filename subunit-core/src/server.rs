// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The protocol state machine.
//!
//! A [`Server`] is fed one line at a time (push mode,
//! [`Server::line_received`]), fed raw un-aligned bytes ([`Server::feed`]),
//! or handed a [`std::io::Read`] to drive itself ([`Server::read_from`]).
//! It holds no locks and expects a single caller on a single thread: subunit
//! is a point-to-point child-to-parent stream, not a fan-in broadcast, so
//! there's nothing here worth sharing across threads.

use std::io::{self, Read, Write};

use crate::classifier::{classify, Token};
use crate::line_reader::LineReader;
use crate::passthrough::{Discarding, PassThroughSink};
use crate::progress;
use crate::sink::Sink;
use crate::tags;
use crate::time;
use crate::types::{Outcome, ProtocolState, RemoteError, TestId};

/// Drives a [`Sink`] from a stream of subunit lines, forwarding anything it
/// doesn't recognize to a [`PassThroughSink`].
///
/// Two independent side channels exist alongside the sink: `passthrough`,
/// which only ever sees lines the classifier didn't recognize as a
/// directive, and an optional `forward` stream, which sees every raw input
/// line regardless of how it was interpreted. Prefer
/// [`Server::builder`] over the constructors below when both are needed at
/// once.
pub struct Server<'a, P: PassThroughSink = Discarding> {
    sink: Sink<'a>,
    passthrough: P,
    forward: Option<Box<dyn Write + 'a>>,
    state: ProtocolState,
    line_reader: LineReader,
}

impl<'a> Server<'a, Discarding> {
    /// A server whose pass-through output is silently dropped.
    pub fn new(sink: Sink<'a>) -> Self {
        ServerBuilder::new(sink).build()
    }

    /// A server that drops pass-through output but tees every raw input
    /// line, directive or not, to `writer`.
    pub fn with_forward(sink: Sink<'a>, writer: impl Write + 'a) -> Self {
        ServerBuilder::new(sink).forward_stream(writer).build()
    }
}

impl<'a, P: PassThroughSink> Server<'a, P> {
    /// A server with a caller-supplied pass-through sink.
    pub fn with_passthrough(sink: Sink<'a>, passthrough: P) -> Self {
        ServerBuilder::new(sink).passthrough(passthrough).build()
    }

    /// The current protocol state, mostly useful for tests and diagnostics.
    pub fn state(&self) -> &ProtocolState {
        &self.state
    }

    /// Feeds raw bytes, which need not be line-aligned; complete lines are
    /// reassembled internally and dispatched one at a time. The push-mode
    /// counterpart to [`Server::read_from`] for callers driving the server
    /// from a non-blocking source.
    pub fn feed(&mut self, bytes: &[u8]) {
        let mut line_reader = std::mem::take(&mut self.line_reader);
        line_reader.feed(bytes, |line| self.line_received(line));
        self.line_reader = line_reader;
    }

    /// Feeds one line, which must include its trailing `\n` (the one
    /// exception being a final, newline-less line at end of stream, which
    /// is always treated as pass-through and never as a directive — see
    /// [`classify`]).
    pub fn line_received(&mut self, line: &str) {
        if let Some(forward) = &mut self.forward {
            if let Err(err) = forward.write_all(line.as_bytes()) {
                tracing::warn!(error = %err, "failed to write to forward stream");
            }
        }

        if let ProtocolState::ReadingDetail {
            outcome,
            current,
            mut buffer,
        } = std::mem::replace(&mut self.state, ProtocolState::Outside)
        {
            if line == "]\n" {
                self.finish_outcome(outcome, current, buffer);
            } else if let Some(escaped) = line.strip_prefix(' ') {
                if escaped == "]\n" {
                    buffer.push_str("]\n");
                } else {
                    buffer.push_str(line);
                }
                self.state = ProtocolState::ReadingDetail {
                    outcome,
                    current,
                    buffer,
                };
            } else {
                buffer.push_str(line);
                self.state = ProtocolState::ReadingDetail {
                    outcome,
                    current,
                    buffer,
                };
            }
            return;
        }

        match classify(line) {
            Token::StartTest { name } => self.handle_start_test(name, line),
            Token::Outcome {
                outcome,
                name,
                detail,
            } => self.handle_outcome(outcome, name, detail, line),
            Token::Progress { operand } => match progress::decode_progress(operand) {
                Some(value) => self.sink.progress(value),
                None => {
                    tracing::warn!(operand, "malformed progress operand, forwarding");
                    self.passthrough.forward(line);
                }
            },
            Token::Tags { operand } => {
                let delta = tags::decode_tags(operand);
                self.sink.tags(&delta);
            }
            Token::Time { operand } => match time::decode_time(operand) {
                Ok(value) => self.sink.time(value),
                Err(err) => {
                    tracing::warn!(%err, "malformed time operand, forwarding");
                    self.passthrough.forward(line);
                }
            },
            Token::DetailTerminator | Token::PassThrough { .. } => {
                self.passthrough.forward(line);
            }
        }
    }

    fn handle_start_test(&mut self, name: &str, raw_line: &str) {
        let Ok(id) = TestId::new(name) else {
            self.passthrough.forward(raw_line);
            return;
        };
        match &self.state {
            ProtocolState::InTest { .. } => {
                // A second `test` line before a terminal outcome just
                // renames the test in flight; the sink never learns of the
                // abandoned one.
                self.passthrough.forward(raw_line);
                self.state = ProtocolState::InTest { current: id };
            }
            _ => {
                self.sink.start_test(&id);
                self.state = ProtocolState::InTest { current: id };
            }
        }
    }

    fn handle_outcome(&mut self, outcome: Outcome, name: &str, detail: bool, raw_line: &str) {
        let names_current_test = match &self.state {
            ProtocolState::InTest { current } => current.as_str() == name,
            _ => false,
        };
        if !names_current_test {
            // No test is open, or this outcome names some other test than
            // the one in flight: nothing to close out, so it's just noise
            // to forward.
            self.passthrough.forward(raw_line);
            return;
        }
        let Ok(id) = TestId::new(name) else {
            self.passthrough.forward(raw_line);
            return;
        };
        if detail {
            self.state = ProtocolState::ReadingDetail {
                outcome,
                current: id,
                buffer: String::new(),
            };
        } else {
            self.finish_outcome(outcome, id, String::new());
        }
    }

    fn finish_outcome(&mut self, outcome: Outcome, id: TestId, buffer: String) {
        match outcome {
            Outcome::Success => self.sink.add_success(&id),
            Outcome::Failure => self.sink.add_failure(&id, &RemoteError(buffer)),
            Outcome::Error => self.sink.add_error(&id, &RemoteError(buffer)),
            Outcome::Skip => {
                let reason = if buffer.is_empty() {
                    "No reason given".to_string()
                } else {
                    buffer
                };
                self.sink.add_skip(&id, &reason);
            }
            Outcome::ExpectedFailure => {
                self.sink.add_expected_failure(&id, &RemoteError(buffer))
            }
        }
        self.sink.stop_test(&id);
        self.state = ProtocolState::Outside;
    }

    /// Synthesizes the error report a vanished child process never sent.
    /// A no-op when no test is currently open.
    pub fn lost_connection(&mut self) {
        match std::mem::replace(&mut self.state, ProtocolState::Outside) {
            ProtocolState::Outside => {}
            ProtocolState::InTest { current } => {
                let message = format!("lost connection during test '{current}'");
                self.sink.add_error(&current, &RemoteError(message));
                self.sink.stop_test(&current);
            }
            ProtocolState::ReadingDetail {
                outcome, current, ..
            } => {
                let message = format!(
                    "lost connection during {} report of test '{current}'",
                    outcome.keyword()
                );
                self.sink.add_error(&current, &RemoteError(message));
                self.sink.stop_test(&current);
            }
        }
    }

    /// Drives the server from a reader until EOF via the [`LineReader`]
    /// component, then synthesizes a [`Server::lost_connection`] if the
    /// stream ended mid-test. A final, unterminated partial line is
    /// discarded rather than misread as a directive.
    pub fn read_from(&mut self, reader: impl Read) -> io::Result<()> {
        let mut line_reader = std::mem::take(&mut self.line_reader);
        let result = line_reader.read_from(reader, |line| self.line_received(line));
        self.line_reader = line_reader;
        result?;
        if !matches!(self.state, ProtocolState::Outside) {
            self.lost_connection();
        }
        Ok(())
    }
}

/// Builds a [`Server`] from its constructor options: a required sink, an
/// optional pass-through destination (default: [`Discarding`]), and an
/// optional forward stream — independent of pass-through — that tees every
/// raw input line verbatim.
pub struct ServerBuilder<'a, P: PassThroughSink = Discarding> {
    sink: Sink<'a>,
    passthrough: P,
    forward: Option<Box<dyn Write + 'a>>,
}

impl<'a> ServerBuilder<'a, Discarding> {
    pub fn new(sink: Sink<'a>) -> Self {
        Self {
            sink,
            passthrough: Discarding,
            forward: None,
        }
    }
}

impl<'a, P: PassThroughSink> ServerBuilder<'a, P> {
    /// Swaps in a caller-supplied pass-through destination.
    pub fn passthrough<P2: PassThroughSink>(self, passthrough: P2) -> ServerBuilder<'a, P2> {
        ServerBuilder {
            sink: self.sink,
            passthrough,
            forward: self.forward,
        }
    }

    /// Configures the independent forward stream: every raw input line,
    /// directive or not, consumed or not, is written here too.
    pub fn forward_stream(mut self, writer: impl Write + 'a) -> Self {
        self.forward = Some(Box::new(writer));
        self
    }

    pub fn build(self) -> Server<'a, P> {
        Server {
            sink: self.sink,
            passthrough: self.passthrough,
            forward: self.forward,
            state: ProtocolState::Outside,
            line_reader: LineReader::new(),
        }
    }
}

impl<'a> Server<'a, Discarding> {
    /// Entry point into [`ServerBuilder`] for callers who need both a
    /// custom pass-through sink and a forward stream.
    pub fn builder(sink: Sink<'a>) -> ServerBuilder<'a, Discarding> {
        ServerBuilder::new(sink)
    }
}
