// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Encoder for the subunit test-result streaming protocol: the symmetric
//! counterpart to `subunit-core`'s decoder, for processes that want to
//! *emit* a subunit stream rather than consume one.

pub mod errors;

use std::io::Write;

use subunit_core::{Progress, ProgressWhence, RemoteError, TagDelta, TestId, Timestamp};

pub use errors::EncodeError;

/// Writes subunit directives to an underlying [`Write`]r.
///
/// Unlike [`subunit_core::Server`], an `Encoder` carries no protocol state
/// of its own: the caller decides when a test starts and stops, and a
/// malformed call sequence (e.g. two outcomes in a row) simply produces a
/// stream a decoder would read back oddly, the same way it would for any
/// other hand-written subunit emitter.
pub struct Encoder<W: Write> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn start_test(&mut self, id: &TestId) -> Result<(), EncodeError> {
        writeln!(self.writer, "test: {id}")?;
        Ok(())
    }

    pub fn success(&mut self, id: &TestId) -> Result<(), EncodeError> {
        self.write_outcome("success", id, None)
    }

    pub fn failure(&mut self, id: &TestId, error: &RemoteError) -> Result<(), EncodeError> {
        self.write_remote_exception("failure", id, error)
    }

    pub fn error(&mut self, id: &TestId, error: &RemoteError) -> Result<(), EncodeError> {
        self.write_remote_exception("error", id, error)
    }

    pub fn skip(&mut self, id: &TestId, reason: &str) -> Result<(), EncodeError> {
        self.write_outcome("skip", id, non_empty(reason))
    }

    pub fn expected_failure(&mut self, id: &TestId, error: &RemoteError) -> Result<(), EncodeError> {
        self.write_outcome("xfail", id, non_empty(error.message()))
    }

    pub fn progress(&mut self, progress: Progress) -> Result<(), EncodeError> {
        let operand = match progress.whence {
            ProgressWhence::Push => "push".to_string(),
            ProgressWhence::Pop => "pop".to_string(),
            ProgressWhence::Set => progress.offset.unwrap_or(0).to_string(),
            ProgressWhence::Cur => {
                let offset = progress.offset.unwrap_or(0);
                if offset >= 0 {
                    format!("+{offset}")
                } else {
                    offset.to_string()
                }
            }
        };
        writeln!(self.writer, "progress: {operand}")?;
        Ok(())
    }

    /// Encodes a tag delta. Removed tags are emitted with a leading `-`.
    pub fn tags(&mut self, delta: &TagDelta) -> Result<(), EncodeError> {
        let mut operand = String::new();
        for tag in &delta.added {
            if !operand.is_empty() {
                operand.push(' ');
            }
            operand.push_str(tag);
        }
        for tag in &delta.removed {
            if !operand.is_empty() {
                operand.push(' ');
            }
            operand.push('-');
            operand.push_str(tag);
        }
        writeln!(self.writer, "tags: {operand}")?;
        Ok(())
    }

    pub fn time(&mut self, timestamp: Timestamp) -> Result<(), EncodeError> {
        writeln!(self.writer, "time: {}", subunit_core::time::encode_time(&timestamp))?;
        Ok(())
    }

    /// `failure`/`error` carry their `RemoteError` message behind a literal
    /// `RemoteException: ` prefix on the wire, matching the reference
    /// client; `skip` and `xfail` carry their payload unprefixed.
    fn write_remote_exception(
        &mut self,
        keyword: &str,
        id: &TestId,
        error: &RemoteError,
    ) -> Result<(), EncodeError> {
        let message = error.message();
        if message.is_empty() {
            self.write_outcome(keyword, id, None)
        } else {
            let body = format!("RemoteException: {message}");
            self.write_outcome(keyword, id, Some(&body))
        }
    }

    fn write_outcome(
        &mut self,
        keyword: &str,
        id: &TestId,
        detail: Option<&str>,
    ) -> Result<(), EncodeError> {
        match detail {
            None => writeln!(self.writer, "{keyword}: {id}")?,
            Some(body) => {
                writeln!(self.writer, "{keyword}: {id} [")?;
                write_escaped(&mut self.writer, body)?;
                writeln!(self.writer, "]")?;
            }
        }
        Ok(())
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Writes detail-block body text, prefixing any line that would otherwise
/// be mistaken for the closing `]` with an escaping space.
fn write_escaped(writer: &mut impl Write, body: &str) -> std::io::Result<()> {
    for line in body.split_inclusive('\n') {
        if line == "]\n" || line == "]" {
            write!(writer, " {line}")?;
        } else {
            write!(writer, "{line}")?;
        }
        if !line.ends_with('\n') {
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use subunit_core::{Sink, SinkBuilder};
    use std::cell::RefCell;

    fn recording_sink<'a>(events: &'a RefCell<Vec<String>>) -> Sink<'a> {
        SinkBuilder::new()
            .start_test(move |id| events.borrow_mut().push(format!("start:{id}")))
            .stop_test(move |id| events.borrow_mut().push(format!("stop:{id}")))
            .add_success(move |id| events.borrow_mut().push(format!("success:{id}")))
            .add_failure(move |id, err| {
                events
                    .borrow_mut()
                    .push(format!("failure:{id}:{}", err.message()))
            })
            .build()
    }

    #[test]
    fn encodes_simple_success() {
        let mut encoder = Encoder::new(Vec::new());
        let id = TestId::new("old mcdonald").unwrap();
        encoder.start_test(&id).unwrap();
        encoder.success(&id).unwrap();
        let bytes = encoder.into_inner();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "test: old mcdonald\nsuccess: old mcdonald\n"
        );
    }

    #[test]
    fn round_trips_failure_with_detail_through_server() {
        let events = RefCell::new(Vec::new());
        let mut server = subunit_core::Server::new(recording_sink(&events));

        let mut encoder = Encoder::new(Vec::new());
        let id = TestId::new("t").unwrap();
        encoder.start_test(&id).unwrap();
        encoder
            .failure(&id, &RemoteError("a farmer had a dog\n".to_string()))
            .unwrap();
        let bytes = encoder.into_inner();
        let text = String::from_utf8(bytes).unwrap();
        for line in text.split_inclusive('\n') {
            server.line_received(line);
        }

        assert_eq!(
            events.into_inner(),
            vec![
                "start:t",
                "failure:t:RemoteException: a farmer had a dog\n",
                "stop:t"
            ]
        );
    }

    #[test]
    fn escapes_embedded_closing_bracket() {
        let mut encoder = Encoder::new(Vec::new());
        let id = TestId::new("t").unwrap();
        encoder.start_test(&id).unwrap();
        encoder
            .failure(&id, &RemoteError("boom\n]\n".to_string()))
            .unwrap();
        let bytes = encoder.into_inner();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "test: t\nfailure: t [\nRemoteException: boom\n ]\n]\n"
        );
    }

    #[test]
    fn failure_and_error_prefix_the_message_with_remote_exception() {
        let mut encoder = Encoder::new(Vec::new());
        let id = TestId::new("t").unwrap();
        encoder
            .failure(&id, &RemoteError("boo qux".to_string()))
            .unwrap();
        encoder
            .error(&id, &RemoteError("phwoar crikey".to_string()))
            .unwrap();
        let bytes = encoder.into_inner();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "failure: t [\nRemoteException: boo qux\n]\n\
             error: t [\nRemoteException: phwoar crikey\n]\n"
        );
    }

    #[test]
    fn skip_carries_its_reason_unprefixed() {
        let mut encoder = Encoder::new(Vec::new());
        let id = TestId::new("t").unwrap();
        encoder.skip(&id, "Has it really?").unwrap();
        let bytes = encoder.into_inner();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "skip: t [\nHas it really?\n]\n"
        );
    }
}
