// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The data model shared by the server and client halves of the protocol.

use std::collections::BTreeSet;
use std::fmt;

use crate::errors::EmptyTestId;

/// An opaque, non-empty name identifying a test case.
///
/// Two `TestId`s compare equal iff their underlying strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestId(String);

impl TestId {
    /// Builds a `TestId`, rejecting the empty string.
    pub fn new(name: impl Into<String>) -> Result<Self, EmptyTestId> {
        let name = name.into();
        if name.is_empty() {
            return Err(EmptyTestId);
        }
        Ok(Self(name))
    }

    /// Borrows the underlying name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A failure/error description attached to an outcome.
///
/// `RemoteError::default()` and `RemoteError::new()` both equal
/// `RemoteError(String::new())`; equality is by string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteError(pub String);

impl RemoteError {
    /// The empty remote error, used for outcomes reported without a detail
    /// block.
    pub fn new() -> Self {
        Self(String::new())
    }

    /// Borrows the error message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RemoteError {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A terminal test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Error,
    Skip,
    ExpectedFailure,
}

impl Outcome {
    /// The wire keyword used both in lost-connection messages and as the
    /// encoder's directive token.
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Error => "error",
            Outcome::Skip => "skip",
            Outcome::ExpectedFailure => "xfail",
        }
    }
}

/// Interpretation mode of a `progress:` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressWhence {
    /// Absolute position.
    Set,
    /// Relative delta.
    Cur,
    /// Save the current counter and reset.
    Push,
    /// Restore a previously pushed counter.
    Pop,
}

/// A decoded `progress:` directive. `offset` is `None` for `Push`/`Pop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub offset: Option<i64>,
    pub whence: ProgressWhence,
}

/// A decoded `tags:` directive: tokens added and tokens removed (a leading
/// `-` marks removal). Stored as `BTreeSet` so sinks and tests observe a
/// deterministic iteration order; the wire protocol itself only promises set
/// membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDelta {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

/// A UTC instant with microsecond precision, as carried by `time:`.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The protocol's top-level state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolState {
    /// Between tests, or before any input has arrived.
    Outside,
    /// After a `test` directive, before a terminal outcome.
    InTest { current: TestId },
    /// Consuming lines between `[` and `]` for a pending outcome.
    ReadingDetail {
        outcome: Outcome,
        current: TestId,
        buffer: String,
    },
}

impl Default for ProtocolState {
    fn default() -> Self {
        ProtocolState::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_rejects_empty() {
        assert!(TestId::new("").is_err());
        assert!(TestId::new("old mcdonald").is_ok());
    }

    #[test]
    fn test_id_equality_is_by_name() {
        assert_eq!(TestId::new("a").unwrap(), TestId::new("a").unwrap());
        assert_ne!(TestId::new("a").unwrap(), TestId::new("b").unwrap());
    }

    #[test]
    fn remote_error_empty_constructor_matches_default() {
        assert_eq!(RemoteError::new(), RemoteError::default());
        assert_eq!(RemoteError::new(), RemoteError(String::new()));
    }
}
