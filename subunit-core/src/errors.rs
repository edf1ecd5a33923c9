// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types surfaced by `subunit-core`.

use thiserror::Error;

/// A [`crate::types::TestId`] cannot be constructed from an empty string.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("test id must not be empty")]
pub struct EmptyTestId;

/// The operand of a `time:` directive did not match the expected
/// `YYYY-MM-DD HH:MM:SS[.ffffff]Z` grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid timestamp operand: {0:?}")]
pub struct TimestampError(pub(crate) String);
