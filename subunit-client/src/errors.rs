// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types surfaced by `subunit-client`.

use thiserror::Error;

/// Failure to write an encoded directive to the underlying stream.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to write subunit output: {0}")]
    Io(#[from] std::io::Error),
}
