// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Server-side decoder and state machine for the subunit test-result
//! streaming protocol: turns a line-oriented byte stream from a child test
//! process into calls against a [`sink::Sink`].

pub mod classifier;
pub mod errors;
pub mod line_reader;
pub mod passthrough;
pub mod progress;
pub mod server;
pub mod sink;
pub mod tags;
pub mod time;
pub mod types;

pub use errors::{EmptyTestId, TimestampError};
pub use line_reader::LineReader;
pub use passthrough::{Discarding, PassThroughSink, WriteTo};
pub use server::{Server, ServerBuilder};
pub use sink::{Sink, SinkBuilder};
pub use types::{
    Outcome, Progress, ProgressWhence, ProtocolState, RemoteError, TagDelta, TestId, Timestamp,
};
