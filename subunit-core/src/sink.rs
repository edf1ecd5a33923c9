// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The capability-detected result sink: the set of callbacks a `Server`
//! drives as it decodes a stream.
//!
//! Required callbacks always fire; optional callbacks are `Option`-wrapped
//! and only fire when the caller supplied one via [`SinkBuilder`]. This
//! mirrors how a consumer of subunit typically only cares about a subset of
//! the richer directives (`progress:`, `tags:`, `time:`) while every
//! consumer needs the five outcome calls.

use crate::types::{Progress, RemoteError, TagDelta, TestId, Timestamp};

type StartTest<'a> = Box<dyn FnMut(&TestId) + 'a>;
type StopTest<'a> = Box<dyn FnMut(&TestId) + 'a>;
type AddSuccess<'a> = Box<dyn FnMut(&TestId) + 'a>;
type AddFailure<'a> = Box<dyn FnMut(&TestId, &RemoteError) + 'a>;
type AddError<'a> = Box<dyn FnMut(&TestId, &RemoteError) + 'a>;
type AddSkip<'a> = Box<dyn FnMut(&TestId, &str) + 'a>;
type AddExpectedFailure<'a> = Box<dyn FnMut(&TestId, &RemoteError) + 'a>;
type OnProgress<'a> = Box<dyn FnMut(Progress) + 'a>;
type OnTags<'a> = Box<dyn FnMut(&TagDelta) + 'a>;
type OnTime<'a> = Box<dyn FnMut(Timestamp) + 'a>;

/// A sink assembled from whichever callbacks a caller provides.
///
/// Construct via [`SinkBuilder`].
pub struct Sink<'a> {
    start_test: StartTest<'a>,
    stop_test: StopTest<'a>,
    add_success: AddSuccess<'a>,
    add_failure: AddFailure<'a>,
    add_error: AddError<'a>,
    add_skip: Option<AddSkip<'a>>,
    add_expected_failure: Option<AddExpectedFailure<'a>>,
    on_progress: Option<OnProgress<'a>>,
    on_tags: Option<OnTags<'a>>,
    on_time: Option<OnTime<'a>>,
}

impl<'a> Sink<'a> {
    pub fn start_test(&mut self, id: &TestId) {
        (self.start_test)(id);
    }

    pub fn stop_test(&mut self, id: &TestId) {
        (self.stop_test)(id);
    }

    pub fn add_success(&mut self, id: &TestId) {
        (self.add_success)(id);
    }

    pub fn add_failure(&mut self, id: &TestId, error: &RemoteError) {
        (self.add_failure)(id, error);
    }

    pub fn add_error(&mut self, id: &TestId, error: &RemoteError) {
        (self.add_error)(id, error);
    }

    /// Reports a skip. Degrades to [`Sink::add_success`] when the caller
    /// never registered `add_skip`.
    pub fn add_skip(&mut self, id: &TestId, reason: &str) {
        match &mut self.add_skip {
            Some(callback) => callback(id, reason),
            None => (self.add_success)(id),
        }
    }

    /// Reports an expected failure. Degrades to [`Sink::add_success`] when
    /// the caller never registered `add_expected_failure`.
    pub fn add_expected_failure(&mut self, id: &TestId, error: &RemoteError) {
        match &mut self.add_expected_failure {
            Some(callback) => callback(id, error),
            None => (self.add_success)(id),
        }
    }

    pub fn supports_progress(&self) -> bool {
        self.on_progress.is_some()
    }

    pub fn progress(&mut self, progress: Progress) {
        if let Some(callback) = &mut self.on_progress {
            callback(progress);
        }
    }

    pub fn supports_tags(&self) -> bool {
        self.on_tags.is_some()
    }

    pub fn tags(&mut self, delta: &TagDelta) {
        if let Some(callback) = &mut self.on_tags {
            callback(delta);
        }
    }

    pub fn supports_time(&self) -> bool {
        self.on_time.is_some()
    }

    pub fn time(&mut self, timestamp: Timestamp) {
        if let Some(callback) = &mut self.on_time {
            callback(timestamp);
        }
    }
}

/// Builds a [`Sink`] from whichever callbacks the caller cares to supply.
///
/// The five required callbacks default to no-ops so a builder can be
/// partially filled in tests without every call site wiring up the full
/// surface.
pub struct SinkBuilder<'a> {
    start_test: StartTest<'a>,
    stop_test: StopTest<'a>,
    add_success: AddSuccess<'a>,
    add_failure: AddFailure<'a>,
    add_error: AddError<'a>,
    add_skip: Option<AddSkip<'a>>,
    add_expected_failure: Option<AddExpectedFailure<'a>>,
    on_progress: Option<OnProgress<'a>>,
    on_tags: Option<OnTags<'a>>,
    on_time: Option<OnTime<'a>>,
}

impl<'a> Default for SinkBuilder<'a> {
    fn default() -> Self {
        Self {
            start_test: Box::new(|_| {}),
            stop_test: Box::new(|_| {}),
            add_success: Box::new(|_| {}),
            add_failure: Box::new(|_, _| {}),
            add_error: Box::new(|_, _| {}),
            add_skip: None,
            add_expected_failure: None,
            on_progress: None,
            on_tags: None,
            on_time: None,
        }
    }
}

impl<'a> SinkBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_test(mut self, callback: impl FnMut(&TestId) + 'a) -> Self {
        self.start_test = Box::new(callback);
        self
    }

    pub fn stop_test(mut self, callback: impl FnMut(&TestId) + 'a) -> Self {
        self.stop_test = Box::new(callback);
        self
    }

    pub fn add_success(mut self, callback: impl FnMut(&TestId) + 'a) -> Self {
        self.add_success = Box::new(callback);
        self
    }

    pub fn add_failure(mut self, callback: impl FnMut(&TestId, &RemoteError) + 'a) -> Self {
        self.add_failure = Box::new(callback);
        self
    }

    pub fn add_error(mut self, callback: impl FnMut(&TestId, &RemoteError) + 'a) -> Self {
        self.add_error = Box::new(callback);
        self
    }

    pub fn add_skip(mut self, callback: impl FnMut(&TestId, &str) + 'a) -> Self {
        self.add_skip = Some(Box::new(callback));
        self
    }

    pub fn add_expected_failure(
        mut self,
        callback: impl FnMut(&TestId, &RemoteError) + 'a,
    ) -> Self {
        self.add_expected_failure = Some(Box::new(callback));
        self
    }

    pub fn on_progress(mut self, callback: impl FnMut(Progress) + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn on_tags(mut self, callback: impl FnMut(&TagDelta) + 'a) -> Self {
        self.on_tags = Some(Box::new(callback));
        self
    }

    pub fn on_time(mut self, callback: impl FnMut(Timestamp) + 'a) -> Self {
        self.on_time = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Sink<'a> {
        Sink {
            start_test: self.start_test,
            stop_test: self.stop_test,
            add_success: self.add_success,
            add_failure: self.add_failure,
            add_error: self.add_error,
            add_skip: self.add_skip,
            add_expected_failure: self.add_expected_failure,
            on_progress: self.on_progress,
            on_tags: self.on_tags,
            on_time: self.on_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn skip_degrades_to_success_without_callback() {
        let successes = RefCell::new(Vec::new());
        let mut sink = SinkBuilder::new()
            .add_success(|id| successes.borrow_mut().push(id.to_string()))
            .build();
        let id = TestId::new("t").unwrap();
        sink.add_skip(&id, "No reason given");
        assert_eq!(successes.borrow().as_slice(), ["t"]);
    }

    #[test]
    fn skip_calls_dedicated_callback_when_present() {
        let reasons = RefCell::new(Vec::new());
        let mut sink = SinkBuilder::new()
            .add_skip(|id, reason| reasons.borrow_mut().push((id.to_string(), reason.to_string())))
            .build();
        let id = TestId::new("t").unwrap();
        sink.add_skip(&id, "flaky");
        assert_eq!(reasons.borrow()[0], ("t".to_string(), "flaky".to_string()));
    }

    #[test]
    fn unsupported_directives_report_false() {
        let sink = SinkBuilder::new().build();
        assert!(!sink.supports_progress());
        assert!(!sink.supports_tags());
        assert!(!sink.supports_time());
    }
}
