// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Cross-crate round-trip: `subunit_client::Encoder` output fed back through
//! `Server` reproduces the same sequence of sink calls.

use std::cell::RefCell;

use subunit_client::Encoder;
use subunit_core::{Progress, ProgressWhence, RemoteError, Server, SinkBuilder, TagDelta, TestId};

#[test]
fn progress_tags_and_time_round_trip_through_the_wire() {
    let mut encoder = Encoder::new(Vec::new());
    encoder.progress(Progress {
        offset: Some(23),
        whence: ProgressWhence::Set,
    }).unwrap();
    encoder.progress(Progress {
        offset: None,
        whence: ProgressWhence::Push,
    }).unwrap();
    encoder.tags(&TagDelta {
        added: ["slow".to_string()].into_iter().collect(),
        removed: ["quarantined".to_string()].into_iter().collect(),
    }).unwrap();
    let bytes = encoder.into_inner();

    let events = RefCell::new(Vec::new());
    let sink = SinkBuilder::new()
        .on_progress(|p| events.borrow_mut().push(format!("progress:{p:?}")))
        .on_tags(|delta| {
            events
                .borrow_mut()
                .push(format!("tags:+{:?}-{:?}", delta.added, delta.removed))
        })
        .build();
    let mut server = Server::new(sink);
    for line in String::from_utf8(bytes).unwrap().split_inclusive('\n') {
        server.line_received(line);
    }

    assert_eq!(
        events.into_inner(),
        vec![
            format!(
                "progress:{:?}",
                Progress {
                    offset: Some(23),
                    whence: ProgressWhence::Set
                }
            ),
            format!(
                "progress:{:?}",
                Progress {
                    offset: None,
                    whence: ProgressWhence::Push
                }
            ),
            format!(
                "tags:+{:?}-{:?}",
                ["slow".to_string()].into_iter().collect::<std::collections::BTreeSet<_>>(),
                ["quarantined".to_string()]
                    .into_iter()
                    .collect::<std::collections::BTreeSet<_>>()
            ),
        ]
    );
}

#[test]
fn expected_failure_with_detail_round_trips() {
    let id = TestId::new("mostly works").unwrap();
    let mut encoder = Encoder::new(Vec::new());
    encoder.start_test(&id).unwrap();
    encoder
        .expected_failure(&id, &RemoteError("known flaky assertion".to_string()))
        .unwrap();
    let bytes = encoder.into_inner();

    let events = RefCell::new(Vec::new());
    let sink = SinkBuilder::new()
        .start_test(|i| events.borrow_mut().push(format!("start:{i}")))
        .stop_test(|i| events.borrow_mut().push(format!("stop:{i}")))
        .add_expected_failure(|i, err| {
            events
                .borrow_mut()
                .push(format!("xfail:{i}:{}", err.message()))
        })
        .build();
    let mut server = Server::new(sink);
    for line in String::from_utf8(bytes).unwrap().split_inclusive('\n') {
        server.line_received(line);
    }

    assert_eq!(
        events.into_inner(),
        vec![
            "start:mostly works",
            "xfail:mostly works:known flaky assertion\n",
            "stop:mostly works",
        ]
    );
}
