// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoding of `progress:` operands.

use crate::types::{Progress, ProgressWhence};

/// Decodes the operand of a `progress:` directive.
///
/// Recognized forms: `push`, `pop`, `+N`, `-N`, or a bare `N` (absolute
/// set). Anything else yields `None`, which callers treat as malformed
/// input to forward rather than act on.
pub fn decode_progress(operand: &str) -> Option<Progress> {
    match operand {
        "push" => {
            return Some(Progress {
                offset: None,
                whence: ProgressWhence::Push,
            })
        }
        "pop" => {
            return Some(Progress {
                offset: None,
                whence: ProgressWhence::Pop,
            })
        }
        _ => {}
    }

    if let Some(delta) = operand.strip_prefix('+') {
        let value: i64 = delta.parse().ok()?;
        return Some(Progress {
            offset: Some(value),
            whence: ProgressWhence::Cur,
        });
    }
    if operand.starts_with('-') {
        let value: i64 = operand.parse().ok()?;
        return Some(Progress {
            offset: Some(value),
            whence: ProgressWhence::Cur,
        });
    }

    let value: i64 = operand.parse().ok()?;
    Some(Progress {
        offset: Some(value),
        whence: ProgressWhence::Set,
    })
}
