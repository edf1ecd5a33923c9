// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Classifies a single input line into a protocol directive.
//!
//! This is deliberately a hand-rolled `match` over fixed ASCII prefixes
//! rather than a regex: the keyword set is small and fixed, and every
//! directive needs a distinct capture shape (name, optional detail marker,
//! free-form operand), so a regex would buy us nothing beyond one call site.

use crate::types::Outcome;

/// The classification of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `test: NAME` / `testing: NAME` (and their colon-less spellings).
    StartTest { name: &'a str },
    /// A terminal outcome directive. `detail` is `true` when the line opens
    /// a `[`-delimited detail block instead of terminating immediately.
    Outcome {
        outcome: Outcome,
        name: &'a str,
        detail: bool,
    },
    /// `progress:` with its raw operand (e.g. `"+5"`, `"push"`).
    Progress { operand: &'a str },
    /// `tags:` with its raw, space-separated operand.
    Tags { operand: &'a str },
    /// `time:` with its raw operand.
    Time { operand: &'a str },
    /// A bare `]` line: closes an open detail block.
    DetailTerminator,
    /// Anything that isn't a recognized directive. Forwarded verbatim to
    /// the pass-through sink.
    PassThrough { line: &'a str },
}

/// Splits the remainder of a directive line (after the keyword and its
/// separator) into `(name, opens_detail)`.
///
/// `rest` has already had its trailing `\n` stripped. A trailing `" ["`
/// marks the start of a detail block; the name is whatever precedes it.
fn split_name(rest: &str) -> (&str, bool) {
    match rest.strip_suffix(" [") {
        Some(name) => (name, true),
        None => (rest, false),
    }
}

/// Strips a fixed keyword followed by either `: ` or a bare space, the two
/// separator spellings subunit implementations emit interchangeably.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    rest.strip_prefix(':')
        .map(|r| r.strip_prefix(' ').unwrap_or(r))
        .or_else(|| rest.strip_prefix(' '))
}

/// Classifies a single line, which must include its trailing `\n`.
pub fn classify(line: &str) -> Token<'_> {
    let body = match line.strip_suffix('\n') {
        Some(b) => b,
        None => return Token::PassThrough { line },
    };

    if body == "]" {
        return Token::DetailTerminator;
    }

    for keyword in ["test", "testing"] {
        if let Some(rest) = strip_keyword(body, keyword) {
            let (name, detail) = split_name(rest);
            if !detail && !name.is_empty() {
                return Token::StartTest { name };
            }
            if detail {
                return Token::StartTest { name };
            }
        }
    }

    let outcomes: &[(&[&str], Outcome)] = &[
        (&["success", "successful"], Outcome::Success),
        (&["failure"], Outcome::Failure),
        (&["error"], Outcome::Error),
        (&["skip"], Outcome::Skip),
        (&["xfail"], Outcome::ExpectedFailure),
    ];
    for (keywords, outcome) in outcomes {
        for keyword in *keywords {
            if let Some(rest) = strip_keyword(body, keyword) {
                let (name, detail) = split_name(rest);
                if !name.is_empty() {
                    return Token::Outcome {
                        outcome: *outcome,
                        name,
                        detail,
                    };
                }
            }
        }
    }

    if let Some(operand) = body.strip_prefix("progress: ") {
        return Token::Progress { operand };
    }
    if let Some(operand) = body.strip_prefix("progress:") {
        return Token::Progress { operand };
    }
    if let Some(operand) = body.strip_prefix("tags: ") {
        return Token::Tags { operand };
    }
    if let Some(operand) = body.strip_prefix("tags:") {
        return Token::Tags { operand };
    }
    if let Some(operand) = body.strip_prefix("time: ") {
        return Token::Time { operand };
    }
    if let Some(operand) = body.strip_prefix("time:") {
        return Token::Time { operand };
    }

    Token::PassThrough { line }
}
