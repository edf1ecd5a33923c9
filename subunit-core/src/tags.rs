// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoding of `tags:` operands.

use crate::types::TagDelta;

/// Decodes a space-separated `tags:` operand into an added/removed set
/// pair. A token prefixed with `-` marks removal; everything else is an
/// addition. Empty tokens (from repeated spaces) are ignored.
pub fn decode_tags(operand: &str) -> TagDelta {
    let mut delta = TagDelta::default();
    for token in operand.split(' ') {
        if token.is_empty() {
            continue;
        }
        match token.strip_prefix('-') {
            Some(tag) if !tag.is_empty() => {
                delta.removed.insert(tag.to_string());
            }
            _ => {
                delta.added.insert(token.to_string());
            }
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_add_and_remove() {
        let delta = decode_tags("foo -bar baz");
        assert_eq!(delta.added.len(), 2);
        assert!(delta.added.contains("foo"));
        assert!(delta.added.contains("baz"));
        assert_eq!(delta.removed.len(), 1);
        assert!(delta.removed.contains("bar"));
    }

    #[test]
    fn repeated_spaces_are_ignored() {
        let delta = decode_tags("foo   bar");
        assert_eq!(delta.added.len(), 2);
    }

    #[test]
    fn lone_dash_is_an_addition() {
        let delta = decode_tags("-");
        assert!(delta.added.contains("-"));
        assert!(delta.removed.is_empty());
    }

    #[test]
    fn empty_operand_yields_empty_delta() {
        let delta = decode_tags("");
        assert!(delta.added.is_empty());
        assert!(delta.removed.is_empty());
    }

    fn tag_token() -> impl proptest::strategy::Strategy<Value = String> {
        proptest::string::string_regex("[a-z]{1,8}").unwrap()
    }

    proptest::proptest! {
        // Any mix of bare and `-`-prefixed tokens partitions cleanly into
        // the added/removed sets the tokens were built from.
        #[test]
        fn operand_partitions_into_added_and_removed(
            entries in proptest::collection::vec((tag_token(), proptest::bool::ANY), 0..8)
        ) {
            let mut expected_added = std::collections::BTreeSet::new();
            let mut expected_removed = std::collections::BTreeSet::new();
            let mut tokens = Vec::new();
            for (tag, remove) in &entries {
                if *remove {
                    tokens.push(format!("-{tag}"));
                    expected_removed.insert(tag.clone());
                } else {
                    tokens.push(tag.clone());
                    expected_added.insert(tag.clone());
                }
            }
            let operand = tokens.join(" ");
            let delta = decode_tags(&operand);
            proptest::prop_assert_eq!(delta.added, expected_added);
            proptest::prop_assert_eq!(delta.removed, expected_removed);
        }
    }
}
