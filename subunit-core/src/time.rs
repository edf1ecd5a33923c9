// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoding of `time:` operands.

use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::errors::TimestampError;
use crate::types::Timestamp;

const FORMAT_WITH_MICROS: &str = "%Y-%m-%d %H:%M:%S%.fZ";
const FORMAT_WHOLE_SECONDS: &str = "%Y-%m-%d %H:%M:%SZ";

/// Decodes a `time:` operand of the form `YYYY-MM-DD HH:MM:SS[.ffffff]Z`.
pub fn decode_time(operand: &str) -> Result<Timestamp, TimestampError> {
    let naive = NaiveDateTime::parse_from_str(operand, FORMAT_WITH_MICROS)
        .or_else(|_| NaiveDateTime::parse_from_str(operand, FORMAT_WHOLE_SECONDS))
        .map_err(|_| TimestampError(operand.to_string()))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Encodes a timestamp back into its wire form.
pub fn encode_time(timestamp: &Timestamp) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S%.6fZ").to_string()
}
