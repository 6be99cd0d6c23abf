//! Line-oriented record codec
//!
//! Each persisted entity maps to exactly one line of delimited text. The file
//! formats have grown optional trailing fields over time, so decoding is
//! driven by field count: a decoder tries the newest shape first and falls
//! back to the older ones. Encoding always emits the newest shape, which means
//! any whole-file rewrite silently upgrades old rows (migration on write).

use std::fmt::Debug;

/// A domain type that persists as one delimited line of text
///
/// Decoding is total over well-formed generations and `None` otherwise; a
/// malformed line must never abort the scan of the remaining lines. Field
/// values containing the delimiter are unsupported, as the formats carry no
/// quoting or escaping.
pub trait FlatRecord: Debug + Clone + Sized {
    /// Field separator for this entity's file
    const DELIMITER: char;

    /// Entity name used in log output
    const KIND: &'static str;

    /// Encode to one line in the newest schema, without trailing newline
    fn encode(&self) -> String;

    /// Decode one line under any known schema generation
    fn decode(line: &str) -> Option<Self>;
}

/// Split a line into raw fields on the record's delimiter
///
/// Leading and trailing whitespace on the line itself is not trimmed here;
/// callers that tolerate padded input trim individual fields.
pub fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).collect()
}
