//! Quantity text parsing for count-sheet imports
//!
//! The count sheet stores quantities as free text such as `"5 rolls"` or
//! `"12 boxes"`. Both functions here are total: they never fail.

use crate::models::ContainerKind;

const ROLL_WORDS: &[&str] = &["spool", "roll", "rolls"];
const BOX_WORDS: &[&str] = &["box", "bundle"];

/// Classify the counting unit named in a quantity cell
pub fn classify_container(text: &str) -> ContainerKind {
    let lower = text.to_lowercase();
    if ROLL_WORDS.iter().any(|w| lower.contains(w)) {
        ContainerKind::Roll
    } else if BOX_WORDS.iter().any(|w| lower.contains(w)) {
        ContainerKind::Box
    } else {
        ContainerKind::Unit
    }
}

/// First run of ASCII digits in `text`, or 0 when there is none.
///
/// Values beyond `i64::MAX` saturate.
pub fn extract_first_integer(text: &str) -> i64 {
    let digits: &str = match text.find(|c: char| c.is_ascii_digit()) {
        Some(start) => {
            let rest = &text[start..];
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            &rest[..end]
        }
        None => return 0,
    };

    digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    })
}

/// Parsed quantity cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedQuantity {
    pub kind: ContainerKind,
    pub count: i64,
}

impl ParsedQuantity {
    pub fn parse(text: &str) -> Self {
        Self {
            kind: classify_container(text),
            count: extract_first_integer(text),
        }
    }

    /// Value of the `Spools` flag column
    pub fn spools(&self) -> i64 {
        i64::from(self.kind.is_roll())
    }
}
