use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A spreadsheet error code, e.g. `#VALUE!` or `#DIV/0!`.
///
/// These are the spellings that can appear verbatim in formula text and as
/// cell results. `Display`/`FromStr` round-trip through the canonical
/// uppercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorValue {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    NA,
    Spill,
    Calc,
}

impl ErrorValue {
    /// Every error code, in canonical order.
    pub const ALL: &'static [ErrorValue] = &[
        ErrorValue::Null,
        ErrorValue::Div0,
        ErrorValue::Value,
        ErrorValue::Ref,
        ErrorValue::Name,
        ErrorValue::Num,
        ErrorValue::NA,
        ErrorValue::Spill,
        ErrorValue::Calc,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorValue::Null => "#NULL!",
            ErrorValue::Div0 => "#DIV/0!",
            ErrorValue::Value => "#VALUE!",
            ErrorValue::Ref => "#REF!",
            ErrorValue::Name => "#NAME?",
            ErrorValue::Num => "#NUM!",
            ErrorValue::NA => "#N/A",
            ErrorValue::Spill => "#SPILL!",
            ErrorValue::Calc => "#CALC!",
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognized spreadsheet error code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized error literal `{0}`")]
pub struct ParseErrorValueError(pub String);

impl FromStr for ErrorValue {
    type Err = ParseErrorValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorValue::ALL
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseErrorValueError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_canonical_spellings() {
        assert_eq!(ErrorValue::Div0.to_string(), "#DIV/0!");
        assert_eq!(ErrorValue::Name.to_string(), "#NAME?");
        assert_eq!(ErrorValue::NA.to_string(), "#N/A");
    }

    #[test]
    fn from_str_round_trips_all_codes() {
        for &err in ErrorValue::ALL {
            assert_eq!(err.as_str().parse::<ErrorValue>().unwrap(), err);
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("#value!".parse::<ErrorValue>().unwrap(), ErrorValue::Value);
        assert_eq!("#Spill!".parse::<ErrorValue>().unwrap(), ErrorValue::Spill);
    }

    #[test]
    fn from_str_rejects_unknown_spellings() {
        assert!("#BOGUS!".parse::<ErrorValue>().is_err());
        assert!("VALUE!".parse::<ErrorValue>().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let json = serde_json::to_string(&ErrorValue::Ref).unwrap();
        let back: ErrorValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorValue::Ref);
    }
}
