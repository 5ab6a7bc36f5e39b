use std::{borrow::Borrow, fmt, ops::Deref, str::FromStr};

/// The number of digits in a full phone number.
pub const NUMBER_DIGITS: usize = 11;

/// The shortest segment accepted by the number generator.
pub const MIN_SEGMENT_DIGITS: usize = 3;

/// The longest segment accepted by the number generator.
pub const MAX_SEGMENT_DIGITS: usize = 7;

/// Returns `true` if `s` is exactly eleven ASCII digits.
///
/// This is the only format check applied to numbers supplied by callers.
#[must_use]
pub fn is_valid_number(s: &str) -> bool {
    s.len() == NUMBER_DIGITS && s.bytes().all(|b| b.is_ascii_digit())
}

/// An eleven digit phone number.
///
/// Numbers are fixed-width digit strings, so lexicographic order equals
/// numeric order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Creates a new `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Number`] if the string is not exactly eleven digits.
    pub fn new(s: String) -> Result<Self, Error> {
        if is_valid_number(&s) {
            Ok(Self(s))
        } else {
            Err(Error::Number(s))
        }
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the trailing `n` digits, used when rendering number pickers.
    #[must_use]
    pub fn tail(&self, n: usize) -> &str {
        &self.0[NUMBER_DIGITS.saturating_sub(n)..]
    }
}

impl Deref for PhoneNumber {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for PhoneNumber {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<&str> for PhoneNumber {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

/// A validated number segment.
///
/// Format: 3 to 7 digits, the first being `1` and the second in `3..=9`.
/// Full numbers are produced by appending a zero-padded sequence suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment(String);

impl Segment {
    /// Creates a new `Segment` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Segment`] if the string is not a valid segment.
    pub fn new(s: String) -> Result<Self, Error> {
        let bytes = s.as_bytes();
        let valid = (MIN_SEGMENT_DIGITS..=MAX_SEGMENT_DIGITS).contains(&bytes.len())
            && bytes.iter().all(u8::is_ascii_digit)
            && bytes[0] == b'1'
            && (b'3'..=b'9').contains(&bytes[1]);

        if valid {
            Ok(Self(s))
        } else {
            Err(Error::Segment(s))
        }
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number of digits left for the sequence suffix.
    #[must_use]
    pub fn suffix_digits(&self) -> usize {
        NUMBER_DIGITS.saturating_sub(self.0.len())
    }

    /// Builds the full number for sequence value `sequence`.
    ///
    /// Returns `None` if the sequence does not fit in the suffix.
    #[must_use]
    pub fn number(&self, sequence: u64) -> Option<PhoneNumber> {
        let width = self.suffix_digits();
        let candidate = format!("{}{sequence:0width$}", self.0);
        (candidate.len() == NUMBER_DIGITS).then_some(PhoneNumber(candidate))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Segment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<&str> for Segment {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}

/// Errors that can occur when parsing numbers and segments.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The string is not an eleven digit number.
    #[error("Invalid phone number '{0}': expected exactly 11 digits")]
    Number(String),

    /// The string is not a valid segment.
    #[error(
        "Invalid segment '{0}': expected 3-7 digits starting with '1' followed by a digit in 3-9"
    )]
    Segment(String),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("13800000000", true; "eleven digits")]
    #[test_case("1380000000", false; "ten digits")]
    #[test_case("138000000000", false; "twelve digits")]
    #[test_case("1380000000a", false; "trailing letter")]
    #[test_case("", false; "empty")]
    #[test_case("１３８00000000", false; "full width digits")]
    fn number_validation(input: &str, expected: bool) {
        assert_eq!(is_valid_number(input), expected);
        assert_eq!(PhoneNumber::from_str(input).is_ok(), expected);
    }

    #[test_case("138", true; "three digits")]
    #[test_case("1391234", true; "seven digits")]
    #[test_case("13", false; "too short")]
    #[test_case("13912345", false; "too long")]
    #[test_case("238", false; "must start with one")]
    #[test_case("128", false; "second digit below three")]
    #[test_case("199", true; "second digit nine")]
    #[test_case("13a", false; "non digit")]
    #[test_case("999999", false; "leading nine")]
    fn segment_validation(input: &str, expected: bool) {
        assert_eq!(Segment::from_str(input).is_ok(), expected);
    }

    #[test]
    fn segment_builds_zero_padded_numbers() {
        let segment = Segment::try_from("138").unwrap();
        assert_eq!(segment.suffix_digits(), 8);
        assert_eq!(segment.number(0).unwrap().as_str(), "13800000000");
        assert_eq!(segment.number(49).unwrap().as_str(), "13800000049");
        assert_eq!(segment.number(99_999_999).unwrap().as_str(), "13899999999");
    }

    #[test]
    fn segment_rejects_overflowing_sequence() {
        let segment = Segment::try_from("1391234").unwrap();
        assert_eq!(segment.suffix_digits(), 4);
        assert!(segment.number(9_999).is_some());
        assert!(segment.number(10_000).is_none());
    }

    #[test]
    fn tail_returns_trailing_digits() {
        let number = PhoneNumber::try_from("13812345678").unwrap();
        assert_eq!(number.tail(4), "5678");
        assert_eq!(number.tail(20), "13812345678");
    }

    #[test]
    fn error_messages_name_the_input() {
        let err = PhoneNumber::try_from("12").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid phone number '12': expected exactly 11 digits"
        );
    }
}
