//! Dynamically-typed field values.
//!
//! A `FieldValue` is one cell's worth of data, matching the declared type of
//! its column. Character values keep the on-disk padding; trimming happens
//! only on edit-purpose reads in the model layer, never in storage.

use std::fmt;

/// Calendar date as stored in `D` fields (`YYYYMMDD` text on disk).
/// No calendar arithmetic here; the table layer only round-trips digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// One cell value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    /// Blank field (all spaces on disk, or an unparsable logical).
    #[default]
    Null,
    /// `C` field. Padding preserved as stored.
    Character(String),
    /// `N` field with zero declared decimals.
    Integer(i64),
    /// `N`/`F` field with decimals.
    Double(f64),
    /// `D` field.
    Date(Date),
    /// `L` field. Blank/`?` decodes to `Null`, not to a bool.
    Logical(bool),
}

impl FieldValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Edit-purpose presentation of a value: Character copies are
    /// whitespace-trimmed, everything else is returned as-is.
    pub fn trimmed(&self) -> FieldValue {
        match self {
            FieldValue::Character(s) => FieldValue::Character(s.trim().to_string()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Character(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Double(x) => write!(f, "{}", x),
            FieldValue::Date(d) => write!(f, "{}", d),
            FieldValue::Logical(b) => f.write_str(if *b { "T" } else { "F" }),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Character(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Character(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Double(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Logical(b)
    }
}
