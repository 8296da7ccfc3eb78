//! Column schema: field types and descriptors.
//!
//! The schema is fixed for the lifetime of a table — it is read once from the
//! descriptor array at open time and snapshotted by the model. On disk each
//! descriptor is a 32-byte entry (see consts.rs for the layout).

use serde::Serialize;

/// Declared column type, by dBASE type tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FieldType {
    /// `C` — fixed-width text, space padded.
    Character,
    /// `N` — right-justified decimal text.
    Numeric,
    /// `F` — same wire shape as Numeric.
    Float,
    /// `D` — `YYYYMMDD`.
    Date,
    /// `L` — `T`/`F`/`?`.
    Logical,
}

impl FieldType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'C' => Some(FieldType::Character),
            b'N' => Some(FieldType::Numeric),
            b'F' => Some(FieldType::Float),
            b'D' => Some(FieldType::Date),
            b'L' => Some(FieldType::Logical),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            FieldType::Character => b'C',
            FieldType::Numeric => b'N',
            FieldType::Float => b'F',
            FieldType::Date => b'D',
            FieldType::Logical => b'L',
        }
    }
}

/// One column of the schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Width of the field slot in bytes.
    pub length: u8,
    /// Digits after the decimal point (Numeric/Float only).
    pub decimals: u8,
}

impl FieldDescriptor {
    pub fn new<S: Into<String>>(name: S, field_type: FieldType, length: u8, decimals: u8) -> Self {
        Self {
            name: name.into(),
            field_type,
            length,
            decimals,
        }
    }

    pub fn character<S: Into<String>>(name: S, length: u8) -> Self {
        Self::new(name, FieldType::Character, length, 0)
    }

    pub fn numeric<S: Into<String>>(name: S, length: u8, decimals: u8) -> Self {
        Self::new(name, FieldType::Numeric, length, decimals)
    }

    pub fn date<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldType::Date, 8, 0)
    }

    pub fn logical<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldType::Logical, 1, 0)
    }
}
