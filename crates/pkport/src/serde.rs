//! JSON-deserializable layout description.
//!
//! These types describe the *shape* of a binary target. They are intended to
//! be read from JSON (for example a layout file shipped next to a format
//! plugin) and compiled into a [crate::layout::Layout] with
//! [crate::layout::Layout::from_def] or [crate::layout::Layout::from_json].

use serde::{Deserialize, Serialize};

use crate::{bits::BitOrder, field::Field};

/// Bit order to address the buffer with.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum BitOrderDef {
    #[default]
    /// Most-significant bit first, big-endian values.
    MsbFirst,
    /// Least-significant bit first, little-endian values.
    LsbFirst,
}

impl From<BitOrderDef> for BitOrder {
    fn from(value: BitOrderDef) -> Self {
        match value {
            BitOrderDef::MsbFirst => BitOrder::MsbFirst,
            BitOrderDef::LsbFirst => BitOrder::LsbFirst,
        }
    }
}

/// Top-level layout definition.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LayoutDef {
    /// Format name, e.g. `"pk3"`.
    pub name: String,
    /// Size of the backing buffer in bytes.
    pub size: usize,
    #[serde(default)]
    pub bit_order: BitOrderDef,
    /// All fields of the layout.
    pub fields: Vec<FieldDef>,
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Name the field is addressed by.
    pub name: String,
    /// Byte the field starts in.
    pub byte: usize,
    /// Bit offset within `byte`.
    #[serde(default)]
    pub bit: usize,
    /// Width of one value in bits.
    pub width: usize,
    /// Element count, for array fields.
    #[serde(default)]
    pub count: Option<usize>,
    /// Element stride in bits, defaults to `width`.
    #[serde(default)]
    pub stride: Option<usize>,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default)]
    pub alias: bool,
}

impl From<FieldDef> for Field {
    fn from(value: FieldDef) -> Self {
        let mut field = match value.count {
            Some(count) => Field::array(value.name, value.byte, value.bit, value.width, count),
            None => Field::bits(value.name, value.byte, value.bit, value.width),
        };

        if let Some(stride) = value.stride {
            field = field.with_stride(stride);
        }
        if value.signed {
            field = field.signed();
        }
        if value.min.is_some() || value.max.is_some() {
            let (min, max) = field.range();
            field = field.bounded(
                value.min.map_or(min, i128::from),
                value.max.map_or(max, i128::from),
            );
        }
        if value.alias {
            field = field.aliased();
        }

        field
    }
}
