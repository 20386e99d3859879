//! Declaration of the named fields that make up a [crate::layout::Layout].

use crate::bits::value_range;

/// A single named field in a binary layout: either a scalar or a fixed-length
/// array of equally sized elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Name used to address the field on a [crate::target::BinaryTarget].
    pub name: String,
    /// Byte the field starts in.
    pub byte_offset: usize,
    /// Bit within `byte_offset` where the field starts (in the layout's bit order).
    pub bit_offset: usize,
    /// Width of one value in bits.
    pub bit_width: usize,
    /// Whether this is a scalar or an array, and array parameters.
    pub kind: FieldKind,
    /// If true, values are two's complement and sign-extended on read.
    pub signed: bool,
    /// Explicit inclusive bounds, narrower than what the width can hold.
    pub bounds: Option<(i128, i128)>,
    /// Aliased fields may overlap other fields (e.g. a flag byte viewed two ways).
    pub alias: bool,
}

/// Distinguishes scalar fields from fixed-length array fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single value.
    Scalar,
    /// Repeated element with fixed count and stride.
    Array(ArraySpec),
}

/// Parameters for an array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySpec {
    /// Number of elements.
    pub count: usize,
    /// Distance in bits between the start of consecutive elements.
    pub stride_bits: usize,
}

impl Field {
    /// A byte-aligned scalar, `byte_len` bytes wide.
    pub fn bytes(name: impl Into<String>, byte_offset: usize, byte_len: usize) -> Self {
        Self::bits(name, byte_offset, 0, byte_len * 8)
    }

    /// A scalar starting at `bit_offset` within `byte_offset`.
    pub fn bits(
        name: impl Into<String>,
        byte_offset: usize,
        bit_offset: usize,
        bit_width: usize,
    ) -> Self {
        Field {
            name: name.into(),
            byte_offset,
            bit_offset,
            bit_width,
            kind: FieldKind::Scalar,
            signed: false,
            bounds: None,
            alias: false,
        }
    }

    /// A single-bit flag.
    pub fn flag(name: impl Into<String>, byte_offset: usize, bit_offset: usize) -> Self {
        Self::bits(name, byte_offset, bit_offset, 1)
    }

    /// `count` tightly packed elements of `bit_width` bits each.
    pub fn array(
        name: impl Into<String>,
        byte_offset: usize,
        bit_offset: usize,
        bit_width: usize,
        count: usize,
    ) -> Self {
        Field {
            kind: FieldKind::Array(ArraySpec {
                count,
                stride_bits: bit_width,
            }),
            ..Self::bits(name, byte_offset, bit_offset, bit_width)
        }
    }

    /// Overrides the distance between array elements.
    pub fn with_stride(mut self, stride_bits: usize) -> Self {
        if let FieldKind::Array(spec) = &mut self.kind {
            spec.stride_bits = stride_bits;
        }
        self
    }

    /// Interprets values as two's complement.
    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Restricts values to `min..=max`.
    pub fn bounded(mut self, min: i128, max: i128) -> Self {
        self.bounds = Some((min, max));
        self
    }

    /// Exempts the field from overlap checks.
    pub fn aliased(mut self) -> Self {
        self.alias = true;
        self
    }

    /// Absolute position of the first bit.
    pub fn start_bit(&self) -> usize {
        self.byte_offset * 8 + self.bit_offset
    }

    /// Number of values the field holds (1 for scalars).
    pub fn count(&self) -> usize {
        match self.kind {
            FieldKind::Scalar => 1,
            FieldKind::Array(spec) => spec.count,
        }
    }

    /// Distance in bits between elements (the width for scalars).
    pub fn stride(&self) -> usize {
        match self.kind {
            FieldKind::Scalar => self.bit_width,
            FieldKind::Array(spec) => spec.stride_bits,
        }
    }

    /// Absolute position of element `index`.
    pub fn element_bit(&self, index: usize) -> usize {
        self.start_bit() + index * self.stride()
    }

    /// One past the last bit the field occupies.
    pub fn end_bit(&self) -> usize {
        self.element_bit(self.count().saturating_sub(1)) + self.bit_width
    }

    /// Inclusive range a value written to this field must fall in.
    pub fn range(&self) -> (i128, i128) {
        self.bounds
            .unwrap_or_else(|| value_range(self.bit_width, self.signed))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, FieldKind::Array(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_extent() {
        let ivs = Field::array("IVs", 0x48, 0, 5, 6);
        assert_eq!(ivs.start_bit(), 0x48 * 8);
        assert_eq!(ivs.end_bit(), 0x48 * 8 + 30);
        assert_eq!(ivs.range(), (0, 31));
    }

    #[test]
    fn test_strided_extent() {
        let f = Field::array("words", 0, 0, 4, 3).with_stride(8);
        assert_eq!(f.element_bit(2), 16);
        assert_eq!(f.end_bit(), 20);
    }

    #[test]
    fn test_bounds_override_width() {
        let level = Field::bits("Met Level", 0x46, 0, 7).bounded(0, 100);
        assert_eq!(level.range(), (0, 100));
        assert_eq!(Field::bytes("PID", 0, 4).range(), (0, 0xFFFF_FFFF));
        assert_eq!(Field::bytes("Delta", 0, 1).signed().range(), (-128, 127));
    }
}
