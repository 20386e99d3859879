//! BitStore: an owned byte buffer addressed by (byte, bit, width).

use crate::{
    bits::{self, BitOrder, MAX_FIELD_BITS, sign_extend, value_range},
    errors::StoreError,
    field::Field,
};

/// An addressable byte buffer supporting sub-byte reads and writes.
///
/// Writes are range checked: a value that does not fit the requested width
/// fails with [StoreError::OutOfRange] rather than being truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStore {
    data: Vec<u8>,
    order: BitOrder,
}

impl BitStore {
    /// A zeroed store of `len` bytes.
    pub fn new(len: usize, order: BitOrder) -> Self {
        Self {
            data: vec![0; len],
            order,
        }
    }

    pub fn from_bytes(data: Vec<u8>, order: BitOrder) -> Self {
        Self { data, order }
    }

    pub fn order(&self) -> BitOrder {
        self.order
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads an unsigned value.
    pub fn get(&self, byte: usize, bit: usize, width: usize) -> Result<u128, StoreError> {
        bits::read_bits_at(&self.data, bit_position(byte, bit)?, width, self.order)
    }

    /// Reads a two's complement value.
    pub fn get_signed(&self, byte: usize, bit: usize, width: usize) -> Result<i128, StoreError> {
        Ok(sign_extend(self.get(byte, bit, width)?, width))
    }

    /// Writes an unsigned value; fails if it does not fit in `width` bits.
    pub fn set(&mut self, byte: usize, bit: usize, width: usize, value: i128) -> Result<(), StoreError> {
        self.write(bit_position(byte, bit)?, width, value, false)
    }

    /// Writes a two's complement value; fails if it does not fit in `width` bits.
    pub fn set_signed(
        &mut self,
        byte: usize,
        bit: usize,
        width: usize,
        value: i128,
    ) -> Result<(), StoreError> {
        self.write(bit_position(byte, bit)?, width, value, true)
    }

    /// Reads `count` consecutive unsigned values of `width` bits.
    pub fn get_array(
        &self,
        byte: usize,
        bit: usize,
        width: usize,
        count: usize,
    ) -> Result<Vec<u128>, StoreError> {
        let start = bit_position(byte, bit)?;
        self.check_span(start, width, count)?;
        (0..count)
            .map(|i| bits::read_bits_at(&self.data, start + i * width, width, self.order))
            .collect()
    }

    /// Writes consecutive unsigned values of `width` bits. Nothing is written
    /// unless every value fits.
    pub fn set_array(
        &mut self,
        byte: usize,
        bit: usize,
        width: usize,
        values: &[i128],
    ) -> Result<(), StoreError> {
        for &value in values {
            check_fits(value, width, false)?;
        }
        let start = bit_position(byte, bit)?;
        self.check_span(start, width, values.len())?;

        for (i, &value) in values.iter().enumerate() {
            self.write(start + i * width, width, value, false)?;
        }

        Ok(())
    }

    /// Reads element `index` of `field`.
    pub fn read_field(&self, field: &Field, index: usize) -> Result<i128, StoreError> {
        read_element(&self.data, self.order, field, index)
    }

    /// Writes element `index` of `field`, enforcing the field's bounds.
    pub fn write_field(&mut self, field: &Field, index: usize, value: i128) -> Result<(), StoreError> {
        let (min, max) = field.range();
        if value < min || value > max {
            return Err(StoreError::OutOfRange { value, min, max });
        }
        self.write(field.element_bit(index), field.bit_width, value, field.signed)
    }

    /// Fails unless `count` values of `width` bits from `start` lie inside
    /// the buffer.
    fn check_span(&self, start: usize, width: usize, count: usize) -> Result<(), StoreError> {
        let end = width.checked_mul(count).and_then(|n| start.checked_add(n));
        match end {
            Some(end) if end <= self.data.len() * 8 => Ok(()),
            end => Err(StoreError::OutOfBounds {
                bit_pos: start,
                end: end.unwrap_or(usize::MAX),
            }),
        }
    }

    fn write(&mut self, bit_pos: usize, width: usize, value: i128, signed: bool) -> Result<(), StoreError> {
        check_fits(value, width, signed)?;
        bits::write_bits_at(&mut self.data, bit_pos, width, value as u128, self.order)
    }
}

/// Absolute bit position of (`byte`, `bit`).
fn bit_position(byte: usize, bit: usize) -> Result<usize, StoreError> {
    byte.checked_mul(8)
        .and_then(|b| b.checked_add(bit))
        .ok_or(StoreError::OutOfBounds {
            bit_pos: usize::MAX,
            end: usize::MAX,
        })
}

fn check_fits(value: i128, width: usize, signed: bool) -> Result<(), StoreError> {
    if width > MAX_FIELD_BITS {
        return Err(StoreError::TooManyBits(width));
    }
    let (min, max) = value_range(width, signed);
    if value < min || value > max {
        return Err(StoreError::OutOfRange { value, min, max });
    }
    Ok(())
}

/// Reads element `index` of `field` from a raw buffer.
pub(crate) fn read_element(
    data: &[u8],
    order: BitOrder,
    field: &Field,
    index: usize,
) -> Result<i128, StoreError> {
    if index >= field.count() {
        return Err(StoreError::IndexOutOfBounds {
            field: field.name.clone(),
            index,
        });
    }

    let raw = bits::read_bits_at(data, field.element_bit(index), field.bit_width, order)?;
    if field.signed {
        Ok(sign_extend(raw, field.bit_width))
    } else {
        Ok(raw as i128)
    }
}
