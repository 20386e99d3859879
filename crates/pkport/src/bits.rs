//! Low-level bit read and write utilities for byte slices.
//!
//! Two addressing orders are supported:
//! - [`BitOrder::MsbFirst`]: bit 0 is the high bit of the first byte and values
//!   are assembled most significant bit first (big-endian streams).
//! - [`BitOrder::LsbFirst`]: bit 0 is the low bit of the first byte and values
//!   are assembled least significant bit first (little-endian words, as used by
//!   Game Boy Advance save data).

use crate::errors::StoreError;

/// Largest number of bits a single raw access may span.
pub const MAX_ACCESS_BITS: usize = 128;

/// Largest width a field may declare so that every value fits an `i128`.
pub const MAX_FIELD_BITS: usize = 127;

/// Order in which bits are addressed within the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    #[default]
    MsbFirst,
    LsbFirst,
}

fn check_range(data_len: usize, bit_pos: usize, n: usize) -> Result<(), StoreError> {
    if n > MAX_ACCESS_BITS {
        return Err(StoreError::TooManyBits(n));
    }

    match bit_pos.checked_add(n) {
        Some(end) if end <= data_len * 8 => Ok(()),
        end => Err(StoreError::OutOfBounds {
            bit_pos,
            end: end.unwrap_or(usize::MAX),
        }),
    }
}

fn bit_index(pos: usize, order: BitOrder) -> (usize, usize) {
    match order {
        BitOrder::MsbFirst => (pos / 8, 7 - (pos % 8)),
        BitOrder::LsbFirst => (pos / 8, pos % 8),
    }
}

/// Reads a single bit at `bit_pos`. Returns 0 or 1.
pub fn read_bit_at(data: &[u8], bit_pos: usize, order: BitOrder) -> Result<u8, StoreError> {
    check_range(data.len(), bit_pos, 1)?;
    let (byte, shift) = bit_index(bit_pos, order);

    Ok((data[byte] >> shift) & 1)
}

/// Reads `n` bits starting at `bit_pos` as an unsigned value (max 128 bits).
pub fn read_bits_at(
    data: &[u8],
    bit_pos: usize,
    n: usize,
    order: BitOrder,
) -> Result<u128, StoreError> {
    check_range(data.len(), bit_pos, n)?;

    let mut value = 0u128;
    for k in 0..n {
        let (byte, shift) = bit_index(bit_pos + k, order);
        let bit = ((data[byte] >> shift) & 1) as u128;

        match order {
            BitOrder::MsbFirst => value = (value << 1) | bit,
            BitOrder::LsbFirst => value |= bit << k,
        }
    }

    Ok(value)
}

/// Writes the low `n` bits of `value` starting at `bit_pos`. Higher bits of
/// `value` are ignored; range checking is the caller's job.
pub fn write_bits_at(
    data: &mut [u8],
    bit_pos: usize,
    n: usize,
    value: u128,
    order: BitOrder,
) -> Result<(), StoreError> {
    check_range(data.len(), bit_pos, n)?;

    for k in 0..n {
        let bit = match order {
            BitOrder::MsbFirst => (value >> (n - 1 - k)) & 1,
            BitOrder::LsbFirst => (value >> k) & 1,
        } as u8;

        let (byte, shift) = bit_index(bit_pos + k, order);
        data[byte] = (data[byte] & !(1 << shift)) | (bit << shift);
    }

    Ok(())
}

/// Sign-extends the low `bits` of `value` to a full `i128`.
pub fn sign_extend(value: u128, bits: usize) -> i128 {
    if bits == 0 {
        return 0;
    }
    let shift = MAX_ACCESS_BITS - bits.min(MAX_ACCESS_BITS);
    ((value << shift) as i128) >> shift
}

/// The inclusive range of values a field of `bits` width can hold.
///
/// `bits` is capped at [MAX_FIELD_BITS].
pub fn value_range(bits: usize, signed: bool) -> (i128, i128) {
    let bits = bits.min(MAX_FIELD_BITS);
    if bits == 0 {
        return (0, 0);
    }

    if signed {
        let half = 1i128 << (bits - 1);
        (-half, half - 1)
    } else if bits == MAX_FIELD_BITS {
        (0, i128::MAX)
    } else {
        (0, (1i128 << bits) - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bit_at() {
        let data = [0b1000_0001];
        assert_eq!(read_bit_at(&data, 0, BitOrder::MsbFirst).unwrap(), 1);
        assert_eq!(read_bit_at(&data, 1, BitOrder::MsbFirst).unwrap(), 0);
        assert_eq!(read_bit_at(&data, 0, BitOrder::LsbFirst).unwrap(), 1);
        assert_eq!(read_bit_at(&data, 6, BitOrder::LsbFirst).unwrap(), 0);
    }

    #[test]
    fn test_read_bits_msb() {
        let data = [0b11_000001, 0b10000_101];
        assert_eq!(read_bits_at(&data, 0, 2, BitOrder::MsbFirst).unwrap(), 3);
        assert_eq!(read_bits_at(&data, 2, 11, BitOrder::MsbFirst).unwrap(), 48);
        assert_eq!(read_bits_at(&data, 13, 3, BitOrder::MsbFirst).unwrap(), 5);
    }

    #[test]
    fn test_read_bits_lsb_is_little_endian() {
        let data = [0x34, 0x12];
        assert_eq!(read_bits_at(&data, 0, 16, BitOrder::LsbFirst).unwrap(), 0x1234);
        assert_eq!(read_bits_at(&data, 4, 8, BitOrder::LsbFirst).unwrap(), 0x23);
    }

    #[test]
    fn test_write_bits_preserves_neighbours() {
        let mut data = [0xFF, 0xFF];
        write_bits_at(&mut data, 4, 5, 0, BitOrder::LsbFirst).unwrap();
        assert_eq!(data, [0x0F, 0xFE]);

        let mut data = [0x00, 0x00];
        write_bits_at(&mut data, 2, 11, 48, BitOrder::MsbFirst).unwrap();
        assert_eq!(read_bits_at(&data, 2, 11, BitOrder::MsbFirst).unwrap(), 48);
        assert_eq!(read_bits_at(&data, 0, 2, BitOrder::MsbFirst).unwrap(), 0);
    }

    #[test]
    fn test_wide_values() {
        let mut data = [0u8; 16];
        let value = 0x0123_4567_89AB_CDEF_0011_2233_4455_6677u128;
        write_bits_at(&mut data, 0, 128, value, BitOrder::LsbFirst).unwrap();
        assert_eq!(read_bits_at(&data, 0, 128, BitOrder::LsbFirst).unwrap(), value);
    }

    #[test]
    fn test_read_bits_out_of_bounds() {
        let data = [0xFF];
        assert_eq!(
            read_bits_at(&data, 0, 9, BitOrder::MsbFirst).unwrap_err(),
            StoreError::OutOfBounds { bit_pos: 0, end: 9 }
        );
    }

    #[test]
    fn test_read_bits_more_than_128() {
        let data = [0u8; 32];
        assert_eq!(
            read_bits_at(&data, 0, 129, BitOrder::MsbFirst).unwrap_err(),
            StoreError::TooManyBits(129)
        );
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0b1111_1111, 8), -1);
        assert_eq!(sign_extend(0b0111_1111, 8), 127);
        assert_eq!(sign_extend(0b100, 3), -4);
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(5, false), (0, 31));
        assert_eq!(value_range(8, true), (-128, 127));
        assert_eq!(value_range(127, false), (0, i128::MAX));
    }
}
