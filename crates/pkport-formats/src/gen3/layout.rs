//! The unencrypted 80-byte pk3 box structure.
//!
//! Header first, then the four substructures in Growth, Attacks, EVs and
//! Misc order. All values are little-endian.

use std::sync::{Arc, LazyLock};

use pkport::{bits::BitOrder, errors::CompileError, field::Field, layout::Layout};

pub const FORMAT: &str = "pk3";
pub const SIZE: usize = 80;
/// Size of a party pk3; the extra battle stats are ignored.
pub const PARTY_SIZE: usize = 100;

pub const NICKNAME_LEN: usize = 10;
pub const OT_LEN: usize = 7;

/// Bytes covered by the checksum.
pub const CHECKSUMMED: std::ops::Range<usize> = 0x20..0x50;

fn fields() -> Vec<Field> {
    vec![
        // Header
        Field::bytes("PID", 0x00, 4),
        Field::bytes("TID", 0x04, 2),
        Field::bytes("SID", 0x06, 2),
        Field::array("Nickname", 0x08, 0, 8, NICKNAME_LEN),
        Field::bytes("Language", 0x12, 1),
        Field::flag("Bad Egg", 0x13, 0),
        Field::flag("Has Species", 0x13, 1),
        Field::flag("Use Egg Name", 0x13, 2),
        Field::array("OT", 0x14, 0, 8, OT_LEN),
        Field::array("Markings", 0x1B, 0, 1, 4),
        Field::bytes("Checksum", 0x1C, 2),
        // Growth
        Field::bytes("Species", 0x20, 2),
        Field::bytes("Item", 0x22, 2),
        Field::bytes("Experience", 0x24, 4),
        Field::array("PP Ups", 0x28, 0, 2, 4),
        Field::bytes("Friendship", 0x29, 1),
        // Attacks
        Field::array("Moves", 0x2C, 0, 16, 4),
        Field::array("PP", 0x34, 0, 8, 4),
        // EVs & Condition
        Field::array("EVs", 0x38, 0, 8, 6),
        Field::array("Contest Stats", 0x3E, 0, 8, 6),
        // Misc: Pokérus holds days then strain, one nibble each.
        Field::array("Pokérus", 0x44, 0, 4, 2),
        Field::bytes("Met Location", 0x45, 1),
        Field::bits("Met Level", 0x46, 0, 7).bounded(0, 100),
        Field::bits("Origin Game", 0x46, 7, 4),
        Field::bits("Ball", 0x47, 3, 4).bounded(0, 12),
        Field::flag("OT Gender", 0x47, 7),
        Field::array("IVs", 0x48, 0, 5, 6),
        Field::flag("Is Egg", 0x4B, 6),
        Field::flag("Ability Slot", 0x4B, 7),
        Field::array("Contest Ribbons", 0x4C, 0, 3, 5).bounded(0, 4),
        Field::array("Ribbons", 0x4D, 7, 1, 12),
        Field::flag("Fateful Encounter", 0x4F, 7),
    ]
}

static LAYOUT: LazyLock<Result<Arc<Layout>, CompileError>> =
    LazyLock::new(|| Layout::compile(FORMAT, SIZE, BitOrder::LsbFirst, fields()).map(Arc::new));

/// The shared pk3 layout, compiled on first use.
pub fn layout() -> Result<Arc<Layout>, CompileError> {
    LAYOUT.clone()
}

/// Sum of the little-endian words over the substructures.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .get(CHECKSUMMED)
        .unwrap_or_default()
        .chunks_exact(2)
        .fold(0u16, |sum, w| sum.wrapping_add(u16::from_le_bytes([w[0], w[1]])))
}

#[cfg(test)]
mod tests {
    use pkport::target::BinaryTarget;

    use super::*;

    #[test]
    fn test_layout_compiles_without_overlaps() {
        let layout = layout().unwrap();
        assert_eq!(layout.size(), SIZE);
        assert_eq!(layout.order(), BitOrder::LsbFirst);
        assert!(layout.field("Fateful Encounter").is_some());
    }

    #[test]
    fn test_packed_misc_fields() {
        let mut target = BinaryTarget::new(layout().unwrap());
        target.set("Met Level", 5).unwrap();
        target.set("Origin Game", 3).unwrap();
        target.set("Ball", 4).unwrap();
        target.set_bool("OT Gender", true).unwrap();
        // level | game << 7 | ball << 11 | gender << 15
        assert_eq!(&target.bytes()[0x46..0x48], &0xA185u16.to_le_bytes());

        target.set_array("IVs", &[31, 0, 0, 0, 0, 31]).unwrap();
        target.set_bool("Is Egg", true).unwrap();
        let ivs = u32::from_le_bytes(target.bytes()[0x48..0x4C].try_into().unwrap());
        assert_eq!(ivs, 31 | (31 << 25) | (1 << 30));

        target.set_element("Ribbons", 0, 1).unwrap();
        target.set_bool("Fateful Encounter", true).unwrap();
        let ribbons = u32::from_le_bytes(target.bytes()[0x4C..0x50].try_into().unwrap());
        assert_eq!(ribbons, (1 << 15) | (1 << 31));
    }

    #[test]
    fn test_checksum_sums_words() {
        let mut bytes = vec![0u8; SIZE];
        bytes[0x20] = 0x01;
        bytes[0x21] = 0x02;
        bytes[0x4E] = 0xFF;
        bytes[0x4F] = 0xFF;
        assert_eq!(checksum(&bytes), 0x0200);
        assert_eq!(checksum(&[]), 0);
    }
}
