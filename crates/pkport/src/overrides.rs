//! Raw byte patches: the escape hatch for writing bits no tag covers.
//!
//! A pku document may carry
//! `"Byte Override": { "<format>": [ { "byte": 19, "bit": 2, "width": 1, "value": 1 } ] }`.
//! Patches are checked against the target when collected and applied after
//! every other write, so they always win.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    alert::Alert,
    bits::{MAX_FIELD_BITS, value_range},
    errors::PortError,
    record::SemanticRecord,
    target::BinaryTarget,
};

/// Key of the byte override tag.
pub const BYTE_OVERRIDE: &str = "Byte Override";

/// Raw bits to write at a fixed position, in the target's bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BytePatch {
    pub byte: usize,
    #[serde(default)]
    pub bit: usize,
    #[serde(default = "default_width")]
    pub width: usize,
    pub value: i64,
}

fn default_width() -> usize {
    8
}

impl BytePatch {
    /// A whole-byte patch.
    pub fn byte(byte: usize, value: u8) -> Self {
        Self {
            byte,
            bit: 0,
            width: 8,
            value: i64::from(value),
        }
    }

    /// Whether the patch fits a target of `size` bytes.
    pub fn fits(&self, size: usize) -> bool {
        let (_, max) = value_range(self.width, false);
        self.bit < 8
            && (1..=MAX_FIELD_BITS).contains(&self.width)
            && self.value >= 0
            && i128::from(self.value) <= max
            && self
                .byte
                .checked_mul(8)
                .and_then(|bits| bits.checked_add(self.bit + self.width))
                .is_some_and(|end| end <= size * 8)
    }
}

/// Reads the patches for `format` from `record`, keeping those that fit a
/// target of `size` bytes. Rejected entries are reported in one alert.
pub fn collect(record: &SemanticRecord, format: &str, size: usize) -> (Vec<BytePatch>, Option<Alert>) {
    let Some(entries) = record.get(&[BYTE_OVERRIDE, format]) else {
        return (Vec::new(), None);
    };
    let Some(entries) = entries.as_array() else {
        let alert = Alert::new(
            BYTE_OVERRIDE,
            format!("The {format} byte override is not a list of patches, ignoring it."),
        );
        return (Vec::new(), Some(alert));
    };

    let mut patches = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match parse(entry) {
            Some(patch) if patch.fits(size) => patches.push(patch),
            _ => rejected.push(i.to_string()),
        }
    }

    let alert = (!rejected.is_empty()).then(|| {
        Alert::new(
            BYTE_OVERRIDE,
            format!(
                "Byte override entries {} are invalid for {format} and were ignored.",
                rejected.join(", ")
            ),
        )
    });

    (patches, alert)
}

fn parse(entry: &Value) -> Option<BytePatch> {
    BytePatch::deserialize(entry).ok()
}

/// Writes `patches` in order.
pub fn apply(target: &mut BinaryTarget, patches: &[BytePatch]) -> Result<(), PortError> {
    for patch in patches {
        target.patch(patch)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{bits::BitOrder, field::Field, layout::Layout};

    fn record() -> SemanticRecord {
        SemanticRecord::from_value(json!({
            "Byte Override": {
                "pk3": [
                    { "byte": 0, "value": 171 },
                    { "byte": 1, "bit": 4, "width": 4, "value": 15 },
                    { "byte": 3, "width": 16, "value": 1 },
                    { "byte": 2, "value": -1 },
                    { "value": 3 },
                    { "byte": 2, "bit": 0, "width": 2, "value": 4 }
                ],
                "pk4": "nonsense"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_collect_filters_and_alerts_once() {
        let (patches, alert) = collect(&record(), "pk3", 4);
        assert_eq!(
            patches,
            vec![
                BytePatch::byte(0, 171),
                BytePatch {
                    byte: 1,
                    bit: 4,
                    width: 4,
                    value: 15
                }
            ]
        );
        assert_eq!(
            alert.unwrap().message(),
            "Byte override entries 2, 3, 4, 5 are invalid for pk3 and were ignored."
        );
    }

    #[test]
    fn test_huge_offsets_are_rejected() {
        let record = SemanticRecord::from_value(json!({
            "Byte Override": { "pk3": [
                { "byte": 2305843009213693952u64, "value": 1 },
                { "byte": u64::MAX, "bit": 7, "width": 1, "value": 1 }
            ] }
        }))
        .unwrap();
        let (patches, alert) = collect(&record, "pk3", 4);
        assert!(patches.is_empty());
        assert_eq!(
            alert.unwrap().message(),
            "Byte override entries 0, 1 are invalid for pk3 and were ignored."
        );
    }

    #[test]
    fn test_collect_missing_or_malformed() {
        assert_eq!(collect(&record(), "pk5", 4), (Vec::new(), None));
        let (patches, alert) = collect(&record(), "pk4", 4);
        assert!(patches.is_empty());
        assert!(alert.is_some());
    }

    #[test]
    fn test_apply_overwrites_fields() {
        let layout = Layout::compile(
            "t",
            4,
            BitOrder::LsbFirst,
            vec![Field::bytes("A", 0, 2), Field::bytes("B", 2, 2)],
        )
        .unwrap();
        let mut target = BinaryTarget::new(Arc::new(layout));
        target.set("A", 0x0102).unwrap();

        let (patches, _) = collect(&record(), "pk3", 4);
        apply(&mut target, &patches).unwrap();

        assert_eq!(target.bytes(), &[171, 0xF1, 0, 0]);
    }
}
