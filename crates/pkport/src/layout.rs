//! Layout: the compiled, validated set of fields backing a [crate::target::BinaryTarget].

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{
    bits::{BitOrder, MAX_FIELD_BITS, value_range},
    errors::{CompileError, StoreError},
    field::{Field, FieldKind},
    serde::LayoutDef,
    store::read_element,
};

/// A value decoded from a field by [Layout::parse].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i128),
    Array(Vec<i128>),
}

/// A compiled layout: named fields over a fixed-size buffer. Use
/// [Layout::compile] to build one, then hand it to a
/// [crate::target::BinaryTarget].
#[derive(Debug, Clone)]
pub struct Layout {
    name: String,
    size: usize,
    order: BitOrder,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Layout {
    /// Compiles `fields` into a layout over `size` bytes. Fails if any field
    /// is malformed, runs past the buffer, or overlaps another non-aliased field.
    pub fn compile(
        name: impl Into<String>,
        size: usize,
        order: BitOrder,
        fields: Vec<Field>,
    ) -> Result<Self, CompileError> {
        let mut index = HashMap::with_capacity(fields.len());

        for (i, field) in fields.iter().enumerate() {
            validate_field(field, size)?;
            if index.insert(field.name.clone(), i).is_some() {
                return Err(CompileError::DuplicateField(field.name.clone()));
            }
        }

        check_overlaps(&fields)?;

        Ok(Self {
            name: name.into(),
            size,
            order,
            fields,
            index,
        })
    }

    /// Compiles a deserialized [LayoutDef].
    pub fn from_def(def: LayoutDef) -> Result<Self, CompileError> {
        let fields = def.fields.into_iter().map(Field::from).collect();
        Self::compile(def.name, def.size, def.bit_order.into(), fields)
    }

    /// Parses a JSON layout description and compiles it.
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        let def: LayoutDef = serde_json::from_str(json)
            .map_err(|e| CompileError::InvalidDefinition(e.to_string()))?;
        Self::from_def(def)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the backing buffer in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn order(&self) -> BitOrder {
        self.order
    }

    /// Fields in definition order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Decodes every field of `data` into a map of field names to [Value]s.
    pub fn parse(&self, data: &[u8]) -> Result<BTreeMap<String, Value>, StoreError> {
        if data.len() < self.size {
            return Err(StoreError::BufferTooShort {
                expected: self.size,
                actual: data.len(),
            });
        }

        let mut map = BTreeMap::new();
        for field in &self.fields {
            let value = match field.kind {
                FieldKind::Scalar => Value::Int(read_element(data, self.order, field, 0)?),
                FieldKind::Array(spec) => Value::Array(
                    (0..spec.count)
                        .map(|i| read_element(data, self.order, field, i))
                        .collect::<Result<_, _>>()?,
                ),
            };
            map.insert(field.name.clone(), value);
        }

        Ok(map)
    }
}

fn validate_field(field: &Field, size: usize) -> Result<(), CompileError> {
    if field.name.is_empty() {
        return Err(CompileError::InvalidFieldName);
    }
    if field.bit_width == 0 || field.bit_width > MAX_FIELD_BITS {
        return Err(CompileError::InvalidFieldSize(field.name.clone()));
    }
    if let FieldKind::Array(spec) = field.kind {
        if spec.count == 0 {
            return Err(CompileError::InvalidArrayCount(field.name.clone()));
        }
        if spec.stride_bits < field.bit_width {
            return Err(CompileError::InvalidArrayStride(field.name.clone()));
        }
    }
    if field.end_bit() > size * 8 {
        return Err(CompileError::OutOfLayout(field.name.clone()));
    }
    if let Some((min, max)) = field.bounds {
        let (lo, hi) = value_range(field.bit_width, field.signed);
        if min > max || min < lo || max > hi {
            return Err(CompileError::InvalidBounds(field.name.clone()));
        }
    }

    Ok(())
}

fn check_overlaps(fields: &[Field]) -> Result<(), CompileError> {
    let mut spans: Vec<(usize, usize, &str)> = fields
        .iter()
        .filter(|f| !f.alias)
        .map(|f| (f.start_bit(), f.end_bit(), f.name.as_str()))
        .collect();
    spans.sort_unstable();

    let mut reach: Option<(usize, &str)> = None;
    for (start, end, name) in spans {
        if let Some((prev_end, prev_name)) = reach {
            if start < prev_end {
                return Err(CompileError::Overlap {
                    first: prev_name.to_string(),
                    second: name.to_string(),
                });
            }
        }
        if reach.is_none_or(|(prev_end, _)| end > prev_end) {
            reach = Some((end, name));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<Field> {
        vec![
            Field::bytes("id", 0, 2),
            Field::bytes("temperature", 2, 1),
            Field::array("values", 3, 0, 8, 5),
        ]
    }

    #[test]
    fn test_compile_and_parse() {
        let layout = Layout::compile("sensor", 8, BitOrder::MsbFirst, header()).unwrap();
        let data = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

        assert_eq!(
            layout.parse(&data),
            Ok(BTreeMap::from([
                ("id".to_string(), Value::Int(258)),
                ("temperature".to_string(), Value::Int(3)),
                ("values".to_string(), Value::Array(vec![4, 5, 6, 7, 8])),
            ]))
        );
    }

    #[test]
    fn test_parse_short_buffer() {
        let layout = Layout::compile("sensor", 8, BitOrder::MsbFirst, header()).unwrap();
        assert_eq!(
            layout.parse(&[0u8; 4]).unwrap_err(),
            StoreError::BufferTooShort {
                expected: 8,
                actual: 4
            }
        );
    }

    #[test]
    fn test_overlap_rejected() {
        let fields = vec![Field::bytes("a", 0, 2), Field::bits("b", 1, 4, 4)];
        assert_eq!(
            Layout::compile("x", 2, BitOrder::LsbFirst, fields).unwrap_err(),
            CompileError::Overlap {
                first: "a".into(),
                second: "b".into()
            }
        );
    }

    #[test]
    fn test_alias_may_overlap() {
        let fields = vec![
            Field::bytes("flags", 0, 1),
            Field::flag("egg name", 0, 2).aliased(),
        ];
        assert!(Layout::compile("x", 1, BitOrder::LsbFirst, fields).is_ok());
    }

    #[test]
    fn test_invalid_fields() {
        let cases = [
            (Field::bits("zero", 0, 0, 0), CompileError::InvalidFieldSize("zero".into())),
            (Field::array("empty", 0, 0, 8, 0), CompileError::InvalidArrayCount("empty".into())),
            (
                Field::array("tight", 0, 0, 8, 2).with_stride(4),
                CompileError::InvalidArrayStride("tight".into()),
            ),
            (Field::bytes("long", 1, 4), CompileError::OutOfLayout("long".into())),
            (
                Field::bits("wide", 0, 0, 5).bounded(0, 40),
                CompileError::InvalidBounds("wide".into()),
            ),
        ];

        for (field, expected) in cases {
            assert_eq!(
                Layout::compile("x", 4, BitOrder::LsbFirst, vec![field]).unwrap_err(),
                expected
            );
        }
    }

    #[test]
    fn test_duplicate_rejected() {
        let fields = vec![Field::bytes("a", 0, 1), Field::bytes("a", 1, 1)];
        assert_eq!(
            Layout::compile("x", 2, BitOrder::LsbFirst, fields).unwrap_err(),
            CompileError::DuplicateField("a".into())
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "name": "pk3-misc",
            "size": 4,
            "bit_order": "LsbFirst",
            "fields": [
                { "name": "IVs", "byte": 0, "width": 5, "count": 6 },
                { "name": "Is Egg", "byte": 3, "bit": 6, "width": 1 },
                { "name": "Ability Slot", "byte": 3, "bit": 7, "width": 1 }
            ]
        }"#;

        let layout = Layout::from_json(json).unwrap();
        assert_eq!(layout.order(), BitOrder::LsbFirst);
        assert_eq!(layout.field("IVs").unwrap().count(), 6);
        assert_eq!(layout.field("Is Egg").unwrap().start_bit(), 30);
    }
}
