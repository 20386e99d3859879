//! BinaryTarget: a [Layout] bound to the bytes it describes.

use std::sync::Arc;

use crate::{
    errors::StoreError,
    field::Field,
    layout::Layout,
    overrides::BytePatch,
    store::BitStore,
};

/// The destination of an export (or the source of an import): named fields
/// over one contiguous buffer.
#[derive(Debug, Clone)]
pub struct BinaryTarget {
    layout: Arc<Layout>,
    store: BitStore,
}

impl BinaryTarget {
    /// An all-zero target.
    pub fn new(layout: Arc<Layout>) -> Self {
        let store = BitStore::new(layout.size(), layout.order());
        Self { layout, store }
    }

    /// Wraps existing bytes. Extra trailing bytes are dropped.
    pub fn from_bytes(layout: Arc<Layout>, mut bytes: Vec<u8>) -> Result<Self, StoreError> {
        if bytes.len() < layout.size() {
            return Err(StoreError::BufferTooShort {
                expected: layout.size(),
                actual: bytes.len(),
            });
        }
        bytes.truncate(layout.size());
        let store = BitStore::from_bytes(bytes, layout.order());

        Ok(Self { layout, store })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn field(&self, name: &str) -> Result<&Field, StoreError> {
        self.layout
            .field(name)
            .ok_or_else(|| StoreError::UnknownField(name.to_string()))
    }

    /// Inclusive range the field accepts.
    pub fn bounds(&self, name: &str) -> Result<(i128, i128), StoreError> {
        Ok(self.field(name)?.range())
    }

    pub fn get(&self, name: &str) -> Result<i128, StoreError> {
        self.get_element(name, 0)
    }

    pub fn set(&mut self, name: &str, value: i128) -> Result<(), StoreError> {
        self.set_element(name, 0, value)
    }

    pub fn get_element(&self, name: &str, index: usize) -> Result<i128, StoreError> {
        let field = self.field(name)?;
        self.store.read_field(field, index)
    }

    pub fn set_element(&mut self, name: &str, index: usize, value: i128) -> Result<(), StoreError> {
        let field = self
            .layout
            .field(name)
            .ok_or_else(|| StoreError::UnknownField(name.to_string()))?;
        if index >= field.count() {
            return Err(StoreError::IndexOutOfBounds {
                field: name.to_string(),
                index,
            });
        }
        self.store.write_field(field, index, value)
    }

    pub fn get_array(&self, name: &str) -> Result<Vec<i128>, StoreError> {
        let field = self.field(name)?;
        (0..field.count())
            .map(|i| self.store.read_field(field, i))
            .collect()
    }

    /// Writes every element of an array field. Nothing is written unless
    /// every value is in bounds.
    pub fn set_array(&mut self, name: &str, values: &[i128]) -> Result<(), StoreError> {
        let field = self
            .layout
            .field(name)
            .ok_or_else(|| StoreError::UnknownField(name.to_string()))?;
        let (min, max) = field.range();
        if let Some(&value) = values.iter().find(|&&v| v < min || v > max) {
            return Err(StoreError::OutOfRange { value, min, max });
        }
        if values.len() > field.count() {
            return Err(StoreError::IndexOutOfBounds {
                field: name.to_string(),
                index: field.count(),
            });
        }

        for (i, &value) in values.iter().enumerate() {
            self.store.write_field(field, i, value)?;
        }
        Ok(())
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.get(name)? != 0)
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), StoreError> {
        self.set(name, value as i128)
    }

    /// Writes raw bits, bypassing field semantics.
    pub fn patch(&mut self, patch: &BytePatch) -> Result<(), StoreError> {
        self.store
            .set(patch.byte, patch.bit, patch.width, i128::from(patch.value))
    }

    pub fn store(&self) -> &BitStore {
        &self.store
    }

    pub fn bytes(&self) -> &[u8] {
        self.store.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.store.into_bytes()
    }
}
