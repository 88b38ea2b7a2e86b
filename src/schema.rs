//! Schema management for the vector columns of a collection.
//!
//! The schema carried at this layer is deliberately narrow: the sealed-search
//! path only needs to resolve a field identifier to its declared data type
//! and dimensionality before wrapping the query buffer for the index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XystonError};

/// Identifier of a field (column) within a collection schema.
pub type FieldId = u64;

/// Data types of vector fields served by sealed-segment search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Dense float32 vectors.
    FloatVector,
    /// Packed binary vectors (one bit per dimension).
    BinaryVector,
}

/// Metadata for a single vector field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Field (column) name.
    name: String,
    /// Declared data type.
    data_type: DataType,
    /// Vector dimensionality.
    dim: usize,
}

impl FieldEntry {
    /// Create a new field entry.
    pub fn new(name: impl Into<String>, data_type: DataType, dim: usize) -> Self {
        FieldEntry {
            name: name.into(),
            data_type,
            dim,
        }
    }

    /// Get the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the declared data type.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Get the vector dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

/// A schema maps field identifiers to their vector field metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: HashMap<FieldId, FieldEntry>,
}

impl Schema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Schema {
            fields: HashMap::new(),
        }
    }

    /// Add a field to the schema.
    pub fn add_field(&mut self, field_id: FieldId, entry: FieldEntry) -> Result<()> {
        if entry.name().is_empty() {
            return Err(XystonError::schema("Field name cannot be empty"));
        }
        if entry.dim() == 0 {
            return Err(XystonError::schema(format!(
                "Field '{}' must have a non-zero dimension",
                entry.name()
            )));
        }
        if self.fields.contains_key(&field_id) {
            return Err(XystonError::schema(format!(
                "Field id {field_id} already exists"
            )));
        }

        self.fields.insert(field_id, entry);
        Ok(())
    }

    /// Get a field entry by id.
    pub fn get_field(&self, field_id: FieldId) -> Option<&FieldEntry> {
        self.fields.get(&field_id)
    }

    /// Get a field entry by id, failing if it is unknown.
    pub fn field(&self, field_id: FieldId) -> Result<&FieldEntry> {
        self.get_field(field_id)
            .ok_or_else(|| XystonError::schema(format!("Unknown field id {field_id}")))
    }

    /// Check if a field exists.
    pub fn has_field(&self, field_id: FieldId) -> bool {
        self.fields.contains_key(&field_id)
    }

    /// Get the number of fields in the schema.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
