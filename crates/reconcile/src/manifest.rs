//! Declarative manifest document
//!
//! The declarative render target appends one named block per resource and
//! renders the whole document as pretty-printed JSON with sorted keys, so
//! generated configuration can be snapshot-tested byte for byte.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;

use crate::error::ReconcileError;

/// A field value inside a manifest block.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<ManifestValue>),
    /// Symbolic reference to an attribute of another emitted block,
    /// rendered as `${block_type.name.attribute}`.
    Ref {
        block_type: String,
        name: String,
        attribute: String,
    },
}

impl ManifestValue {
    /// Symbolic reference to another block.
    pub fn reference(block_type: &str, name: &str, attribute: &str) -> Self {
        ManifestValue::Ref {
            block_type: block_type.to_string(),
            name: name.to_string(),
            attribute: attribute.to_string(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            ManifestValue::Str(s) => Value::from(s.as_str()),
            ManifestValue::Int(n) => Value::from(*n),
            ManifestValue::Bool(b) => Value::from(*b),
            ManifestValue::List(items) => {
                Value::Array(items.iter().map(ManifestValue::to_value).collect())
            }
            ManifestValue::Ref {
                block_type,
                name,
                attribute,
            } => Value::from(format!("${{{block_type}.{name}.{attribute}}}")),
        }
    }
}

impl From<&str> for ManifestValue {
    fn from(s: &str) -> Self {
        ManifestValue::Str(s.to_string())
    }
}

impl From<String> for ManifestValue {
    fn from(s: String) -> Self {
        ManifestValue::Str(s)
    }
}

impl From<i64> for ManifestValue {
    fn from(n: i64) -> Self {
        ManifestValue::Int(n)
    }
}

impl From<bool> for ManifestValue {
    fn from(b: bool) -> Self {
        ManifestValue::Bool(b)
    }
}

/// One named resource block.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceBlock {
    pub block_type: String,
    pub name: String,
    pub fields: BTreeMap<String, ManifestValue>,
}

/// The shared declarative output document.
///
/// Blocks keep their emission order internally; rendering sorts by block
/// type and name, so the output depends only on what was emitted.
#[derive(Debug, Default)]
pub struct ManifestDoc {
    blocks: Vec<ResourceBlock>,
}

impl ManifestDoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one named block.
    ///
    /// Emitting the same (type, name) pair twice is an integrity error.
    pub fn emit(
        &mut self,
        block_type: &str,
        name: &str,
        fields: BTreeMap<String, ManifestValue>,
    ) -> Result<(), ReconcileError> {
        if self
            .blocks
            .iter()
            .any(|b| b.block_type == block_type && b.name == name)
        {
            return Err(ReconcileError::DuplicateBlock {
                block_type: block_type.to_string(),
                name: name.to_string(),
            });
        }
        self.blocks.push(ResourceBlock {
            block_type: block_type.to_string(),
            name: name.to_string(),
            fields,
        });
        Ok(())
    }

    /// Emitted blocks, in emission order.
    pub fn blocks(&self) -> &[ResourceBlock] {
        &self.blocks
    }

    /// Render the document as deterministic pretty-printed JSON.
    pub fn render(&self) -> String {
        let mut resources: BTreeMap<&str, BTreeMap<&str, Value>> = BTreeMap::new();
        for block in &self.blocks {
            let body: BTreeMap<&str, Value> = block
                .fields
                .iter()
                .map(|(key, value)| (key.as_str(), value.to_value()))
                .collect();
            resources
                .entry(block.block_type.as_str())
                .or_default()
                .insert(block.name.as_str(), serde_json::to_value(body).expect(
                    "manifest field maps always serialize",
                ));
        }

        let doc = BTreeMap::from([("resource", resources)]);
        let mut out =
            serde_json::to_string_pretty(&doc).expect("manifest documents always serialize");
        out.push('\n');
        out
    }

    /// Write the rendered document to a file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}
