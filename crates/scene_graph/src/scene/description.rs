//! External description support
//!
//! A loader (for instance an XML reader) hands each element over as a type
//! name, an attribute list and an optional binary blob the attributes may
//! point into. [`SceneGraph::instantiate`] creates the node through the
//! registry and lets it populate itself.

use super::{NodeId, SceneError, SceneGraph, SceneResult};

/// One `name="value"` pair of a description element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Raw attribute text
    pub value: String,
}

impl Attribute {
    /// Create an attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Value of the first attribute with the given name
pub fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
}

/// Parse an unsigned attribute, `None` when absent
pub fn parse_usize_attribute(node: &str, attributes: &[Attribute], name: &str) -> SceneResult<Option<usize>> {
    find_attribute(attributes, name)
        .map(|text| {
            text.trim().parse().map_err(|_| SceneError::Description {
                node: node.to_string(),
                reason: format!("attribute '{name}' is not an unsigned integer: '{text}'"),
            })
        })
        .transpose()
}

/// Read `count` little-endian `f32`s starting at byte `offset`
pub fn read_f32s(node: &str, blob: &[u8], offset: usize, count: usize) -> SceneResult<Vec<f32>> {
    read_words(node, blob, offset, count).map(|words| words.into_iter().map(f32::from_le_bytes).collect())
}

/// Read `count` little-endian `u32`s starting at byte `offset`
pub fn read_u32s(node: &str, blob: &[u8], offset: usize, count: usize) -> SceneResult<Vec<u32>> {
    read_words(node, blob, offset, count).map(|words| words.into_iter().map(u32::from_le_bytes).collect())
}

fn read_words(node: &str, blob: &[u8], offset: usize, count: usize) -> SceneResult<Vec<[u8; 4]>> {
    let end = count
        .checked_mul(4)
        .and_then(|len| offset.checked_add(len))
        .filter(|end| *end <= blob.len())
        .ok_or_else(|| SceneError::Description {
            node: node.to_string(),
            reason: format!("{count} words at offset {offset} exceed the {} byte blob", blob.len()),
        })?;

    Ok(blob[offset..end]
        .chunks_exact(4)
        .map(|chunk| [chunk[0], chunk[1], chunk[2], chunk[3]])
        .collect())
}

impl SceneGraph {
    /// Create a node from an external description
    ///
    /// Equivalent to [`SceneGraph::create`] followed by the node's
    /// `populate_from_description`. The node is released again if
    /// population fails.
    pub fn instantiate(
        &mut self,
        type_name: &str,
        name: &str,
        attributes: &[Attribute],
        blob: Option<&[u8]>,
    ) -> SceneResult<NodeId> {
        let id = self.create(type_name, name)?;
        let populated = self.with_behavior(id, |behavior, graph| {
            behavior.populate_from_description(graph, id, attributes, blob)
        });
        if let Err(err) = populated {
            self.release(id)?;
            return Err(err);
        }
        Ok(id)
    }
}
