//! Object-graph serialization
//!
//! Flattens the live graph into an ordered list of objects, one per
//! reachable node, parents before children. The walk is independent of the
//! commit machinery: it neither reads nor writes modification timestamps,
//! so every call yields a full snapshot of the current graph.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{NodeId, SceneError, SceneGraph, SceneResult, Value, ValueType};

/// Verbosity/filter policy requested by the caller
///
/// Filtering is the consumer's concern; the walk records the mode and always
/// emits the complete snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SerializationMode {
    /// Every node
    #[default]
    Full,
    /// Only what changed since a previous snapshot
    DiffOnly,
}

/// One visited node and the parent it was reached through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializationObject {
    /// The visited node
    pub node: NodeId,
    /// Parent context, `None` for the root
    pub parent: Option<NodeId>,
}

/// Persistable form of a [`SerializationObject`], with indices instead of handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Position in the snapshot
    pub index: usize,
    /// Index of the parent record
    pub parent: Option<usize>,
    /// Node name
    pub name: String,
    /// Registry type name
    pub type_name: String,
    /// Declared value type
    pub value_type: ValueType,
    /// Current value
    pub value: Option<Value>,
    /// Raw flag bits
    pub flags: u32,
}

/// Serializer holding the result of the last walk
#[derive(Debug, Default)]
pub struct Serialization {
    objects: Vec<SerializationObject>,
    mode: SerializationMode,
}

impl Serialization {
    /// Create an empty serializer
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous result
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Objects of the last walk in visitation order
    pub fn objects(&self) -> &[SerializationObject] {
        &self.objects
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when nothing has been serialized
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Mode of the last walk
    pub fn mode(&self) -> SerializationMode {
        self.mode
    }

    /// Walk the graph from `root`, replacing any previous output
    ///
    /// Pre-order, children in insertion order. A node shared by several
    /// parents is emitted once, under the parent it was first reached from.
    pub fn serialize(&mut self, graph: &SceneGraph, root: NodeId, mode: SerializationMode) -> SceneResult<()> {
        self.clear();
        self.mode = mode;

        let mut visited = HashSet::new();
        let mut stack = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            let data = graph.node(node)?;
            self.objects.push(SerializationObject { node, parent });
            let children: Vec<_> = data.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, Some(node))));
        }

        log::debug!(
            "Serialized {} node(s) from '{}' ({mode:?})",
            self.objects.len(),
            graph.name_of(root)
        );
        Ok(())
    }

    /// Resolve the last walk into persistable records
    pub fn records(&self, graph: &SceneGraph) -> SceneResult<Vec<NodeRecord>> {
        let index_of: std::collections::HashMap<NodeId, usize> =
            self.objects.iter().enumerate().map(|(i, o)| (o.node, i)).collect();

        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                let data = graph.node(object.node)?;
                Ok(NodeRecord {
                    index,
                    parent: object.parent.and_then(|p| index_of.get(&p).copied()),
                    name: data.name().to_string(),
                    type_name: data.type_name().to_string(),
                    value_type: data.value_type(),
                    value: data.value().cloned(),
                    flags: data.flags().bits(),
                })
            })
            .collect()
    }

    /// Encode the last walk as pretty RON
    pub fn to_ron(&self, graph: &SceneGraph) -> SceneResult<String> {
        let records = self.records(graph)?;
        ron::ser::to_string_pretty(&records, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialization(e.to_string()))
    }
}
