//! Node storage and the node capability trait
//!
//! Every vertex of the graph is split in two halves: [`NodeData`], the state
//! shared by all node types (name, value, flags, children, timestamps), and a
//! boxed [`NodeBehavior`] holding the type-specific state and overrides.

use std::any::Any;
use std::fmt;

use slotmap::new_key_type;

use super::description::Attribute;
use super::{RenderContext, SceneGraph, SceneResult, Value, ValueType, NodeFlags};
use crate::foundation::math::AABB;
use crate::foundation::time::TimeStamp;
use crate::render::ResourceHandle;

new_key_type! {
    /// Stable handle of a node inside a [`SceneGraph`]
    pub struct NodeId;
}

/// State common to every node
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) name: String,
    pub(crate) type_name: String,
    pub(crate) value: Option<Value>,
    pub(crate) value_type: ValueType,
    pub(crate) flags: NodeFlags,
    pub(crate) min_max: Option<(Value, Value)>,
    pub(crate) last_modified: TimeStamp,
    pub(crate) children_last_modified: TimeStamp,
    pub(crate) last_committed: TimeStamp,
    /// Named children in insertion order, names unique
    pub(crate) children: Vec<(String, NodeId)>,
    /// One entry per parent holding this node
    pub(crate) parents: Vec<NodeId>,
    /// External handles plus parent links
    pub(crate) owners: usize,
}

impl NodeData {
    pub(crate) fn new(name: String, type_name: String, value_type: ValueType, now: TimeStamp) -> Self {
        Self {
            name,
            type_name,
            value: None,
            value_type,
            flags: NodeFlags::empty(),
            min_max: None,
            last_modified: now,
            children_last_modified: TimeStamp::ZERO,
            last_committed: TimeStamp::ZERO,
            children: Vec::new(),
            parents: Vec::new(),
            owners: 1,
        }
    }

    /// Node name, unique among its siblings
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry type name the node was created as
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Current value, if any
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Declared value type
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Validation and UI flags
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Min/max bounds, when set
    pub fn min_max(&self) -> Option<(&Value, &Value)> {
        self.min_max.as_ref().map(|(lo, hi)| (lo, hi))
    }

    /// When this node's own value last changed
    pub fn last_modified(&self) -> TimeStamp {
        self.last_modified
    }

    /// Newest modification seen anywhere below this node
    pub fn children_last_modified(&self) -> TimeStamp {
        self.children_last_modified
    }

    /// When the commit pass last finished this node
    pub fn last_committed(&self) -> TimeStamp {
        self.last_committed
    }

    /// True when the commit pass has work to do for this subtree
    pub fn needs_commit(&self) -> bool {
        self.last_committed < self.last_modified.max(self.children_last_modified)
    }

    /// Child handles in insertion order
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().map(|(_, id)| *id)
    }

    /// Child lookup by name
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    /// Parents holding this node
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Number of owners (external handles plus parent links)
    pub fn owner_count(&self) -> usize {
        self.owners
    }
}

/// Type-specific behavior of a node
///
/// Every hook has a no-op default so variants override only what they need.
/// Hooks taking `&mut SceneGraph` run while the behavior is detached from its
/// slot; a hook that triggers another hook on the same node does not re-enter.
pub trait NodeBehavior: Any + fmt::Debug {
    /// Declared value type of nodes built from this behavior
    fn value_type(&self) -> ValueType {
        ValueType::None
    }

    /// Establish default children; runs exactly once, right after creation
    fn init(&mut self, _graph: &mut SceneGraph, _id: NodeId) -> SceneResult<()> {
        Ok(())
    }

    /// Commit hook run before any child commits
    fn pre_commit(
        &mut self,
        _graph: &mut SceneGraph,
        _id: NodeId,
        _ctx: &mut RenderContext<'_>,
    ) -> SceneResult<()> {
        Ok(())
    }

    /// Commit hook run after every child committed
    fn post_commit(
        &mut self,
        _graph: &mut SceneGraph,
        _id: NodeId,
        _ctx: &mut RenderContext<'_>,
    ) -> SceneResult<()> {
        Ok(())
    }

    /// Emit this node's contribution to the frame
    fn render(&self, _graph: &SceneGraph, _id: NodeId, _ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        Ok(())
    }

    /// Bounding box of the subtree rooted here
    fn bounds(&self, _graph: &SceneGraph, _id: NodeId) -> AABB {
        AABB::empty()
    }

    /// Reaction to a newer children-modified timestamp
    fn children_modified(
        &mut self,
        _graph: &mut SceneGraph,
        _id: NodeId,
        _timestamp: TimeStamp,
    ) -> SceneResult<()> {
        Ok(())
    }

    /// Finish initialization from an external description
    ///
    /// The default reads a `value` attribute into the node's value.
    fn populate_from_description(
        &mut self,
        graph: &mut SceneGraph,
        id: NodeId,
        attributes: &[Attribute],
        _blob: Option<&[u8]>,
    ) -> SceneResult<()> {
        graph.populate_value(id, attributes)
    }

    /// Native geometry this node contributes to the enclosing world's model
    fn geometry(&self) -> Option<ResourceHandle> {
        None
    }

    /// True when the node stages its own model for the geometry below it
    fn stages_model(&self) -> bool {
        false
    }

    /// Hand over native resources when the node is destroyed
    fn release_resources(&mut self) -> Vec<ResourceHandle> {
        Vec::new()
    }

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
