//! Scene graph arena
//!
//! Nodes live in a `slotmap` arena and are addressed by [`NodeId`]. A node
//! may be a child of several parents; each parent link and each external
//! handle counts as one owner, and a node is destroyed when its last owner
//! releases it. Destruction cascades into children that lose their last
//! owner. Graphs must be acyclic: this is a caller obligation and is not
//! checked.
//!
//! Modification tracking uses a per-graph [`LogicalClock`]. Changing a value
//! stamps the node and pushes a children-modified signal to every ancestor,
//! so `children_last_modified(n) >= last_modified(c)` holds for every child
//! `c` of `n` after each mutation.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::description::{find_attribute, Attribute};
use super::node::{NodeBehavior, NodeData, NodeId};
use super::registry::{self, NodeRegistry};
use super::{NodeFlags, SceneError, SceneResult, Value};
use crate::config::SceneConfig;
use crate::foundation::math::AABB;
use crate::foundation::time::{LogicalClock, TimeStamp};
use crate::render::{RenderBackend, ResourceHandle};

/// What `add` does when the parent already has a child with the same name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChildPolicy {
    /// Replace the existing entry, keeping its position
    #[default]
    Replace,
    /// Fail with [`SceneError::DuplicateChild`]
    Reject,
}

#[derive(Debug)]
struct NodeSlot {
    data: NodeData,
    /// `None` while a hook of this node is running
    behavior: Option<Box<dyn NodeBehavior>>,
}

/// Arena holding every node of one scene
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, NodeSlot>,
    clock: LogicalClock,
    child_policy: ChildPolicy,
    fail_fast: bool,
    /// Resources of destroyed nodes, released at the next commit
    retired: Vec<ResourceHandle>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create an empty graph with default policies
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            clock: LogicalClock::new(),
            child_policy: ChildPolicy::Replace,
            fail_fast: true,
            retired: Vec::new(),
        }
    }

    /// Create an empty graph using the policies of a configuration
    pub fn with_config(config: &SceneConfig) -> Self {
        Self {
            child_policy: config.child_policy,
            fail_fast: config.fail_fast,
            ..Self::new()
        }
    }

    /// Duplicate-child policy used by [`SceneGraph::add`]
    pub fn child_policy(&self) -> ChildPolicy {
        self.child_policy
    }

    /// Whether traversals stop at the first error
    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the graph holds no node
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Latest timestamp handed out by this graph
    pub fn now(&self) -> TimeStamp {
        self.clock.now()
    }

    pub(crate) fn tick(&mut self) -> TimeStamp {
        self.clock.tick()
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a node of a registered type through the process-wide registry
    ///
    /// The returned handle counts as one owner; release it with
    /// [`SceneGraph::release`] once the node is linked under a parent.
    pub fn create(&mut self, type_name: &str, name: &str) -> SceneResult<NodeId> {
        let behavior = registry::create(type_name)?;
        self.insert_node(behavior, type_name, name)
    }

    /// Create a node through a specific registry
    pub fn create_from(
        &mut self,
        registry: &NodeRegistry,
        type_name: &str,
        name: &str,
    ) -> SceneResult<NodeId> {
        let behavior = registry.create(type_name)?;
        self.insert_node(behavior, type_name, name)
    }

    /// Insert an already constructed behavior and run its `init`
    pub fn insert_node(
        &mut self,
        behavior: Box<dyn NodeBehavior>,
        type_name: &str,
        name: &str,
    ) -> SceneResult<NodeId> {
        let now = self.clock.tick();
        let data = NodeData::new(name.to_string(), type_name.to_string(), behavior.value_type(), now);
        let id = self.nodes.insert(NodeSlot { data, behavior: Some(behavior) });

        log::trace!("Created {type_name} node '{name}'");
        if let Err(err) = self.with_behavior(id, |behavior, graph| behavior.init(graph, id)) {
            self.release(id)?;
            return Err(err);
        }
        Ok(id)
    }

    /// Create a value node with an initial value and flags
    pub fn create_value_node(
        &mut self,
        name: &str,
        type_name: &str,
        value: impl Into<Value>,
        flags: NodeFlags,
    ) -> SceneResult<NodeId> {
        let id = self.create(type_name, name)?;
        self.node_mut(id)?.flags = flags;
        if let Err(err) = self.set_value(id, value) {
            self.release(id)?;
            return Err(err);
        }
        Ok(id)
    }

    /// Create a node and link it under `parent`, leaving the parent as sole owner
    pub fn create_child(&mut self, parent: NodeId, name: &str, type_name: &str) -> SceneResult<NodeId> {
        let child = self.create(type_name, name)?;
        self.adopt(parent, child)
    }

    /// Create a value node and link it under `parent`, leaving the parent as sole owner
    pub fn create_value_child(
        &mut self,
        parent: NodeId,
        name: &str,
        type_name: &str,
        value: impl Into<Value>,
        flags: NodeFlags,
    ) -> SceneResult<NodeId> {
        let child = self.create_value_node(name, type_name, value, flags)?;
        self.adopt(parent, child)
    }

    /// Link a freshly created node and drop the creator's handle
    fn adopt(&mut self, parent: NodeId, child: NodeId) -> SceneResult<NodeId> {
        let linked = self.add(parent, child);
        self.release(child)?;
        linked.map(|()| child)
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    /// True when the handle refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Shared state of a node
    pub fn node(&self, id: NodeId) -> SceneResult<&NodeData> {
        self.nodes.get(id).map(|slot| &slot.data).ok_or(SceneError::InvalidNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut NodeData> {
        self.nodes.get_mut(id).map(|slot| &mut slot.data).ok_or(SceneError::InvalidNode(id))
    }

    /// Node name, or `"<dead>"` for stale handles (used in diagnostics)
    pub fn name_of(&self, id: NodeId) -> &str {
        self.nodes.get(id).map_or("<dead>", |slot| slot.data.name.as_str())
    }

    /// Child handles in insertion order
    pub fn children(&self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        Ok(self.node(id)?.children().collect())
    }

    /// Named child lookup
    pub fn get_child(&self, parent: NodeId, name: &str) -> SceneResult<NodeId> {
        let data = self.node(parent)?;
        data.child(name).ok_or_else(|| SceneError::NoSuchChild {
            parent: data.name.clone(),
            child: name.to_string(),
        })
    }

    /// Current value of a node
    pub fn value(&self, id: NodeId) -> SceneResult<Option<&Value>> {
        Ok(self.node(id)?.value())
    }

    /// Current value of a named child
    pub fn child_value(&self, parent: NodeId, name: &str) -> SceneResult<Option<&Value>> {
        let child = self.get_child(parent, name)?;
        self.value(child)
    }

    /// Behavior of a node downcast to its concrete type
    ///
    /// Returns `None` for another type, or while one of the node's own
    /// hooks is running.
    pub fn behavior<T: NodeBehavior>(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id)?.behavior.as_ref()?.as_any().downcast_ref::<T>()
    }

    /// Mutable behavior downcast
    ///
    /// Changes made through this reference are invisible to the commit pass
    /// until [`SceneGraph::touch`] stamps the node.
    pub fn behavior_mut<T: NodeBehavior>(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id)?.behavior.as_mut()?.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn behavior_dyn(&self, id: NodeId) -> Option<&dyn NodeBehavior> {
        self.nodes.get(id)?.behavior.as_deref()
    }

    /// Run `f` with the node's behavior detached from the arena
    ///
    /// Returns `Ok(None)` when the behavior is already detached, which is how
    /// re-entrant hooks on the same node are suppressed.
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn NodeBehavior, &mut SceneGraph) -> SceneResult<R>,
    ) -> SceneResult<Option<R>> {
        let slot = self.nodes.get_mut(id).ok_or(SceneError::InvalidNode(id))?;
        let Some(mut behavior) = slot.behavior.take() else {
            return Ok(None);
        };
        let result = f(behavior.as_mut(), self);
        match self.nodes.get_mut(id) {
            Some(slot) => slot.behavior = Some(behavior),
            // The hook released its own node; its resources still need retiring
            None => self.retired.extend(behavior.release_resources()),
        }
        result.map(Some)
    }

    // ------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------

    /// Link `child` under `parent`, keyed by the child's name
    ///
    /// An existing entry with the same name is replaced in place under
    /// [`ChildPolicy::Replace`]. Advances the parent's children-modified
    /// timestamp and propagates it upward.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let child_name = self.node(child)?.name.clone();
        let policy = self.child_policy;
        let existing = self.node(parent)?.child(&child_name);

        match existing {
            Some(current) if current == child => {}
            Some(current) => {
                if policy == ChildPolicy::Reject {
                    return Err(SceneError::DuplicateChild {
                        parent: self.node(parent)?.name.clone(),
                        child: child_name,
                    });
                }
                let data = self.node_mut(parent)?;
                if let Some(entry) = data.children.iter_mut().find(|(name, _)| *name == child_name) {
                    entry.1 = child;
                }
                self.link_parent(parent, child)?;
                self.unlink_parent(parent, current)?;
                log::debug!("Replaced child '{child_name}' of '{}'", self.name_of(parent));
            }
            None => {
                self.node_mut(parent)?.children.push((child_name, child));
                self.link_parent(parent, child)?;
            }
        }

        let now = self.clock.tick();
        self.set_children_modified(parent, now)
    }

    /// Unlink the named child from `parent`, returning its handle
    ///
    /// The child is destroyed if the parent link was its last owner.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> SceneResult<NodeId> {
        let child = self.get_child(parent, name)?;
        self.node_mut(parent)?.children.retain(|(n, _)| n != name);
        self.unlink_parent(parent, child)?;
        let now = self.clock.tick();
        self.set_children_modified(parent, now)?;
        Ok(child)
    }

    fn link_parent(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let data = self.node_mut(child)?;
        data.parents.push(parent);
        data.owners += 1;
        Ok(())
    }

    fn unlink_parent(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let data = self.node_mut(child)?;
        if let Some(pos) = data.parents.iter().position(|p| *p == parent) {
            data.parents.swap_remove(pos);
        }
        self.release(child)
    }

    // ------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------

    /// Take an additional external handle on a node
    pub fn retain(&mut self, id: NodeId) -> SceneResult<()> {
        self.node_mut(id)?.owners += 1;
        Ok(())
    }

    /// Drop one owner; destroys the node when none remain
    pub fn release(&mut self, id: NodeId) -> SceneResult<()> {
        let data = self.node_mut(id)?;
        data.owners = data.owners.saturating_sub(1);
        if data.owners == 0 {
            self.destroy(id);
        }
        Ok(())
    }

    fn destroy(&mut self, id: NodeId) {
        let Some(mut slot) = self.nodes.remove(id) else {
            return;
        };
        log::trace!("Destroying {} node '{}'", slot.data.type_name, slot.data.name);
        if let Some(behavior) = slot.behavior.as_mut() {
            self.retired.extend(behavior.release_resources());
        }
        for (_, child) in slot.data.children {
            if let Some(child_slot) = self.nodes.get_mut(child) {
                if let Some(pos) = child_slot.data.parents.iter().position(|p| *p == id) {
                    child_slot.data.parents.swap_remove(pos);
                }
            }
            // Children only disappear here when this was their last owner
            let _ = self.release(child);
        }
    }

    /// Resources waiting to be released by the backend
    pub fn retired_resources(&self) -> &[ResourceHandle] {
        &self.retired
    }

    /// Release resources of destroyed nodes through the backend
    pub fn release_retired(&mut self, backend: &mut dyn RenderBackend) {
        for handle in self.retired.drain(..) {
            backend.release(handle);
        }
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Set a node's value
    ///
    /// Fails with [`SceneError::TypeMismatch`] when the value's type differs
    /// from the declared type. Values are clamped into min/max bounds when
    /// the node is flagged `VALID_MIN_MAX`.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<Value>) -> SceneResult<()> {
        let value = value.into();
        let data = self.node(id)?;
        if value.value_type() != data.value_type {
            return Err(SceneError::TypeMismatch {
                node: data.name.clone(),
                expected: data.value_type,
                found: value.value_type(),
            });
        }

        let value = match (&data.min_max, data.flags.contains(NodeFlags::VALID_MIN_MAX)) {
            (Some((lo, hi)), true) => value.clamped(lo, hi),
            _ => value,
        };
        self.node_mut(id)?.value = Some(value);
        self.touch(id)
    }

    /// Set min/max bounds on a node flagged `VALID_MIN_MAX`
    ///
    /// The current value is clamped immediately; later values are clamped
    /// when set.
    pub fn set_min_max(&mut self, id: NodeId, lo: impl Into<Value>, hi: impl Into<Value>) -> SceneResult<()> {
        let (lo, hi) = (lo.into(), hi.into());
        let data = self.node(id)?;
        if !data.flags.contains(NodeFlags::VALID_MIN_MAX) {
            return Err(SceneError::InvalidMinMax(data.name.clone()));
        }
        for bound in [&lo, &hi] {
            if bound.value_type() != data.value_type {
                return Err(SceneError::TypeMismatch {
                    node: data.name.clone(),
                    expected: data.value_type,
                    found: bound.value_type(),
                });
            }
        }

        let clamped = data.value.as_ref().map(|v| v.clamped(&lo, &hi));
        let changed = clamped.as_ref() != data.value.as_ref();
        let data = self.node_mut(id)?;
        data.min_max = Some((lo, hi));
        if changed {
            data.value = clamped;
            self.touch(id)?;
        }
        Ok(())
    }

    /// Replace a node's flags
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> SceneResult<()> {
        self.node_mut(id)?.flags = flags;
        Ok(())
    }

    /// Stamp a node as modified and notify its ancestors
    pub fn touch(&mut self, id: NodeId) -> SceneResult<()> {
        let now = self.clock.tick();
        let data = self.node_mut(id)?;
        data.last_modified = now;
        let parents = data.parents.clone();
        for parent in parents {
            self.set_children_modified(parent, now)?;
        }
        Ok(())
    }

    /// Record that something below `id` changed at `timestamp`
    ///
    /// Only a timestamp newer than the node's current children-modified
    /// stamp has any effect: the node's reactive hook runs once, then the
    /// signal is forwarded to every parent. Errors from the hook are
    /// returned after forwarding so ancestors never miss the stamp.
    pub fn set_children_modified(&mut self, id: NodeId, timestamp: TimeStamp) -> SceneResult<()> {
        let data = self.node_mut(id)?;
        if timestamp <= data.children_last_modified {
            return Ok(());
        }
        data.children_last_modified = timestamp;
        let parents = data.parents.clone();

        let reaction = self.with_behavior(id, |behavior, graph| {
            behavior.children_modified(graph, id, timestamp)
        });

        for parent in parents {
            if self.contains(parent) {
                self.set_children_modified(parent, timestamp)?;
            }
        }
        reaction.map(|_| ())
    }

    /// Read a `value` attribute into the node's value, if present
    pub fn populate_value(&mut self, id: NodeId, attributes: &[Attribute]) -> SceneResult<()> {
        let Some(text) = find_attribute(attributes, "value") else {
            return Ok(());
        };
        let data = self.node(id)?;
        let value = Value::parse(data.value_type, text).map_err(|reason| SceneError::Description {
            node: data.name.clone(),
            reason,
        })?;
        self.set_value(id, value)
    }

    // ------------------------------------------------------------------
    // Bounds
    // ------------------------------------------------------------------

    /// Axis-aligned bounds of the subtree rooted at `id`
    pub fn bounds(&self, id: NodeId) -> SceneResult<AABB> {
        let slot = self.nodes.get(id).ok_or(SceneError::InvalidNode(id))?;
        Ok(slot
            .behavior
            .as_ref()
            .map_or_else(AABB::empty, |behavior| behavior.bounds(self, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::scene::ValueType;

    fn max_child_modified(graph: &SceneGraph, id: NodeId) -> TimeStamp {
        graph
            .children(id)
            .unwrap()
            .into_iter()
            .map(|c| graph.node(c).unwrap().last_modified())
            .max()
            .unwrap_or(TimeStamp::ZERO)
    }

    #[test]
    fn test_add_and_get_child() {
        let mut graph = SceneGraph::new();
        let group = graph.create("Group", "root").unwrap();
        let child = graph.create_value_child(group, "answer", "int", 42, NodeFlags::empty()).unwrap();

        assert_eq!(graph.get_child(group, "answer").unwrap(), child);
        assert_eq!(graph.child_value(group, "answer").unwrap(), Some(&Value::Int(42)));
        assert!(matches!(
            graph.get_child(group, "missing"),
            Err(SceneError::NoSuchChild { .. })
        ));
    }

    #[test]
    fn test_set_value_type_mismatch() {
        let mut graph = SceneGraph::new();
        let node = graph.create("float", "f").unwrap();

        assert!(graph.set_value(node, 1.0_f32).is_ok());
        let err = graph.set_value(node, "text").unwrap_err();
        assert!(matches!(
            err,
            SceneError::TypeMismatch { expected: ValueType::Float, found: ValueType::String, .. }
        ));
        assert_eq!(graph.value(node).unwrap(), Some(&Value::Float(1.0)));
    }

    #[test]
    fn test_structural_nodes_reject_values() {
        let mut graph = SceneGraph::new();
        let group = graph.create("Group", "g").unwrap();
        assert!(matches!(graph.set_value(group, 1), Err(SceneError::TypeMismatch { .. })));
    }

    #[test]
    fn test_dirty_propagation_monotonicity() {
        let mut graph = SceneGraph::new();
        let root = graph.create("Group", "root").unwrap();
        let inner = graph.create_child(root, "inner", "Group").unwrap();
        let leaf = graph.create_value_child(inner, "leaf", "float", 0.0_f32, NodeFlags::empty()).unwrap();

        for step in 0..5 {
            graph.set_value(leaf, step as f32).unwrap();
            for node in [root, inner] {
                assert!(graph.node(node).unwrap().children_last_modified() >= max_child_modified(&graph, node));
            }
            let extra = graph.create_value_node(&format!("extra{step}"), "int", step, NodeFlags::empty()).unwrap();
            graph.add(inner, extra).unwrap();
            graph.release(extra).unwrap();
            for node in [root, inner] {
                assert!(graph.node(node).unwrap().children_last_modified() >= max_child_modified(&graph, node));
            }
        }
        assert!(graph.node(root).unwrap().children_last_modified() >= graph.node(leaf).unwrap().last_modified());
    }

    #[test]
    fn test_replace_keeps_position_and_destroys_old() {
        let mut graph = SceneGraph::new();
        let group = graph.create("Group", "g").unwrap();
        let first = graph.create_value_child(group, "a", "int", 1, NodeFlags::empty()).unwrap();
        graph.create_value_child(group, "b", "int", 2, NodeFlags::empty()).unwrap();
        let replacement = graph.create_value_child(group, "a", "int", 3, NodeFlags::empty()).unwrap();

        let names: Vec<_> = graph
            .children(group)
            .unwrap()
            .into_iter()
            .map(|c| graph.name_of(c).to_string())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(graph.get_child(group, "a").unwrap(), replacement);
        assert!(!graph.contains(first));
    }

    #[test]
    fn test_reject_policy() {
        let config = SceneConfig::new().with_child_policy(ChildPolicy::Reject);
        let mut graph = SceneGraph::with_config(&config);
        let group = graph.create("Group", "g").unwrap();
        graph.create_value_child(group, "a", "int", 1, NodeFlags::empty()).unwrap();

        let result = graph.create_value_child(group, "a", "int", 2, NodeFlags::empty());
        assert!(matches!(result, Err(SceneError::DuplicateChild { .. })));
        assert_eq!(graph.child_value(group, "a").unwrap(), Some(&Value::Int(1)));
        // group and the first child; the rejected node was released
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_min_max_clamps() {
        let mut graph = SceneGraph::new();
        let plain = graph.create_value_node("plain", "float", 0.5_f32, NodeFlags::empty()).unwrap();
        assert!(matches!(
            graph.set_min_max(plain, 0.0_f32, 1.0_f32),
            Err(SceneError::InvalidMinMax(_))
        ));

        let slider = graph
            .create_value_node("slider", "vec3f", Vec3::repeat(5.0), NodeFlags::VALID_MIN_MAX)
            .unwrap();
        assert!(matches!(
            graph.set_min_max(slider, 0.0_f32, 1.0_f32),
            Err(SceneError::TypeMismatch { .. })
        ));
        graph.set_min_max(slider, Vec3::repeat(-1.0), Vec3::repeat(1.0)).unwrap();
        assert_eq!(graph.value(slider).unwrap(), Some(&Value::Vec3f(Vec3::repeat(1.0))));

        graph.set_value(slider, Vec3::new(-3.0, 0.25, 3.0)).unwrap();
        assert_eq!(graph.value(slider).unwrap(), Some(&Value::Vec3f(Vec3::new(-1.0, 0.25, 1.0))));
    }

    #[test]
    fn test_shared_child_lifetime() {
        let mut graph = SceneGraph::new();
        let a = graph.create("Group", "a").unwrap();
        let b = graph.create("Group", "b").unwrap();
        let shared = graph.create("Material", "material").unwrap();
        graph.add(a, shared).unwrap();
        graph.add(b, shared).unwrap();
        graph.release(shared).unwrap();
        assert_eq!(graph.node(shared).unwrap().owner_count(), 2);

        graph.release(a).unwrap();
        assert!(graph.contains(shared));
        assert_eq!(graph.node(shared).unwrap().parents(), &[b]);

        graph.release(b).unwrap();
        assert!(!graph.contains(shared));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_shared_mutation_reaches_all_parents() {
        let mut graph = SceneGraph::new();
        let a = graph.create("Group", "a").unwrap();
        let b = graph.create("Group", "b").unwrap();
        let shared = graph.create_value_node("shared", "int", 0, NodeFlags::empty()).unwrap();
        graph.add(a, shared).unwrap();
        graph.add(b, shared).unwrap();

        graph.set_value(shared, 7).unwrap();
        let stamp = graph.node(shared).unwrap().last_modified();
        assert_eq!(graph.node(a).unwrap().children_last_modified(), stamp);
        assert_eq!(graph.node(b).unwrap().children_last_modified(), stamp);
    }

    #[test]
    fn test_remove_child() {
        let mut graph = SceneGraph::new();
        let group = graph.create("Group", "g").unwrap();
        let child = graph.create_value_child(group, "c", "int", 1, NodeFlags::empty()).unwrap();

        assert_eq!(graph.remove_child(group, "c").unwrap(), child);
        assert!(!graph.contains(child));
        assert!(graph.remove_child(group, "c").is_err());
    }

    #[test]
    fn test_stale_handle() {
        let mut graph = SceneGraph::new();
        let node = graph.create("int", "n").unwrap();
        graph.release(node).unwrap();
        assert!(matches!(graph.set_value(node, 1), Err(SceneError::InvalidNode(_))));
        assert_eq!(graph.name_of(node), "<dead>");
    }
}
