//! Composite nodes
//!
//! [`Group`] renders its children in insertion order and reports the union
//! of their bounds. [`World`] is a group that additionally owns a native
//! model: after its children commit it attaches the geometry found below it
//! and detaches whatever is no longer there.

use std::any::Any;
use std::collections::HashSet;

use crate::foundation::math::AABB;
use crate::render::ResourceHandle;
use crate::scene::{NodeBehavior, NodeId, RenderContext, SceneError, SceneGraph, SceneResult};

/// Render every child of `id` in insertion order
pub fn render_children(graph: &SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
    let mut errors = Vec::new();
    for child in graph.node(id)?.children() {
        if let Err(err) = graph.render_node(child, ctx) {
            if graph.fail_fast() {
                return Err(err);
            }
            log::warn!("Render of '{}' failed: {err}", graph.name_of(child));
            errors.push(err);
        }
    }
    SceneError::collected(errors)
}

/// Union of the bounds of every child of `id`, starting from the empty box
pub fn children_bounds(graph: &SceneGraph, id: NodeId) -> AABB {
    graph.node(id).map_or_else(
        |_| AABB::empty(),
        |data| {
            data.children()
                .filter_map(|child| graph.bounds(child).ok())
                .fold(AABB::empty(), |acc, b| acc.union(&b))
        },
    )
}

/// Geometry of every node below `id`, in pre-order
///
/// Subtrees of nodes staging their own model belong to that model and are
/// skipped. Shared nodes contribute once.
pub fn subtree_geometry(graph: &SceneGraph, id: NodeId) -> SceneResult<Vec<ResourceHandle>> {
    let mut geometry = Vec::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<NodeId> = graph.children(id)?.into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        if let Some(behavior) = graph.behavior_dyn(node) {
            if behavior.stages_model() {
                continue;
            }
            if let Some(handle) = behavior.geometry() {
                if !geometry.contains(&handle) {
                    geometry.push(handle);
                }
            }
        }
        stack.extend(graph.children(node)?.into_iter().rev());
    }
    Ok(geometry)
}

/// Plain composite node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Group;

impl NodeBehavior for Group {
    fn render(&self, graph: &SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        render_children(graph, id, ctx)
    }

    fn bounds(&self, graph: &SceneGraph, id: NodeId) -> AABB {
        children_bounds(graph, id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Group owning a native model for the geometry below it
#[derive(Debug, Default)]
pub struct World {
    model: Option<ResourceHandle>,
    /// Geometry currently attached to `model`
    attached: Vec<ResourceHandle>,
}

impl World {
    /// Create a world without a model; the first commit creates it
    pub fn new() -> Self {
        Self::default()
    }

    /// Native model, once committed
    pub fn model(&self) -> Option<ResourceHandle> {
        self.model
    }

    /// Geometry attached to the model by the last commit
    pub fn attached(&self) -> &[ResourceHandle] {
        &self.attached
    }

    fn sync_attachments(&mut self, graph: &SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        let Some(model) = self.model else {
            return Ok(());
        };
        let current = subtree_geometry(graph, id)?;
        for &stale in self.attached.iter().filter(|g| !current.contains(g)) {
            ctx.backend().detach_geometry(model, stale)?;
        }
        for &fresh in current.iter().filter(|g| !self.attached.contains(g)) {
            ctx.backend().attach_geometry(model, fresh)?;
        }
        self.attached = current;
        Ok(())
    }
}

impl NodeBehavior for World {
    fn pre_commit(&mut self, _graph: &mut SceneGraph, _id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        if self.model.is_none() {
            self.model = Some(ctx.backend().create_model()?);
        }
        Ok(())
    }

    fn post_commit(&mut self, graph: &mut SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.sync_attachments(graph, id, ctx)?;
        if let Some(model) = self.model {
            ctx.backend().commit_model(model)?;
            log::debug!("Committed model {model} of '{}'", graph.name_of(id));
        }
        Ok(())
    }

    fn render(&self, graph: &SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        render_children(graph, id, ctx)
    }

    fn bounds(&self, graph: &SceneGraph, id: NodeId) -> AABB {
        children_bounds(graph, id)
    }

    fn stages_model(&self) -> bool {
        true
    }

    fn release_resources(&mut self) -> Vec<ResourceHandle> {
        self.attached.clear();
        self.model.take().into_iter().collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::nodes::{MeshBuffers, TriangleMesh};
    use crate::render::{RecordingBackend, ResourceKind};
    use crate::scene::FrameParams;

    #[test]
    fn test_empty_group_has_empty_bounds() {
        let mut graph = SceneGraph::new();
        let group = graph.create("Group", "g").unwrap();
        assert!(graph.bounds(group).unwrap().is_empty());
    }

    #[test]
    fn test_world_creates_model_once() {
        let mut graph = SceneGraph::new();
        let world = graph.create("World", "world").unwrap();
        let child = graph.create_value_child(world, "n", "int", 1, Default::default()).unwrap();
        let mut backend = RecordingBackend::new();

        {
            let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
            graph.commit(world, &mut ctx).unwrap();
            graph.set_value(child, 2).unwrap();
            graph.commit(world, &mut ctx).unwrap();
        }

        assert_eq!(backend.creations(ResourceKind::Model), 1);
        assert_eq!(backend.committed_models(), 2);
        let model = graph.behavior::<World>(world).unwrap().model().unwrap();
        assert!(backend.is_live(model));

        graph.release(world).unwrap();
        assert_eq!(graph.retired_resources(), &[model]);
        graph.release_retired(&mut backend);
        assert!(!backend.is_live(model));
    }

    fn commit(graph: &mut SceneGraph, root: NodeId, backend: &mut RecordingBackend) {
        let mut ctx = RenderContext::new(backend, FrameParams::default());
        graph.commit(root, &mut ctx).unwrap();
    }

    fn world_model(graph: &SceneGraph, world: NodeId) -> ResourceHandle {
        graph.behavior::<World>(world).unwrap().model().unwrap()
    }

    #[test]
    fn test_mesh_moved_between_worlds_follows_its_model() {
        let mut graph = SceneGraph::new();
        let first = graph.create("World", "first").unwrap();
        let second = graph.create("World", "second").unwrap();
        let mesh = graph.create_child(first, "m", "TriangleMesh").unwrap();
        TriangleMesh::set_buffers(&mut graph, mesh, MeshBuffers::cuboid(Vec3::zeros(), Vec3::repeat(1.0))).unwrap();
        let mut backend = RecordingBackend::new();

        commit(&mut graph, first, &mut backend);
        let geometry = graph.behavior::<TriangleMesh>(mesh).unwrap().geometry().unwrap();
        assert_eq!(backend.attachments(), &[(world_model(&graph, first), geometry)]);

        graph.add(second, mesh).unwrap();
        graph.remove_child(first, "m").unwrap();
        commit(&mut graph, second, &mut backend);
        assert_eq!(backend.creations(ResourceKind::Geometry), 1);
        assert!(backend.attachments().contains(&(world_model(&graph, second), geometry)));

        commit(&mut graph, first, &mut backend);
        assert_eq!(backend.attachments(), &[(world_model(&graph, second), geometry)]);
        assert!(graph.behavior::<World>(first).unwrap().attached().is_empty());
    }

    #[test]
    fn test_shared_mesh_attaches_to_both_worlds_once() {
        let mut graph = SceneGraph::new();
        let root = graph.create("Group", "root").unwrap();
        let left = graph.create_child(root, "left", "World").unwrap();
        let right = graph.create_child(root, "right", "World").unwrap();
        let mesh = graph.create_child(left, "m", "TriangleMesh").unwrap();
        graph.add(right, mesh).unwrap();
        let group = graph.create_child(right, "extra", "Group").unwrap();
        graph.add(group, mesh).unwrap();
        TriangleMesh::set_buffers(&mut graph, mesh, MeshBuffers::cuboid(Vec3::zeros(), Vec3::repeat(1.0))).unwrap();
        let mut backend = RecordingBackend::new();

        commit(&mut graph, root, &mut backend);
        let geometry = graph.behavior::<TriangleMesh>(mesh).unwrap().geometry().unwrap();
        assert_eq!(backend.attachments().len(), 2);
        assert!(backend.attachments().contains(&(world_model(&graph, left), geometry)));
        assert!(backend.attachments().contains(&(world_model(&graph, right), geometry)));
    }

    #[test]
    fn test_nested_world_keeps_its_own_geometry() {
        let mut graph = SceneGraph::new();
        let outer = graph.create("World", "outer").unwrap();
        let inner = graph.create_child(outer, "inner", "World").unwrap();
        let mesh = graph.create_child(inner, "m", "TriangleMesh").unwrap();
        TriangleMesh::set_buffers(&mut graph, mesh, MeshBuffers::cuboid(Vec3::zeros(), Vec3::repeat(1.0))).unwrap();
        let mut backend = RecordingBackend::new();

        commit(&mut graph, outer, &mut backend);
        let geometry = graph.behavior::<TriangleMesh>(mesh).unwrap().geometry().unwrap();
        assert_eq!(backend.attachments(), &[(world_model(&graph, inner), geometry)]);
        assert!(subtree_geometry(&graph, outer).unwrap().is_empty());
    }

    #[test]
    fn test_rebuilt_geometry_replaces_attachment() {
        let mut graph = SceneGraph::new();
        let world = graph.create("World", "world").unwrap();
        let mesh = graph.create_child(world, "m", "TriangleMesh").unwrap();
        TriangleMesh::set_buffers(&mut graph, mesh, MeshBuffers::cuboid(Vec3::zeros(), Vec3::repeat(1.0))).unwrap();
        let mut backend = RecordingBackend::new();
        commit(&mut graph, world, &mut backend);

        TriangleMesh::set_buffers(&mut graph, mesh, MeshBuffers::cuboid(Vec3::zeros(), Vec3::repeat(2.0))).unwrap();
        commit(&mut graph, world, &mut backend);

        let geometry = graph.behavior::<TriangleMesh>(mesh).unwrap().geometry().unwrap();
        assert_eq!(backend.attachments(), &[(world_model(&graph, world), geometry)]);
        assert_eq!(graph.behavior::<World>(world).unwrap().attached(), &[geometry]);
    }
}
