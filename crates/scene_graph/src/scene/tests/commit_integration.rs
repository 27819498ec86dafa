//! Commit, render and serialization over whole scenes

use crate::foundation::math::Vec3;
use crate::nodes::{Material, MeshBuffers, TriangleMesh, World};
use crate::render::{RecordingBackend, ResourceHandle, ResourceKind};
use crate::scene::{
    Attribute, FrameParams, NodeBehavior, NodeId, RenderContext, SceneError, SceneGraph, Serialization,
    SerializationMode,
};

fn scene_with_meshes(names: &[&str]) -> (SceneGraph, NodeId, Vec<NodeId>) {
    let mut graph = SceneGraph::new();
    let world = graph.create("World", "world").unwrap();
    let meshes = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mesh = graph.create_child(world, name, "TriangleMesh").unwrap();
            let offset = Vec3::repeat(i as f32 * 2.0);
            let buffers = MeshBuffers::cuboid(offset, offset + Vec3::repeat(1.0));
            TriangleMesh::set_buffers(&mut graph, mesh, buffers).unwrap();
            mesh
        })
        .collect();
    (graph, world, meshes)
}

fn geometry_of(graph: &SceneGraph, mesh: NodeId) -> ResourceHandle {
    graph.behavior::<TriangleMesh>(mesh).unwrap().geometry().unwrap()
}

#[test]
fn test_second_commit_without_mutation_creates_nothing() {
    let (mut graph, world, _) = scene_with_meshes(&["a", "b"]);
    let mut backend = RecordingBackend::new();
    let mut ctx = RenderContext::new(&mut backend, FrameParams::default());

    graph.commit(world, &mut ctx).unwrap();
    drop(ctx);
    let after_first = backend.total_creations();
    // model + 2 materials + 2 geometries
    assert_eq!(after_first, 5);
    assert_eq!(backend.attachments().len(), 2);

    let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
    graph.commit(world, &mut ctx).unwrap();
    drop(ctx);
    assert_eq!(backend.total_creations(), after_first);
    assert_eq!(backend.committed_models(), 1);
}

#[test]
fn test_only_dirty_subset_is_recommitted() {
    let (mut graph, world, meshes) = scene_with_meshes(&["a", "b"]);
    let mut backend = RecordingBackend::new();
    {
        let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
        graph.commit(world, &mut ctx).unwrap();
    }
    let untouched = geometry_of(&graph, meshes[1]);

    let material = graph.get_child(meshes[0], "material").unwrap();
    let color = graph.get_child(material, "color").unwrap();
    graph.set_value(color, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    {
        let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
        graph.commit(world, &mut ctx).unwrap();
    }

    // new material, then a geometry bound to it
    assert_eq!(backend.creations(ResourceKind::Material), 3);
    assert_eq!(backend.creations(ResourceKind::Geometry), 3);
    assert_eq!(geometry_of(&graph, meshes[1]), untouched);
    let rebuilt = backend.geometry(geometry_of(&graph, meshes[0])).unwrap();
    assert_eq!(rebuilt.material, Material::handle_of(&graph, material));
}

#[test]
fn test_render_visits_children_in_insertion_order() {
    let (mut graph, world, meshes) = scene_with_meshes(&["c", "a", "b"]);
    let mut backend = RecordingBackend::new();
    {
        let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
        graph.commit(world, &mut ctx).unwrap();
        graph.render(world, &mut ctx).unwrap();
    }

    let drawn: Vec<_> = backend.draws().iter().map(|d| d.geometry).collect();
    let expected: Vec<_> = meshes.iter().map(|m| geometry_of(&graph, *m)).collect();
    assert_eq!(drawn, expected);

    backend.clear_draws();
    let hidden = graph.get_child(meshes[1], "visible").unwrap();
    graph.set_value(hidden, false).unwrap();
    let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
    graph.commit(world, &mut ctx).unwrap();
    graph.render(world, &mut ctx).unwrap();
    drop(ctx);
    assert_eq!(backend.draws().len(), 2);
}

#[test]
fn test_backend_failure_is_surfaced_and_retried() {
    let (mut graph, world, meshes) = scene_with_meshes(&["a"]);
    let mut backend = RecordingBackend::new();
    backend.fail_next_creation("no device");

    {
        let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
        let err = graph.commit(world, &mut ctx).unwrap_err();
        assert!(matches!(err, SceneError::Backend(_)));
    }
    assert!(graph.node(world).unwrap().needs_commit());
    assert!(graph.behavior::<World>(world).unwrap().model().is_none());

    let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
    graph.commit(world, &mut ctx).unwrap();
    drop(ctx);
    assert!(backend.is_live(geometry_of(&graph, meshes[0])));
}

#[test]
fn test_destroyed_nodes_release_resources_on_next_commit() {
    let (mut graph, world, meshes) = scene_with_meshes(&["a", "b"]);
    let mut backend = RecordingBackend::new();
    {
        let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
        graph.commit(world, &mut ctx).unwrap();
    }
    let geometry = geometry_of(&graph, meshes[0]);
    let material = Material::handle_of(&graph, graph.get_child(meshes[0], "material").unwrap()).unwrap();

    graph.remove_child(world, "a").unwrap();
    assert!(!graph.contains(meshes[0]));
    assert!(graph.retired_resources().contains(&geometry));
    assert!(backend.is_live(geometry));

    {
        let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
        graph.commit(world, &mut ctx).unwrap();
    }
    assert!(!backend.is_live(geometry));
    assert!(!backend.is_live(material));
    assert!(graph.retired_resources().is_empty());
    assert_eq!(backend.attachments().len(), 1);
}

#[test]
fn test_description_driven_scene() {
    let mut graph = SceneGraph::new();
    let world = graph.instantiate("World", "world", &[], None).unwrap();
    let attributes = [
        Attribute::new("vertex", "0 0 0  1 0 0  0 1 0  0 0 1"),
        Attribute::new("index", "0 1 2  0 1 3"),
    ];
    let mesh = graph.instantiate("TriangleMesh", "tetra", &attributes, None).unwrap();
    graph.add(world, mesh).unwrap();
    graph.release(mesh).unwrap();
    let scale = graph.instantiate("float", "scale", &[Attribute::new("value", "2.5")], None).unwrap();
    graph.add(world, scale).unwrap();
    graph.release(scale).unwrap();

    let mut backend = RecordingBackend::new();
    {
        let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
        graph.commit(world, &mut ctx).unwrap();
        graph.render(world, &mut ctx).unwrap();
    }
    let recorded = backend.geometry(geometry_of(&graph, mesh)).unwrap();
    assert_eq!(recorded.triangle_count, 2);
    assert_eq!(backend.draws().len(), 1);
}

#[test]
fn test_snapshot_after_commit_covers_every_node() {
    let (mut graph, world, _) = scene_with_meshes(&["a", "b"]);
    let mut backend = RecordingBackend::new();
    {
        let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
        graph.commit(world, &mut ctx).unwrap();
    }
    let stamps: Vec<_> = graph.children(world).unwrap().iter().map(|c| graph.node(*c).unwrap().last_committed()).collect();

    let mut serialization = Serialization::new();
    serialization.serialize(&graph, world, SerializationMode::Full).unwrap();
    assert_eq!(serialization.len(), graph.len());

    let records = serialization.records(&graph).unwrap();
    assert_eq!(records[0].type_name, "World");
    assert_eq!(records[1].name, "a");
    assert_eq!(records[2].name, "material");

    let after: Vec<_> = graph.children(world).unwrap().iter().map(|c| graph.node(*c).unwrap().last_committed()).collect();
    assert_eq!(stamps, after);
    assert!(!graph.node(world).unwrap().needs_commit());
}
