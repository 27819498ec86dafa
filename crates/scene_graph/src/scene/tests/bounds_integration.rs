//! Bounds aggregation over mixed subtrees

use crate::foundation::math::{Vec3, AABB};
use crate::nodes::{MeshBuffers, TriangleMesh};
use crate::scene::{NodeFlags, NodeId, SceneGraph};

fn add_box(graph: &mut SceneGraph, parent: NodeId, name: &str, min: Vec3, max: Vec3) -> NodeId {
    let mesh = graph.create_child(parent, name, "TriangleMesh").unwrap();
    TriangleMesh::set_buffers(graph, mesh, MeshBuffers::cuboid(min, max)).unwrap();
    mesh
}

#[test]
fn test_union_of_two_boxes() {
    let mut graph = SceneGraph::new();
    let group = graph.create("Group", "group").unwrap();
    add_box(&mut graph, group, "a", Vec3::zeros(), Vec3::repeat(1.0));
    add_box(&mut graph, group, "b", Vec3::repeat(2.0), Vec3::repeat(3.0));

    let bounds = graph.bounds(group).unwrap();
    assert_eq!(bounds, AABB::new(Vec3::zeros(), Vec3::repeat(3.0)));
}

#[test]
fn test_group_bounds_are_union_of_children() {
    let mut graph = SceneGraph::new();
    let world = graph.create("World", "world").unwrap();
    let inner = graph.create_child(world, "inner", "Group").unwrap();
    add_box(&mut graph, world, "a", Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.5));
    add_box(&mut graph, inner, "b", Vec3::new(0.5, -2.0, 0.0), Vec3::new(4.0, 0.0, 1.0));
    graph.create_value_child(world, "label", "string", "not geometry", NodeFlags::empty()).unwrap();
    graph.create_child(world, "empty", "Group").unwrap();

    for node in [world, inner] {
        let expected = graph
            .children(node)
            .unwrap()
            .into_iter()
            .map(|c| graph.bounds(c).unwrap())
            .fold(AABB::empty(), |acc, b| acc.union(&b));
        assert_eq!(graph.bounds(node).unwrap(), expected);
    }
    assert_eq!(
        graph.bounds(world).unwrap(),
        AABB::new(Vec3::new(-1.0, -2.0, 0.0), Vec3::new(4.0, 1.0, 1.0))
    );
}

#[test]
fn test_empty_composites_report_empty_box() {
    let mut graph = SceneGraph::new();
    let world = graph.create("World", "world").unwrap();
    graph.create_child(world, "nested", "Group").unwrap();
    graph.create_child(world, "mesh", "TriangleMesh").unwrap();

    assert!(graph.bounds(world).unwrap().is_empty());
}

#[test]
fn test_bounds_follow_buffer_changes() {
    let mut graph = SceneGraph::new();
    let group = graph.create("Group", "group").unwrap();
    let mesh = add_box(&mut graph, group, "a", Vec3::zeros(), Vec3::repeat(1.0));

    TriangleMesh::set_buffers(&mut graph, mesh, MeshBuffers::cuboid(Vec3::zeros(), Vec3::repeat(5.0))).unwrap();
    assert_eq!(graph.bounds(group).unwrap().max, Vec3::repeat(5.0));
}

#[test]
fn test_shared_mesh_counts_under_each_parent() {
    let mut graph = SceneGraph::new();
    let root = graph.create("Group", "root").unwrap();
    let left = graph.create_child(root, "left", "Group").unwrap();
    let right = graph.create_child(root, "right", "Group").unwrap();
    let shared = add_box(&mut graph, left, "shared", Vec3::zeros(), Vec3::repeat(1.0));
    graph.add(right, shared).unwrap();

    assert_eq!(graph.bounds(left).unwrap(), graph.bounds(right).unwrap());
    assert_eq!(graph.bounds(root).unwrap(), graph.bounds(shared).unwrap());
}
