//! # Scene Graph
//!
//! A scene graph runtime: a hierarchy of typed, named nodes with lazy
//! recomputation driven by modification timestamps, generic commit and
//! render traversals over a pluggable native backend, bounding-box
//! aggregation and an object-graph serializer.
//!
//! ## Features
//!
//! - **Shared children**: nodes may live under several parents and are
//!   destroyed with their last owner
//! - **Dirty propagation**: value changes stamp every ancestor, and commit
//!   skips clean subtrees
//! - **Node registry**: concrete types are created by name, so description
//!   loaders never need to know them
//! - **Headless backend**: [`render::RecordingBackend`] records everything
//!   the traversals do
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_graph::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut graph = SceneGraph::new();
//!     let world = graph.create("World", "world")?;
//!     let mesh = graph.create_child(world, "box", "TriangleMesh")?;
//!     TriangleMesh::set_buffers(&mut graph, mesh, MeshBuffers::cuboid(Vec3::zeros(), Vec3::repeat(1.0)))?;
//!
//!     let mut backend = RecordingBackend::new();
//!     let mut ctx = RenderContext::new(&mut backend, FrameParams::default());
//!     graph.commit(world, &mut ctx)?;
//!     graph.render(world, &mut ctx)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod nodes;
pub mod render;
pub mod assets;

/// Common imports for scene graph users
pub mod prelude {
    pub use crate::{
        config::{Config, ImportConfig, SceneConfig},
        foundation::{
            math::{Transform, Vec3, AABB},
            time::TimeStamp,
        },
        scene::{
            Attribute, ChildPolicy, FrameParams, NodeBehavior, NodeFlags, NodeId, RenderContext, SceneError,
            SceneGraph, SceneResult, Serialization, SerializationMode, Value, ValueType,
        },
        nodes::{Group, Importer, Material, MeshBuffers, PTMTriangleMesh, TriangleMesh, World},
        render::{Camera, RecordingBackend, RenderBackend, ResourceHandle},
        assets::{ExtensionImporter, SceneImporter},
    };
}
