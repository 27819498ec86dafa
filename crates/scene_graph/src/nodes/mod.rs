//! Built-in node types
//!
//! | Type name      | Behavior        |
//! |----------------|-----------------|
//! | `Node`         | [`ValueNode`] without a value |
//! | `Group`        | [`Group`]       |
//! | `World`        | [`World`]       |
//! | `Importer`     | [`Importer`]    |
//! | `TriangleMesh` | [`TriangleMesh`]|
//! | `PTMTriangleMesh` | [`PTMTriangleMesh`] |
//! | `Material`     | [`Material`]    |
//! | `FrameBuffer`  | [`FrameBuffer`] |
//! | `bool`, `int`, `float`, `vec3f`, `string` | [`ValueNode`] |

mod value_node;
mod group;
mod material;
mod framebuffer;
mod triangle_mesh;
mod ptm_triangle_mesh;
mod importer;

pub use value_node::ValueNode;
pub use group::{children_bounds, render_children, subtree_geometry, Group, World};
pub use material::Material;
pub use framebuffer::FrameBuffer;
pub use triangle_mesh::{MeshBuffers, TriangleMesh, ROTATION_LIMIT};
pub use ptm_triangle_mesh::{PTMTriangleMesh, MATERIAL_LIST};
pub use importer::{Importer, FILE_NAME};

use crate::scene::{NodeRegistry, ValueType};

/// Register every built-in node type
pub fn register_builtins(registry: &mut NodeRegistry) {
    registry.register("Node", || Box::new(ValueNode::untyped()));
    registry.register("Group", || Box::new(Group));
    registry.register("World", || Box::new(World::new()));
    registry.register("Importer", || Box::new(Importer::new()));
    registry.register("TriangleMesh", || Box::new(TriangleMesh::new()));
    registry.register("PTMTriangleMesh", || Box::new(PTMTriangleMesh::new()));
    registry.register("Material", || Box::new(Material::new()));
    registry.register("FrameBuffer", || Box::new(FrameBuffer::new()));

    for value_type in [ValueType::Bool, ValueType::Int, ValueType::Float, ValueType::Vec3f, ValueType::String] {
        registry.register(value_type.to_string(), move || Box::new(ValueNode::new(value_type)));
    }
}
