//! Triangle mesh with per-triangle materials
//!
//! Behaves like a [`TriangleMesh`] and additionally carries one material ID
//! per triangle. The IDs index the `materialList` group child, whose
//! [`Material`] children are taken in insertion order. When the list or the
//! IDs are empty, every triangle uses the mesh's own `material` child.

use std::any::Any;

use crate::foundation::math::AABB;
use crate::render::ResourceHandle;
use crate::scene::{Attribute, NodeBehavior, NodeId, RenderContext, SceneError, SceneGraph, SceneResult};

use super::triangle_mesh::{description_error, read_uints};
use super::{Material, MeshBuffers, TriangleMesh};

/// Name of the group child listing the per-triangle materials
pub const MATERIAL_LIST: &str = "materialList";

/// Mesh node with a material ID per triangle
#[derive(Debug, Default)]
pub struct PTMTriangleMesh {
    mesh: TriangleMesh,
    material_ids: Vec<u32>,
}

impl PTMTriangleMesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Current buffers
    pub fn buffers(&self) -> &MeshBuffers {
        self.mesh.buffers()
    }

    /// Material ID of each triangle
    pub fn material_ids(&self) -> &[u32] {
        &self.material_ids
    }

    /// Replace buffers and material IDs of mesh node `id` and mark it modified
    ///
    /// `material_ids` is either empty or holds one entry per triangle.
    pub fn set_buffers(
        graph: &mut SceneGraph,
        id: NodeId,
        buffers: MeshBuffers,
        material_ids: Vec<u32>,
    ) -> SceneResult<()> {
        let name = graph.name_of(id).to_string();
        validate(&buffers, &material_ids).map_err(|reason| description_error(&name, reason))?;
        let ptm = graph
            .behavior_mut::<Self>(id)
            .ok_or(SceneError::WrongNodeType { node: name, expected: "PTMTriangleMesh" })?;
        ptm.mesh.replace_buffers(buffers);
        ptm.material_ids = material_ids;
        graph.touch(id)
    }

    /// Committed material handles of the `materialList` children, in order
    pub fn material_list(graph: &SceneGraph, id: NodeId) -> SceneResult<Vec<ResourceHandle>> {
        let Some(list) = graph.node(id)?.child(MATERIAL_LIST) else {
            return Ok(Vec::new());
        };
        graph
            .children(list)?
            .into_iter()
            .map(|material| {
                Material::handle_of(graph, material)
                    .ok_or_else(|| SceneError::MissingResource(graph.name_of(material).to_string()))
            })
            .collect()
    }
}

fn validate(buffers: &MeshBuffers, material_ids: &[u32]) -> Result<(), String> {
    buffers.validate()?;
    if !material_ids.is_empty() && material_ids.len() != buffers.indices.len() {
        return Err(format!("{} material IDs for {} triangles", material_ids.len(), buffers.indices.len()));
    }
    Ok(())
}

impl NodeBehavior for PTMTriangleMesh {
    fn init(&mut self, graph: &mut SceneGraph, id: NodeId) -> SceneResult<()> {
        self.mesh.init(graph, id)?;
        graph.create_child(id, MATERIAL_LIST, "Group")?;
        Ok(())
    }

    fn post_commit(&mut self, graph: &mut SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        let materials = Self::material_list(graph, id)?;
        if materials.is_empty() || self.material_ids.is_empty() {
            return self.mesh.commit_geometry(graph, id, ctx, &[], &[]);
        }
        if let Some(bad) = self.material_ids.iter().find(|&&m| m as usize >= materials.len()) {
            return Err(description_error(
                graph.name_of(id),
                format!("material ID {bad} out of range for {} materials", materials.len()),
            ));
        }
        self.mesh.commit_geometry(graph, id, ctx, &materials, &self.material_ids)
    }

    fn render(&self, graph: &SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.mesh.render(graph, id, ctx)
    }

    fn bounds(&self, graph: &SceneGraph, id: NodeId) -> AABB {
        self.mesh.bounds(graph, id)
    }

    fn populate_from_description(
        &mut self,
        graph: &mut SceneGraph,
        id: NodeId,
        attributes: &[Attribute],
        blob: Option<&[u8]>,
    ) -> SceneResult<()> {
        let name = graph.name_of(id).to_string();
        let buffers = TriangleMesh::buffers_from_description(&name, attributes, blob)?;
        let material_ids = read_uints(&name, attributes, blob, "materialID", 1)?;
        validate(&buffers, &material_ids).map_err(|reason| description_error(&name, reason))?;
        self.mesh.replace_buffers(buffers);
        self.material_ids = material_ids;
        graph.touch(id)
    }

    fn geometry(&self) -> Option<ResourceHandle> {
        self.mesh.geometry()
    }

    fn release_resources(&mut self) -> Vec<ResourceHandle> {
        self.mesh.release_resources()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
