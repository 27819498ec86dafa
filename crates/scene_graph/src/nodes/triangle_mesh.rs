//! Triangle mesh geometry node
//!
//! Holds vertex, normal, texture coordinate, color and index buffers. On
//! commit the buffers become a native geometry bound to the mesh's
//! `material` child; the enclosing [`World`](super::World) attaches it to
//! its model. The `position`, `rotation` and `scale` children only affect
//! the model matrix used at render time, so changing them never rebuilds the
//! geometry.

use std::any::Any;

use crate::foundation::math::{Transform, Vec3, AABB};
use crate::foundation::time::TimeStamp;
use crate::render::{DrawCall, GeometryDesc, ResourceHandle};
use crate::scene::description::{find_attribute, parse_usize_attribute, read_f32s, read_u32s};
use crate::scene::{
    Attribute, NodeBehavior, NodeFlags, NodeId, RenderContext, SceneError, SceneGraph, SceneResult, Value,
};

use super::Material;

/// Rotation bound applied to each Euler angle, in radians
pub const ROTATION_LIMIT: f32 = 2.0 * 3.15;

/// CPU-side geometry of a mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Per-vertex normals, empty when absent
    pub normals: Vec<Vec3>,
    /// Per-vertex texture coordinates, empty when absent
    pub texcoords: Vec<[f32; 2]>,
    /// Per-vertex RGBA colors, empty when absent
    pub colors: Vec<[f32; 4]>,
    /// Triangle vertex indices
    pub indices: Vec<[u32; 3]>,
}

impl MeshBuffers {
    /// Buffers holding positions and triangles only
    pub fn new(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices, ..Self::default() }
    }

    /// Closed box spanning `min` to `max`, 8 vertices and 12 triangles
    pub fn cuboid(min: Vec3, max: Vec3) -> Self {
        let vertices = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { min.x } else { max.x },
                    if i & 2 == 0 { min.y } else { max.y },
                    if i & 4 == 0 { min.z } else { max.z },
                )
            })
            .collect();
        let indices = vec![
            [0, 2, 1], [1, 2, 3], // -z
            [4, 5, 6], [5, 7, 6], // +z
            [0, 1, 4], [1, 5, 4], // -y
            [2, 6, 3], [3, 6, 7], // +y
            [0, 4, 2], [2, 4, 6], // -x
            [1, 3, 5], [3, 7, 5], // +x
        ];
        Self::new(vertices, indices)
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Check that every index refers to a vertex and optional arrays match
    pub fn validate(&self) -> Result<(), String> {
        let count = self.vertices.len();
        if let Some(bad) = self.indices.iter().flatten().find(|&&i| i as usize >= count) {
            return Err(format!("index {bad} out of range for {count} vertices"));
        }
        if !self.normals.is_empty() && self.normals.len() != count {
            return Err(format!("{} normals for {count} vertices", self.normals.len()));
        }
        if !self.texcoords.is_empty() && self.texcoords.len() != count {
            return Err(format!("{} texcoords for {count} vertices", self.texcoords.len()));
        }
        if !self.colors.is_empty() && self.colors.len() != count {
            return Err(format!("{} colors for {count} vertices", self.colors.len()));
        }
        Ok(())
    }
}

/// Inputs the current geometry was built from
#[derive(Debug, Clone, PartialEq)]
struct BuildKey {
    stamp: TimeStamp,
    material: Option<ResourceHandle>,
    materials: Vec<ResourceHandle>,
}

/// Triangle mesh node
#[derive(Debug, Default)]
pub struct TriangleMesh {
    buffers: MeshBuffers,
    geometry: Option<ResourceHandle>,
    built_from: Option<BuildKey>,
}

impl TriangleMesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with initial buffers
    pub fn with_buffers(buffers: MeshBuffers) -> Self {
        Self { buffers, ..Self::default() }
    }

    /// Current buffers
    pub fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    /// Replace the buffers of mesh node `id` and mark it modified
    pub fn set_buffers(graph: &mut SceneGraph, id: NodeId, buffers: MeshBuffers) -> SceneResult<()> {
        let name = graph.name_of(id).to_string();
        buffers.validate().map_err(|reason| SceneError::Description { node: name.clone(), reason })?;
        let mesh = graph
            .behavior_mut::<Self>(id)
            .ok_or(SceneError::WrongNodeType { node: name, expected: "TriangleMesh" })?;
        mesh.buffers = buffers;
        graph.touch(id)
    }

    /// Model matrix from the transform children
    pub fn transform(graph: &SceneGraph, id: NodeId) -> SceneResult<Transform> {
        let read = |name: &str, default: Vec3| -> SceneResult<Vec3> {
            Ok(graph.child_value(id, name)?.and_then(Value::as_vec3).unwrap_or(default))
        };
        Ok(Transform {
            position: read("position", Vec3::zeros())?,
            rotation: read("rotation", Vec3::zeros())?,
            scale: read("scale", Vec3::repeat(1.0))?,
        })
    }

    fn visible(graph: &SceneGraph, id: NodeId) -> SceneResult<bool> {
        Ok(graph.child_value(id, "visible")?.and_then(Value::as_bool).unwrap_or(true))
    }

    pub(crate) fn replace_buffers(&mut self, buffers: MeshBuffers) {
        self.buffers = buffers;
    }

    /// Build or reuse the native geometry of node `id`
    ///
    /// `materials` and `material_ids` carry an optional per-triangle
    /// material table; the geometry is rebuilt only when the node was
    /// touched or one of the bound materials changed.
    pub(crate) fn commit_geometry(
        &mut self,
        graph: &SceneGraph,
        id: NodeId,
        ctx: &mut RenderContext<'_>,
        materials: &[ResourceHandle],
        material_ids: &[u32],
    ) -> SceneResult<()> {
        if self.buffers.is_empty() {
            if let Some(old) = self.geometry.take() {
                ctx.backend().release(old);
            }
            self.built_from = None;
            return Ok(());
        }

        let material = match graph.get_child(id, "material") {
            Ok(material) => Material::handle_of(graph, material),
            Err(_) => None,
        };
        let key = BuildKey { stamp: graph.node(id)?.last_modified(), material, materials: materials.to_vec() };
        if self.geometry.is_some() && self.built_from.as_ref() == Some(&key) {
            return Ok(());
        }

        let desc = GeometryDesc {
            vertices: &self.buffers.vertices,
            normals: &self.buffers.normals,
            texcoords: &self.buffers.texcoords,
            colors: &self.buffers.colors,
            indices: &self.buffers.indices,
            material,
            materials,
            material_ids,
        };
        let geometry = ctx.backend().create_geometry(&desc)?;
        if let Some(old) = self.geometry.replace(geometry) {
            ctx.backend().release(old);
        }
        self.built_from = Some(key);

        log::debug!(
            "Mesh '{}' committed: {} vertices, {} triangles",
            graph.name_of(id),
            self.buffers.vertices.len(),
            self.buffers.indices.len()
        );
        Ok(())
    }

    pub(crate) fn buffers_from_description(
        node: &str,
        attributes: &[Attribute],
        blob: Option<&[u8]>,
    ) -> SceneResult<MeshBuffers> {
        let mut buffers = MeshBuffers {
            vertices: read_vec3s(node, attributes, blob, "vertex")?,
            normals: read_vec3s(node, attributes, blob, "normal")?,
            ..MeshBuffers::default()
        };
        buffers.texcoords = read_floats(node, attributes, blob, "texcoord", 2)?
            .chunks_exact(2)
            .map(|c| [c[0], c[1]])
            .collect();
        buffers.colors = read_floats(node, attributes, blob, "color", 4)?
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        buffers.indices = read_uints(node, attributes, blob, "index", 3)?
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(buffers)
    }
}

pub(crate) fn description_error(node: &str, reason: impl Into<String>) -> SceneError {
    SceneError::Description { node: node.to_string(), reason: reason.into() }
}

/// Words of an `ofs_<name>`/`num_<name>` blob range, `None` when not referenced
fn blob_range<'b>(
    node: &str,
    attributes: &[Attribute],
    blob: Option<&'b [u8]>,
    name: &str,
    arity: usize,
) -> SceneResult<Option<(usize, usize, &'b [u8])>> {
    let offset = parse_usize_attribute(node, attributes, &format!("ofs_{name}"))?;
    let count = parse_usize_attribute(node, attributes, &format!("num_{name}"))?;
    match (offset, count) {
        (None, None) => Ok(None),
        (Some(offset), Some(count)) => {
            let blob = blob.ok_or_else(|| description_error(node, format!("'{name}' points into a missing blob")))?;
            Ok(Some((offset, count.saturating_mul(arity), blob)))
        }
        _ => Err(description_error(node, format!("'ofs_{name}' and 'num_{name}' must be given together"))),
    }
}

fn read_floats(
    node: &str,
    attributes: &[Attribute],
    blob: Option<&[u8]>,
    name: &str,
    arity: usize,
) -> SceneResult<Vec<f32>> {
    if let Some((offset, words, blob)) = blob_range(node, attributes, blob, name, arity)? {
        return read_f32s(node, blob, offset, words);
    }
    let Some(text) = find_attribute(attributes, name) else {
        return Ok(Vec::new());
    };
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f32>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| description_error(node, format!("'{name}' holds a non-numeric entry")))?;
    if values.len() % arity != 0 {
        return Err(description_error(node, format!("'{name}' length {} is not a multiple of {arity}", values.len())));
    }
    Ok(values)
}

fn read_vec3s(node: &str, attributes: &[Attribute], blob: Option<&[u8]>, name: &str) -> SceneResult<Vec<Vec3>> {
    Ok(read_floats(node, attributes, blob, name, 3)?
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

pub(crate) fn read_uints(
    node: &str,
    attributes: &[Attribute],
    blob: Option<&[u8]>,
    name: &str,
    arity: usize,
) -> SceneResult<Vec<u32>> {
    if let Some((offset, words, blob)) = blob_range(node, attributes, blob, name, arity)? {
        return read_u32s(node, blob, offset, words);
    }
    let Some(text) = find_attribute(attributes, name) else {
        return Ok(Vec::new());
    };
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<u32>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| description_error(node, format!("'{name}' holds a non-integer entry")))?;
    if values.len() % arity != 0 {
        return Err(description_error(node, format!("'{name}' length {} is not a multiple of {arity}", values.len())));
    }
    Ok(values)
}

impl NodeBehavior for TriangleMesh {
    fn init(&mut self, graph: &mut SceneGraph, id: NodeId) -> SceneResult<()> {
        graph.create_child(id, "material", "Material")?;
        graph.create_value_child(id, "visible", "bool", true, NodeFlags::empty())?;
        graph.create_value_child(id, "position", "vec3f", Vec3::zeros(), NodeFlags::empty())?;
        let rotation = graph.create_value_child(
            id,
            "rotation",
            "vec3f",
            Vec3::zeros(),
            NodeFlags::REQUIRED | NodeFlags::VALID_MIN_MAX | NodeFlags::GUI_SLIDER,
        )?;
        graph.set_min_max(rotation, Vec3::repeat(-ROTATION_LIMIT), Vec3::repeat(ROTATION_LIMIT))?;
        graph.create_value_child(id, "scale", "vec3f", Vec3::repeat(1.0), NodeFlags::empty())?;
        Ok(())
    }

    fn post_commit(&mut self, graph: &mut SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        self.commit_geometry(graph, id, ctx, &[], &[])
    }

    fn render(&self, graph: &SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        if !Self::visible(graph, id)? || self.buffers.is_empty() {
            return Ok(());
        }
        let geometry = self
            .geometry
            .ok_or_else(|| SceneError::MissingResource(graph.name_of(id).to_string()))?;

        let call = DrawCall {
            geometry,
            material: self.built_from.as_ref().and_then(|key| key.material),
            model: Self::transform(graph, id)?.to_matrix(),
            view_projection: ctx.frame().camera.view_projection(),
        };
        ctx.backend().draw(&call)?;
        Ok(())
    }

    fn bounds(&self, _graph: &SceneGraph, _id: NodeId) -> AABB {
        AABB::from_points(&self.buffers.vertices)
    }

    fn populate_from_description(
        &mut self,
        graph: &mut SceneGraph,
        id: NodeId,
        attributes: &[Attribute],
        blob: Option<&[u8]>,
    ) -> SceneResult<()> {
        let name = graph.name_of(id).to_string();
        let buffers = Self::buffers_from_description(&name, attributes, blob)?;
        buffers.validate().map_err(|reason| description_error(&name, reason))?;
        self.buffers = buffers;
        graph.touch(id)
    }

    fn geometry(&self) -> Option<ResourceHandle> {
        self.geometry
    }

    fn release_resources(&mut self) -> Vec<ResourceHandle> {
        self.built_from = None;
        self.geometry.take().into_iter().collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
