//! Surface material node

use std::any::Any;

use crate::foundation::math::Vec3;
use crate::render::{MaterialDesc, ResourceHandle};
use crate::scene::{NodeBehavior, NodeFlags, NodeId, RenderContext, SceneGraph, SceneResult, Value};

/// Default diffuse color
pub const DEFAULT_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

/// Material with `color` and `opacity` children
#[derive(Debug, Default)]
pub struct Material {
    handle: Option<ResourceHandle>,
}

impl Material {
    /// Create an uncommitted material
    pub fn new() -> Self {
        Self::default()
    }

    /// Native material, once committed
    pub fn handle(&self) -> Option<ResourceHandle> {
        self.handle
    }

    /// Committed native material of the material node `id`, if any
    pub fn handle_of(graph: &SceneGraph, id: NodeId) -> Option<ResourceHandle> {
        graph.behavior::<Self>(id).and_then(Self::handle)
    }

    fn describe(graph: &SceneGraph, id: NodeId) -> SceneResult<MaterialDesc> {
        let color = graph
            .child_value(id, "color")?
            .and_then(Value::as_vec3)
            .unwrap_or_else(|| Vec3::from(DEFAULT_COLOR));
        let opacity = graph.child_value(id, "opacity")?.and_then(Value::as_float).unwrap_or(1.0);
        Ok(MaterialDesc { color, opacity })
    }
}

impl NodeBehavior for Material {
    fn init(&mut self, graph: &mut SceneGraph, id: NodeId) -> SceneResult<()> {
        graph.create_value_child(id, "color", "vec3f", Vec3::from(DEFAULT_COLOR), NodeFlags::GUI_COLOR)?;
        let opacity = graph.create_value_child(
            id,
            "opacity",
            "float",
            1.0_f32,
            NodeFlags::VALID_MIN_MAX | NodeFlags::GUI_SLIDER,
        )?;
        graph.set_min_max(opacity, 0.0_f32, 1.0_f32)
    }

    fn post_commit(&mut self, graph: &mut SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        let desc = Self::describe(graph, id)?;
        let handle = ctx.backend().create_material(&desc)?;
        if let Some(old) = self.handle.replace(handle) {
            ctx.backend().release(old);
        }
        log::trace!("Material '{}' committed as {handle}", graph.name_of(id));
        Ok(())
    }

    fn release_resources(&mut self) -> Vec<ResourceHandle> {
        self.handle.take().into_iter().collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
