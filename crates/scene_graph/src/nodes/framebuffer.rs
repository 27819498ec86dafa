//! Render target node

use std::any::Any;

use crate::render::{ColorFormat, FrameBufferDesc, ResourceHandle};
use crate::scene::{NodeBehavior, NodeFlags, NodeId, RenderContext, SceneGraph, SceneResult, Value};

/// Framebuffer sized by its `width` and `height` children
///
/// Both children are `REQUIRED` and start without a value, so a
/// framebuffer only commits once the host has sized it.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    handle: Option<ResourceHandle>,
    size: (u32, u32),
    format: ColorFormat,
}

impl FrameBuffer {
    /// Create an unsized framebuffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unsized framebuffer with a specific pixel format
    pub fn with_format(format: ColorFormat) -> Self {
        Self { format, ..Self::default() }
    }

    /// Native framebuffer, once committed
    pub fn handle(&self) -> Option<ResourceHandle> {
        self.handle
    }

    /// Size of the committed framebuffer
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn dimension(graph: &SceneGraph, id: NodeId, name: &str) -> SceneResult<u32> {
        let value = graph.child_value(id, name)?.and_then(Value::as_int).unwrap_or(1);
        Ok(value.max(1).unsigned_abs())
    }
}

impl NodeBehavior for FrameBuffer {
    fn init(&mut self, graph: &mut SceneGraph, id: NodeId) -> SceneResult<()> {
        for name in ["width", "height"] {
            let child = graph.create_child(id, name, "int")?;
            graph.set_flags(child, NodeFlags::REQUIRED | NodeFlags::VALID_MIN_MAX)?;
            graph.set_min_max(child, 1, i32::MAX)?;
        }
        Ok(())
    }

    fn post_commit(&mut self, graph: &mut SceneGraph, id: NodeId, ctx: &mut RenderContext<'_>) -> SceneResult<()> {
        let size = (Self::dimension(graph, id, "width")?, Self::dimension(graph, id, "height")?);
        if self.handle.is_some() && size == self.size {
            return Ok(());
        }

        let desc = FrameBufferDesc { width: size.0, height: size.1, format: self.format };
        let handle = ctx.backend().create_framebuffer(&desc)?;
        if let Some(old) = self.handle.replace(handle) {
            ctx.backend().release(old);
        }
        self.size = size;
        log::debug!("Framebuffer '{}' resized to {}x{}", graph.name_of(id), size.0, size.1);
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
