//! Backend abstraction traits for the rendering system
//!
//! The commit pass creates native objects through [`RenderBackend`] and
//! keeps them as opaque [`ResourceHandle`]s; the render pass hands them back
//! in [`DrawCall`]s. Nothing in the scene graph looks behind a handle.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::math::{Mat4, Vec3};

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Opaque native resource owned by the node that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceHandle(pub u64);

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of native object behind a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Triangle geometry
    Geometry,
    /// Surface material
    Material,
    /// Render target
    FrameBuffer,
    /// Collection of geometries committed together
    Model,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Geometry => "geometry",
            Self::Material => "material",
            Self::FrameBuffer => "framebuffer",
            Self::Model => "model",
        };
        f.write_str(name)
    }
}

/// Backend errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The backend refused to create an object
    #[error("Failed to create {kind}: {reason}")]
    CreationFailed {
        /// What was being created
        kind: ResourceKind,
        /// Backend supplied reason
        reason: String,
    },

    /// A handle that the backend does not know
    #[error("Unknown resource handle {0}")]
    UnknownHandle(ResourceHandle),

    /// A handle of the wrong kind was passed
    #[error("Resource {handle} is a {actual}, expected a {expected}")]
    WrongKind {
        /// Offending handle
        handle: ResourceHandle,
        /// Expected kind
        expected: ResourceKind,
        /// Actual kind
        actual: ResourceKind,
    },
}

/// Geometry creation parameters
#[derive(Debug, Clone, Copy)]
pub struct GeometryDesc<'a> {
    /// Vertex positions
    pub vertices: &'a [Vec3],
    /// Per-vertex normals, empty when absent
    pub normals: &'a [Vec3],
    /// Per-vertex texture coordinates, empty when absent
    pub texcoords: &'a [[f32; 2]],
    /// Per-vertex RGBA colors, empty when absent
    pub colors: &'a [[f32; 4]],
    /// Triangle vertex indices
    pub indices: &'a [[u32; 3]],
    /// Material bound to the geometry
    pub material: Option<ResourceHandle>,
    /// Per-triangle material table, empty when every triangle uses `material`
    pub materials: &'a [ResourceHandle],
    /// Index into `materials` for each triangle, empty when `materials` is
    pub material_ids: &'a [u32],
}

/// Material creation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDesc {
    /// Diffuse color
    pub color: Vec3,
    /// Opacity in [0, 1]
    pub opacity: f32,
}

/// Pixel format of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFormat {
    /// 8 bits per channel RGBA
    #[default]
    Rgba8,
    /// 32-bit float RGBA
    Rgba32F,
}

/// Framebuffer creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBufferDesc {
    /// Width in pixels, at least 1
    pub width: u32,
    /// Height in pixels, at least 1
    pub height: u32,
    /// Pixel format
    pub format: ColorFormat,
}

/// One geometry draw emitted by the render pass
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Geometry to draw
    pub geometry: ResourceHandle,
    /// Material bound at commit time
    pub material: Option<ResourceHandle>,
    /// Model matrix
    pub model: Mat4,
    /// Camera projection * view
    pub view_projection: Mat4,
}

/// Native rendering backend driven by commit and render
pub trait RenderBackend {
    /// Create triangle geometry
    fn create_geometry(&mut self, desc: &GeometryDesc<'_>) -> BackendResult<ResourceHandle>;

    /// Create a material
    fn create_material(&mut self, desc: &MaterialDesc) -> BackendResult<ResourceHandle>;

    /// Create a framebuffer
    fn create_framebuffer(&mut self, desc: &FrameBufferDesc) -> BackendResult<ResourceHandle>;

    /// Create an empty model
    fn create_model(&mut self) -> BackendResult<ResourceHandle>;

    /// Add a geometry to a model
    fn attach_geometry(&mut self, model: ResourceHandle, geometry: ResourceHandle) -> BackendResult<()>;

    /// Remove a geometry from a model; geometries the model does not hold are ignored
    fn detach_geometry(&mut self, model: ResourceHandle, geometry: ResourceHandle) -> BackendResult<()>;

    /// Finalize a model after its geometries changed
    fn commit_model(&mut self, model: ResourceHandle) -> BackendResult<()>;

    /// Record a draw
    fn draw(&mut self, call: &DrawCall) -> BackendResult<()>;

    /// Release a native object; unknown handles are ignored
    fn release(&mut self, handle: ResourceHandle);

    /// Downcast to the concrete backend type
    fn as_any(&self) -> &dyn Any;
}
