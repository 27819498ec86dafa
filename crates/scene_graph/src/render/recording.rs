//! In-memory backend that records every call
//!
//! Used by tests and the headless viewer. Handles are handed out
//! sequentially starting at 1, and every creation, attachment, release and
//! draw is kept for inspection.

use std::any::Any;
use std::collections::HashMap;

use super::backend::{
    BackendError, BackendResult, DrawCall, FrameBufferDesc, GeometryDesc, MaterialDesc, RenderBackend,
    ResourceHandle, ResourceKind,
};

/// Geometry as seen by the backend at creation time
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedGeometry {
    /// Number of vertices
    pub vertex_count: usize,
    /// Number of triangles
    pub triangle_count: usize,
    /// Number of per-vertex colors
    pub color_count: usize,
    /// Material bound at creation
    pub material: Option<ResourceHandle>,
    /// Per-triangle material table
    pub materials: Vec<ResourceHandle>,
    /// Per-triangle indices into `materials`
    pub material_ids: Vec<u32>,
}

/// Backend that keeps everything in memory
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_handle: u64,
    live: HashMap<ResourceHandle, ResourceKind>,
    creations: HashMap<ResourceKind, usize>,
    geometries: HashMap<ResourceHandle, RecordedGeometry>,
    materials: HashMap<ResourceHandle, MaterialDesc>,
    framebuffers: HashMap<ResourceHandle, FrameBufferDesc>,
    attachments: Vec<(ResourceHandle, ResourceHandle)>,
    committed_models: usize,
    released: Vec<ResourceHandle>,
    draws: Vec<DrawCall>,
    fail_next: Option<String>,
}

impl RecordingBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next creation call fail with `reason`
    pub fn fail_next_creation(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    /// Number of objects of one kind created so far
    pub fn creations(&self, kind: ResourceKind) -> usize {
        self.creations.get(&kind).copied().unwrap_or(0)
    }

    /// Number of objects of any kind created so far
    pub fn total_creations(&self) -> usize {
        self.creations.values().sum()
    }

    /// Whether a handle was created and not yet released
    pub fn is_live(&self, handle: ResourceHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Number of live objects
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Kind of a live handle
    pub fn kind_of(&self, handle: ResourceHandle) -> Option<ResourceKind> {
        self.live.get(&handle).copied()
    }

    /// Geometry parameters recorded at creation
    pub fn geometry(&self, handle: ResourceHandle) -> Option<&RecordedGeometry> {
        self.geometries.get(&handle)
    }

    /// Material parameters recorded at creation
    pub fn material(&self, handle: ResourceHandle) -> Option<&MaterialDesc> {
        self.materials.get(&handle)
    }

    /// Framebuffer parameters recorded at creation
    pub fn framebuffer(&self, handle: ResourceHandle) -> Option<&FrameBufferDesc> {
        self.framebuffers.get(&handle)
    }

    /// `(model, geometry)` pairs in attachment order
    pub fn attachments(&self) -> &[(ResourceHandle, ResourceHandle)] {
        &self.attachments
    }

    /// How many times a model was committed
    pub fn committed_models(&self) -> usize {
        self.committed_models
    }

    /// Released handles in release order
    pub fn released(&self) -> &[ResourceHandle] {
        &self.released
    }

    /// Draws recorded since the last [`RecordingBackend::clear_draws`]
    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Forget recorded draws, typically between frames
    pub fn clear_draws(&mut self) {
        self.draws.clear();
    }

    fn allocate(&mut self, kind: ResourceKind) -> BackendResult<ResourceHandle> {
        if let Some(reason) = self.fail_next.take() {
            log::warn!("Refusing to create {kind}: {reason}");
            return Err(BackendError::CreationFailed { kind, reason });
        }
        self.next_handle += 1;
        let handle = ResourceHandle(self.next_handle);
        self.live.insert(handle, kind);
        *self.creations.entry(kind).or_default() += 1;
        log::trace!("Created {kind} {handle}");
        Ok(handle)
    }

    fn expect_kind(&self, handle: ResourceHandle, expected: ResourceKind) -> BackendResult<()> {
        match self.live.get(&handle) {
            None => Err(BackendError::UnknownHandle(handle)),
            Some(&actual) if actual != expected => Err(BackendError::WrongKind { handle, expected, actual }),
            Some(_) => Ok(()),
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn create_geometry(&mut self, desc: &GeometryDesc<'_>) -> BackendResult<ResourceHandle> {
        for &material in desc.material.iter().chain(desc.materials) {
            self.expect_kind(material, ResourceKind::Material)?;
        }
        let handle = self.allocate(ResourceKind::Geometry)?;
        self.geometries.insert(
            handle,
            RecordedGeometry {
                vertex_count: desc.vertices.len(),
                triangle_count: desc.indices.len(),
                color_count: desc.colors.len(),
                material: desc.material,
                materials: desc.materials.to_vec(),
                material_ids: desc.material_ids.to_vec(),
            },
        );
        Ok(handle)
    }

    fn create_material(&mut self, desc: &MaterialDesc) -> BackendResult<ResourceHandle> {
        let handle = self.allocate(ResourceKind::Material)?;
        self.materials.insert(handle, *desc);
        Ok(handle)
    }

    fn create_framebuffer(&mut self, desc: &FrameBufferDesc) -> BackendResult<ResourceHandle> {
        let handle = self.allocate(ResourceKind::FrameBuffer)?;
        self.framebuffers.insert(handle, *desc);
        Ok(handle)
    }

    fn create_model(&mut self) -> BackendResult<ResourceHandle> {
        self.allocate(ResourceKind::Model)
    }

    fn attach_geometry(&mut self, model: ResourceHandle, geometry: ResourceHandle) -> BackendResult<()> {
        self.expect_kind(model, ResourceKind::Model)?;
        self.expect_kind(geometry, ResourceKind::Geometry)?;
        if !self.attachments.contains(&(model, geometry)) {
            self.attachments.push((model, geometry));
        }
        Ok(())
    }

    fn detach_geometry(&mut self, model: ResourceHandle, geometry: ResourceHandle) -> BackendResult<()> {
        self.expect_kind(model, ResourceKind::Model)?;
        self.attachments.retain(|pair| *pair != (model, geometry));
        Ok(())
    }

    fn commit_model(&mut self, model: ResourceHandle) -> BackendResult<()> {
        self.expect_kind(model, ResourceKind::Model)?;
        self.committed_models += 1;
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall) -> BackendResult<()> {
        self.expect_kind(call.geometry, ResourceKind::Geometry)?;
        self.draws.push(call.clone());
        Ok(())
    }

    fn release(&mut self, handle: ResourceHandle) {
        if self.live.remove(&handle).is_some() {
            self.geometries.remove(&handle);
            self.materials.remove(&handle);
            self.framebuffers.remove(&handle);
            self.attachments.retain(|(model, geometry)| *model != handle && *geometry != handle);
            self.released.push(handle);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
