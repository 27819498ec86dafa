//! Rendering abstraction
//!
//! The scene graph talks to native renderers only through the
//! [`RenderBackend`] trait. [`RecordingBackend`] is the in-memory
//! implementation used for headless runs and tests.

pub mod backend;
pub mod camera;
pub mod recording;

pub use backend::{
    BackendError, BackendResult, ColorFormat, DrawCall, FrameBufferDesc, GeometryDesc, MaterialDesc,
    RenderBackend, ResourceHandle, ResourceKind,
};
pub use camera::Camera;
pub use recording::{RecordedGeometry, RecordingBackend};
