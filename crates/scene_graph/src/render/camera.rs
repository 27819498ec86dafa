//! # Viewing Camera
//!
//! Frame-level camera handed to the render pass through
//! [`FrameParams`](crate::scene::FrameParams). The scene graph itself never
//! inspects it; leaves pass the combined matrix on to the backend with each
//! draw call.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// Perspective camera described by eye, target and up vector
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position in world space
    pub from: Vec3,

    /// Point the camera looks at
    pub at: Vec3,

    /// Up vector (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in degrees
    pub fov_y: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            from: Vec3::new(0.0, -1.0, 0.0),
            at: Vec3::zeros(),
            up: Vec3::new(0.0, 0.0, 1.0),
            fov_y: 60.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Camera looking at `at` from `from`
    pub fn look_at(from: Vec3, at: Vec3, up: Vec3) -> Self {
        Self { from, at, up, ..Self::default() }
    }

    /// Set the aspect ratio from a viewport size
    #[must_use]
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
        self
    }

    /// View matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.from, self.at, self.up)
    }

    /// Projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    /// Projection * view
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Camera framing a bounding box from the current viewing direction
    ///
    /// Keeps `up` and the direction from `at` to `from`; moves the target to
    /// the box center and backs off far enough to see the whole box.
    #[must_use]
    pub fn framing(&self, bounds: &crate::foundation::math::AABB) -> Self {
        if bounds.is_empty() {
            return self.clone();
        }
        let center = bounds.center();
        let radius = bounds.extents().magnitude().max(f32::EPSILON);
        let direction = (self.from - self.at)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vec3::new(0.0, -1.0, 0.0));
        let distance = radius / (self.fov_y.to_radians() * 0.5).sin();
        Self {
            from: center + direction * distance,
            at: center,
            ..self.clone()
        }
    }
}
