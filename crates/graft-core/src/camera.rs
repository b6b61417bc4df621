//! Cameras.

/// Projection parameters of a camera.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraProjection {
    Perspective {
        aspect_ratio: Option<f32>,
        /// Vertical field of view in radians.
        yfov: f32,
        znear: f32,
        /// Infinite projection when absent.
        zfar: Option<f32>,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        zfar: f32,
        znear: f32,
    },
}

/// A camera referenced by a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub projection: CameraProjection,
    pub name: Option<String>,
}
