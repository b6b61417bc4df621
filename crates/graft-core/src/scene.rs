//! Scenes, nodes and skins.

use glam::{Mat4, Quat, Vec3};

use crate::mesh::AttributeMap;

/// Local transform of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Decomposed translation, rotation and scale.
    Trs {
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
    /// A column-major 4x4 matrix.
    Matrix(Mat4),
}

impl Transform {
    pub const IDENTITY: Transform = Transform::Trs {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// The transform as a matrix, composing TRS if needed.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Trs {
                translation,
                rotation,
                scale,
            } => Mat4::from_scale_rotation_translation(scale, rotation, translation),
            Self::Matrix(m) => m,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A node in the scene hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub mesh: Option<usize>,
    pub camera: Option<usize>,
    pub skin: Option<usize>,
    /// Light index from the `KHR_lights_punctual` node extension.
    pub light: Option<usize>,
    pub children: Vec<usize>,
    /// Morph target weights, overriding the mesh defaults.
    pub weights: Vec<f32>,
    pub transform: Transform,
    /// Per-instance attribute accessors from `EXT_mesh_gpu_instancing`.
    /// Empty when the extension is absent.
    pub instancing_attributes: AttributeMap,
    pub name: Option<String>,
}

/// A set of root nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub nodes: Vec<usize>,
    pub name: Option<String>,
}

/// Joints and inverse bind matrices for skeletal animation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skin {
    pub joints: Vec<usize>,
    pub skeleton: Option<usize>,
    /// Accessor holding one Mat4 per joint.
    pub inverse_bind_matrices: Option<usize>,
    pub name: Option<String>,
}
