//! Meshes and their primitives.

use indexmap::IndexMap;

/// Attribute semantic name to accessor index, unique by name.
///
/// Insertion order is preserved for serialization but is irrelevant for
/// lookup.
pub type AttributeMap = IndexMap<String, usize>;

/// Primitive topology, by OpenGL constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            _ => None,
        }
    }

    pub fn gl_code(self) -> u32 {
        match self {
            Self::Points => 0,
            Self::Lines => 1,
            Self::LineLoop => 2,
            Self::LineStrip => 3,
            Self::Triangles => 4,
            Self::TriangleStrip => 5,
            Self::TriangleFan => 6,
        }
    }
}

/// A drawable part of a mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Primitive {
    pub attributes: AttributeMap,
    /// Morph targets; each target carries the same attribute-map shape.
    pub targets: Vec<AttributeMap>,
    pub mode: PrimitiveMode,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    /// Per-variant material mapping from `KHR_materials_variants`, parallel
    /// to the asset's variant list. Empty when the extension is absent.
    pub variant_mappings: Vec<Option<usize>>,
}

impl Primitive {
    /// Look up an attribute accessor by semantic name.
    pub fn find_attribute(&self, name: &str) -> Option<usize> {
        self.attributes.get(name).copied()
    }
}

/// A collection of primitives rendered together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
    /// Default morph target weights.
    pub weights: Vec<f32>,
    pub name: Option<String>,
}
