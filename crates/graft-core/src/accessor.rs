//! Typed interpretation of buffer data.

use smallvec::SmallVec;

/// Scalar component type of an accessor, by OpenGL constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// 5120
    Byte,
    /// 5121
    UnsignedByte,
    /// 5122
    Short,
    /// 5123
    UnsignedShort,
    /// 5124
    Int,
    /// 5125
    UnsignedInt,
    /// 5126
    Float,
    /// 5130. Not part of core glTF; accepted with the double-precision
    /// option or the `KHR_accessor_float64` extension.
    Double,
}

impl ComponentType {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            5120 => Some(Self::Byte),
            5121 => Some(Self::UnsignedByte),
            5122 => Some(Self::Short),
            5123 => Some(Self::UnsignedShort),
            5124 => Some(Self::Int),
            5125 => Some(Self::UnsignedInt),
            5126 => Some(Self::Float),
            5130 => Some(Self::Double),
            _ => None,
        }
    }

    pub fn gl_code(self) -> u32 {
        match self {
            Self::Byte => 5120,
            Self::UnsignedByte => 5121,
            Self::Short => 5122,
            Self::UnsignedShort => 5123,
            Self::Int => 5124,
            Self::UnsignedInt => 5125,
            Self::Float => 5126,
            Self::Double => 5130,
        }
    }

    /// Size of one component in bytes.
    pub fn byte_size(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
            Self::Double => 8,
        }
    }

    /// Whether values are floating-point.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

/// Element shape of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(Self::Scalar),
            "VEC2" => Some(Self::Vec2),
            "VEC3" => Some(Self::Vec3),
            "VEC4" => Some(Self::Vec4),
            "MAT2" => Some(Self::Mat2),
            "MAT3" => Some(Self::Mat3),
            "MAT4" => Some(Self::Mat4),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }

    /// Number of components in one element.
    pub fn component_count(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// Per-component bounds of an accessor.
///
/// The list kind is coupled to the component type: floating-point accessors
/// carry `Floats`, integer accessors carry `Ints`.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessorBounds {
    Floats(SmallVec<[f64; 4]>),
    Ints(SmallVec<[i64; 4]>),
}

/// Sparse storage sub-description of an accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseAccessor {
    /// Number of displaced elements.
    pub count: usize,
    /// Buffer view holding the displaced element indices.
    pub indices_view: usize,
    pub indices_offset: usize,
    /// Component type of the stored indices.
    pub index_component_type: ComponentType,
    /// Buffer view holding the displaced element values.
    pub values_view: usize,
    pub values_offset: usize,
}

/// Describes how to interpret a byte range of a buffer as typed numeric
/// array data.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub kind: AccessorKind,
    /// Number of elements, not bytes or components.
    pub count: usize,
    pub normalized: bool,
    pub min: Option<AccessorBounds>,
    pub max: Option<AccessorBounds>,
    pub sparse: Option<SparseAccessor>,
    pub name: Option<String>,
}

impl Accessor {
    /// Total byte size of one element.
    pub fn element_byte_size(&self) -> usize {
        self.component_type.byte_size() * self.kind.component_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_sizes() {
        assert_eq!(ComponentType::UnsignedByte.byte_size(), 1);
        assert_eq!(ComponentType::UnsignedShort.byte_size(), 2);
        assert_eq!(ComponentType::Float.byte_size(), 4);
        assert_eq!(ComponentType::Double.byte_size(), 8);
    }

    #[test]
    fn gl_roundtrip() {
        for code in [5120u64, 5121, 5122, 5123, 5124, 5125, 5126, 5130] {
            let ty = ComponentType::from_gl(code).unwrap();
            assert_eq!(u64::from(ty.gl_code()), code);
        }
        assert!(ComponentType::from_gl(5127).is_none());
    }
}
