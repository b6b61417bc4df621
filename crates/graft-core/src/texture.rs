//! Textures, images and samplers.

use crate::buffer::DataSource;

/// Texture minification/magnification filter, by OpenGL constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// 9728
    Nearest,
    /// 9729
    Linear,
    /// 9984
    NearestMipMapNearest,
    /// 9985
    LinearMipMapNearest,
    /// 9986
    NearestMipMapLinear,
    /// 9987
    LinearMipMapLinear,
}

impl Filter {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            9728 => Some(Self::Nearest),
            9729 => Some(Self::Linear),
            9984 => Some(Self::NearestMipMapNearest),
            9985 => Some(Self::LinearMipMapNearest),
            9986 => Some(Self::NearestMipMapLinear),
            9987 => Some(Self::LinearMipMapLinear),
            _ => None,
        }
    }

    pub fn gl_code(self) -> u32 {
        match self {
            Self::Nearest => 9728,
            Self::Linear => 9729,
            Self::NearestMipMapNearest => 9984,
            Self::LinearMipMapNearest => 9985,
            Self::NearestMipMapLinear => 9986,
            Self::LinearMipMapLinear => 9987,
        }
    }
}

/// Texture coordinate wrapping mode, by OpenGL constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    /// 33071
    ClampToEdge,
    /// 33648
    MirroredRepeat,
    /// 10497
    #[default]
    Repeat,
}

impl Wrap {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            33071 => Some(Self::ClampToEdge),
            33648 => Some(Self::MirroredRepeat),
            10497 => Some(Self::Repeat),
            _ => None,
        }
    }

    pub fn gl_code(self) -> u32 {
        match self {
            Self::ClampToEdge => 33071,
            Self::MirroredRepeat => 33648,
            Self::Repeat => 10497,
        }
    }
}

/// Filtering and wrapping configuration for sampling a texture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sampler {
    pub mag_filter: Option<Filter>,
    pub min_filter: Option<Filter>,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub name: Option<String>,
}

/// Image pixel data, undecoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub data: DataSource,
    pub name: Option<String>,
}

/// Pairs an image with a sampler.
///
/// The alternate image indices come from the texture-container extensions;
/// which one a consumer prefers is up to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texture {
    pub sampler: Option<usize>,
    pub image: Option<usize>,
    /// `KHR_texture_basisu`
    pub basisu_image: Option<usize>,
    /// `MSFT_texture_dds`
    pub dds_image: Option<usize>,
    /// `EXT_texture_webp`
    pub webp_image: Option<usize>,
    pub name: Option<String>,
}
