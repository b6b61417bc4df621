//! Materials and their extension sub-records.
//!
//! Every extension sub-record is an exclusively-owned, nullable boxed field:
//! it exists only when its JSON object was present and the extension enabled,
//! and it is dropped with the material. Ownership is strictly tree-shaped.

use glam::Vec2;

/// UV transform from `KHR_texture_transform`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureTransform {
    pub offset: Vec2,
    /// Rotation around the UV origin, in radians.
    pub rotation: f32,
    pub scale: Vec2,
    /// Overrides the texture coordinate set of the owning texture reference.
    pub tex_coord: Option<usize>,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            tex_coord: None,
        }
    }
}

/// Reference from a material to a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub texture: usize,
    /// Which TEXCOORD_n attribute set to sample with.
    pub tex_coord: usize,
    pub transform: Option<Box<TextureTransform>>,
}

impl TextureInfo {
    pub fn new(texture: usize) -> Self {
        Self {
            texture,
            tex_coord: 0,
            transform: None,
        }
    }
}

/// A texture reference carrying a normal scale.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalTextureInfo {
    pub texture: TextureInfo,
    pub scale: f32,
}

/// A texture reference carrying an occlusion strength.
#[derive(Debug, Clone, PartialEq)]
pub struct OcclusionTextureInfo {
    pub texture: TextureInfo,
    pub strength: f32,
}

/// How the alpha channel of the base color is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "OPAQUE" => Some(Self::Opaque),
            "MASK" => Some(Self::Mask),
            "BLEND" => Some(Self::Blend),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Opaque => "OPAQUE",
            Self::Mask => "MASK",
            Self::Blend => "BLEND",
        }
    }
}

/// The metallic-roughness core of a material.
#[derive(Debug, Clone, PartialEq)]
pub struct PbrData {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<TextureInfo>,
}

impl Default for PbrData {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
        }
    }
}

/// `KHR_materials_anisotropy`.
#[derive(Debug, Clone, PartialEq)]
pub struct Anisotropy {
    pub strength: f32,
    pub rotation: f32,
    pub texture: Option<TextureInfo>,
}

impl Default for Anisotropy {
    fn default() -> Self {
        Self {
            strength: 0.0,
            rotation: 0.0,
            texture: None,
        }
    }
}

/// `KHR_materials_clearcoat`.
#[derive(Debug, Clone, PartialEq)]
pub struct Clearcoat {
    pub factor: f32,
    pub texture: Option<TextureInfo>,
    pub roughness_factor: f32,
    pub roughness_texture: Option<TextureInfo>,
    pub normal_texture: Option<NormalTextureInfo>,
}

impl Default for Clearcoat {
    fn default() -> Self {
        Self {
            factor: 0.0,
            texture: None,
            roughness_factor: 0.0,
            roughness_texture: None,
            normal_texture: None,
        }
    }
}

/// `KHR_materials_iridescence`.
#[derive(Debug, Clone, PartialEq)]
pub struct Iridescence {
    pub factor: f32,
    pub texture: Option<TextureInfo>,
    pub ior: f32,
    pub thickness_minimum: f32,
    pub thickness_maximum: f32,
    pub thickness_texture: Option<TextureInfo>,
}

impl Default for Iridescence {
    fn default() -> Self {
        Self {
            factor: 0.0,
            texture: None,
            ior: 1.3,
            thickness_minimum: 100.0,
            thickness_maximum: 400.0,
            thickness_texture: None,
        }
    }
}

/// `KHR_materials_sheen`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheen {
    pub color_factor: [f32; 3],
    pub color_texture: Option<TextureInfo>,
    pub roughness_factor: f32,
    pub roughness_texture: Option<TextureInfo>,
}

impl Default for Sheen {
    fn default() -> Self {
        Self {
            color_factor: [0.0; 3],
            color_texture: None,
            roughness_factor: 0.0,
            roughness_texture: None,
        }
    }
}

/// `KHR_materials_specular`.
#[derive(Debug, Clone, PartialEq)]
pub struct Specular {
    pub factor: f32,
    pub texture: Option<TextureInfo>,
    pub color_factor: [f32; 3],
    pub color_texture: Option<TextureInfo>,
}

impl Default for Specular {
    fn default() -> Self {
        Self {
            factor: 1.0,
            texture: None,
            color_factor: [1.0; 3],
            color_texture: None,
        }
    }
}

/// `KHR_materials_transmission`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transmission {
    pub factor: f32,
    pub texture: Option<TextureInfo>,
}

impl Default for Transmission {
    fn default() -> Self {
        Self {
            factor: 0.0,
            texture: None,
        }
    }
}

/// `KHR_materials_volume`.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub thickness_factor: f32,
    pub thickness_texture: Option<TextureInfo>,
    pub attenuation_distance: f32,
    pub attenuation_color: [f32; 3],
}

impl Default for Volume {
    fn default() -> Self {
        Self {
            thickness_factor: 0.0,
            thickness_texture: None,
            attenuation_distance: f32::INFINITY,
            attenuation_color: [1.0; 3],
        }
    }
}

/// Packed texture variants from the `MSFT_packing_*` extensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedTextures {
    /// `MSFT_packing_normalRoughnessMetallic`.
    pub normal_roughness_metallic: Option<TextureInfo>,
    /// `MSFT_packing_occlusionRoughnessMetallic`, ORM order.
    pub occlusion_roughness_metallic: Option<TextureInfo>,
    /// `MSFT_packing_occlusionRoughnessMetallic`, RMO order.
    pub roughness_metallic_occlusion: Option<TextureInfo>,
    /// Two-channel normal texture of the ORM packing.
    pub normal: Option<TextureInfo>,
}

/// Surface appearance of a primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub pbr: PbrData,
    pub normal_texture: Option<NormalTextureInfo>,
    pub occlusion_texture: Option<OcclusionTextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    pub emissive_factor: [f32; 3],
    pub alpha_mode: AlphaMode,
    /// Alpha threshold for `AlphaMode::Mask`.
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    /// `KHR_materials_unlit`.
    pub unlit: bool,
    /// `KHR_materials_ior`. 1.5 when the extension is absent.
    pub ior: f32,
    /// `KHR_materials_emissive_strength`. 1.0 when the extension is absent.
    pub emissive_strength: f32,
    /// `KHR_materials_dispersion`. 0.0 when the extension is absent.
    pub dispersion: f32,

    pub anisotropy: Option<Box<Anisotropy>>,
    pub clearcoat: Option<Box<Clearcoat>>,
    pub iridescence: Option<Box<Iridescence>>,
    pub sheen: Option<Box<Sheen>>,
    pub specular: Option<Box<Specular>>,
    pub transmission: Option<Box<Transmission>>,
    pub volume: Option<Box<Volume>>,
    pub packed_textures: Option<Box<PackedTextures>>,

    pub name: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            pbr: PbrData::default(),
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0; 3],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            unlit: false,
            ior: 1.5,
            emissive_strength: 1.0,
            dispersion: 0.0,
            anisotropy: None,
            clearcoat: None,
            iridescence: None,
            sheen: None,
            specular: None,
            transmission: None,
            volume: None,
            packed_textures: None,
            name: None,
        }
    }
}
