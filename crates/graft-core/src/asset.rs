//! The asset root and the top-level section bitmask.

use bitflags::bitflags;

use crate::accessor::Accessor;
use crate::animation::Animation;
use crate::buffer::{Buffer, BufferView};
use crate::camera::Camera;
use crate::light::Light;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::scene::{Node, Scene, Skin};
use crate::texture::{Image, Sampler, Texture};

bitflags! {
    /// Bitmask over the top-level document sections.
    ///
    /// Used both to request which sections a parse should materialize and to
    /// report which sections were actually present in a document.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Categories: u32 {
        const BUFFERS      = 1 << 0;
        const BUFFER_VIEWS = 1 << 1;
        const ACCESSORS    = 1 << 2;
        const IMAGES       = 1 << 3;
        const SAMPLERS     = 1 << 4;
        const TEXTURES     = 1 << 5;
        const ANIMATIONS   = 1 << 6;
        const CAMERAS      = 1 << 7;
        const MATERIALS    = 1 << 8;
        const MESHES       = 1 << 9;
        const SKINS        = 1 << 10;
        const NODES        = 1 << 11;
        const SCENES       = 1 << 12;
        const ASSET_INFO   = 1 << 13;

        /// Everything.
        const ALL = (1 << 14) - 1;
        /// Everything needed for rendering, without animation data.
        const ONLY_RENDERABLE = Self::ALL.bits() & !Self::ANIMATIONS.bits() & !Self::SKINS.bits();
        /// Animation data and the sections it depends on.
        const ONLY_ANIMATIONS = Self::ANIMATIONS.bits()
            | Self::ACCESSORS.bits()
            | Self::BUFFER_VIEWS.bits()
            | Self::BUFFERS.bits();
    }
}

/// Metadata from the document's `asset` member.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInfo {
    /// glTF version string, e.g. `"2.0"`.
    pub version: String,
    /// Minimum glTF version required to load the asset.
    pub min_version: Option<String>,
    /// Tool that produced the asset.
    pub generator: Option<String>,
    pub copyright: Option<String>,
}

impl Default for AssetInfo {
    fn default() -> Self {
        Self {
            version: "2.0".to_string(),
            min_version: None,
            generator: None,
            copyright: None,
        }
    }
}

/// A parsed glTF document.
///
/// All cross-references between entities are plain indices into the sibling
/// collections; bounds are not guaranteed until `graft_io::validate` has
/// accepted the asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Asset {
    /// Contents of the `asset` member, if it was present and requested.
    pub info: Option<AssetInfo>,
    /// Index of the scene to display first.
    pub default_scene: Option<usize>,

    pub accessors: Vec<Accessor>,
    pub animations: Vec<Animation>,
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub cameras: Vec<Camera>,
    pub images: Vec<Image>,
    /// Lights from the `KHR_lights_punctual` root extension.
    pub lights: Vec<Light>,
    pub materials: Vec<Material>,
    /// Variant names from the `KHR_materials_variants` root extension.
    pub material_variants: Vec<String>,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub samplers: Vec<Sampler>,
    pub scenes: Vec<Scene>,
    pub skins: Vec<Skin>,
    pub textures: Vec<Texture>,

    /// Extension names the document declares to use.
    pub extensions_used: Vec<String>,
    /// Extension names the document requires. Must be a subset of
    /// `extensions_used`.
    pub extensions_required: Vec<String>,

    /// Sections that were present in the document, regardless of which were
    /// requested for materialization.
    pub available_categories: Categories,
}

impl Asset {
    /// Whether the given extension name appears in `extensions_used`.
    pub fn uses_extension(&self, name: &str) -> bool {
        self.extensions_used.iter().any(|used| used == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_categories() {
        assert!(Categories::ALL.contains(Categories::ASSET_INFO));
        assert!(!Categories::ONLY_RENDERABLE.contains(Categories::ANIMATIONS));
        assert!(!Categories::ONLY_RENDERABLE.contains(Categories::SKINS));
        assert!(Categories::ONLY_ANIMATIONS.contains(Categories::BUFFERS));
        assert!(!Categories::ONLY_ANIMATIONS.contains(Categories::MESHES));
    }
}
