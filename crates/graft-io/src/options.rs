//! Parser and exporter configuration: option bitmasks, the extension
//! catalog and the caller-supplied hook types.

use bitflags::bitflags;
use graft_core::Categories;

use crate::hash::{hash_str, keys};
use crate::Result;

bitflags! {
    /// Behavioral switches for a parse call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ParseOptions: u64 {
        /// Accept 5130 (`GL_DOUBLE`) as an accessor component type without
        /// the `KHR_accessor_float64` extension.
        const ALLOW_DOUBLE = 1 << 0;
        /// Do not fail when the `asset` member is missing or invalid.
        const DONT_REQUIRE_VALID_ASSET_MEMBER = 1 << 1;
        /// Eagerly read external buffer files instead of leaving a lazy URI
        /// reference.
        const LOAD_EXTERNAL_BUFFERS = 1 << 4;
        /// Decompose node matrices into translation/rotation/scale.
        const DECOMPOSE_NODE_MATRICES = 1 << 5;
        /// Eagerly read external image files. Complementary to
        /// `LOAD_EXTERNAL_BUFFERS`; image bytes are not decoded.
        const LOAD_EXTERNAL_IMAGES = 1 << 7;
        /// Synthesize an index accessor for every primitive that lacks one.
        const GENERATE_MESH_INDICES = 1 << 8;
    }
}

bitflags! {
    /// The extensions a parser is willing to honor.
    ///
    /// An extension present in a document but absent from this set is
    /// skipped without error, unless the document requires it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Extensions: u64 {
        const KHR_TEXTURE_TRANSFORM = 1 << 1;
        const KHR_TEXTURE_BASISU = 1 << 2;
        const MSFT_TEXTURE_DDS = 1 << 3;
        const KHR_MESH_QUANTIZATION = 1 << 4;
        const EXT_MESHOPT_COMPRESSION = 1 << 5;
        const KHR_LIGHTS_PUNCTUAL = 1 << 6;
        const EXT_TEXTURE_WEBP = 1 << 8;
        const KHR_MATERIALS_SPECULAR = 1 << 9;
        const KHR_MATERIALS_IOR = 1 << 10;
        const KHR_MATERIALS_IRIDESCENCE = 1 << 11;
        const KHR_MATERIALS_VOLUME = 1 << 12;
        const KHR_MATERIALS_TRANSMISSION = 1 << 13;
        const KHR_MATERIALS_CLEARCOAT = 1 << 14;
        const KHR_MATERIALS_EMISSIVE_STRENGTH = 1 << 15;
        const KHR_MATERIALS_SHEEN = 1 << 16;
        const KHR_MATERIALS_UNLIT = 1 << 17;
        const KHR_MATERIALS_ANISOTROPY = 1 << 18;
        const EXT_MESH_GPU_INSTANCING = 1 << 19;
        const MSFT_PACKING_NORMAL_ROUGHNESS_METALLIC = 1 << 21;
        const MSFT_PACKING_OCCLUSION_ROUGHNESS_METALLIC = 1 << 22;
        const KHR_MATERIALS_DISPERSION = 1 << 23;
        const KHR_MATERIALS_VARIANTS = 1 << 24;
        const KHR_ACCESSOR_FLOAT64 = 1 << 25;
    }
}

bitflags! {
    /// Behavioral switches for an export call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExportOptions: u64 {
        /// Run the validator over the asset before writing.
        const VALIDATE_ASSET = 1 << 1;
        /// Re-indent the output JSON. Ignored for binary export.
        const PRETTY_PRINT_JSON = 1 << 2;
    }
}

/// Every extension graft understands, with its flag bit.
pub const SUPPORTED_EXTENSIONS: &[(&str, Extensions)] = &[
    ("EXT_mesh_gpu_instancing", Extensions::EXT_MESH_GPU_INSTANCING),
    ("EXT_meshopt_compression", Extensions::EXT_MESHOPT_COMPRESSION),
    ("EXT_texture_webp", Extensions::EXT_TEXTURE_WEBP),
    ("KHR_accessor_float64", Extensions::KHR_ACCESSOR_FLOAT64),
    ("KHR_lights_punctual", Extensions::KHR_LIGHTS_PUNCTUAL),
    ("KHR_materials_anisotropy", Extensions::KHR_MATERIALS_ANISOTROPY),
    ("KHR_materials_clearcoat", Extensions::KHR_MATERIALS_CLEARCOAT),
    ("KHR_materials_dispersion", Extensions::KHR_MATERIALS_DISPERSION),
    (
        "KHR_materials_emissive_strength",
        Extensions::KHR_MATERIALS_EMISSIVE_STRENGTH,
    ),
    ("KHR_materials_ior", Extensions::KHR_MATERIALS_IOR),
    ("KHR_materials_iridescence", Extensions::KHR_MATERIALS_IRIDESCENCE),
    ("KHR_materials_sheen", Extensions::KHR_MATERIALS_SHEEN),
    ("KHR_materials_specular", Extensions::KHR_MATERIALS_SPECULAR),
    (
        "KHR_materials_transmission",
        Extensions::KHR_MATERIALS_TRANSMISSION,
    ),
    ("KHR_materials_unlit", Extensions::KHR_MATERIALS_UNLIT),
    ("KHR_materials_variants", Extensions::KHR_MATERIALS_VARIANTS),
    ("KHR_materials_volume", Extensions::KHR_MATERIALS_VOLUME),
    ("KHR_mesh_quantization", Extensions::KHR_MESH_QUANTIZATION),
    ("KHR_texture_basisu", Extensions::KHR_TEXTURE_BASISU),
    ("KHR_texture_transform", Extensions::KHR_TEXTURE_TRANSFORM),
    (
        "MSFT_packing_normalRoughnessMetallic",
        Extensions::MSFT_PACKING_NORMAL_ROUGHNESS_METALLIC,
    ),
    (
        "MSFT_packing_occlusionRoughnessMetallic",
        Extensions::MSFT_PACKING_OCCLUSION_ROUGHNESS_METALLIC,
    ),
    ("MSFT_texture_dds", Extensions::MSFT_TEXTURE_DDS),
];

/// Map an extension name to its flag bit via hash dispatch.
pub fn extension_flag(name: &str) -> Option<Extensions> {
    let flag = match hash_str(name) {
        keys::EXT_MESH_GPU_INSTANCING => Extensions::EXT_MESH_GPU_INSTANCING,
        keys::EXT_MESHOPT_COMPRESSION => Extensions::EXT_MESHOPT_COMPRESSION,
        keys::EXT_TEXTURE_WEBP => Extensions::EXT_TEXTURE_WEBP,
        keys::KHR_ACCESSOR_FLOAT64 => Extensions::KHR_ACCESSOR_FLOAT64,
        keys::KHR_LIGHTS_PUNCTUAL => Extensions::KHR_LIGHTS_PUNCTUAL,
        keys::KHR_MATERIALS_ANISOTROPY => Extensions::KHR_MATERIALS_ANISOTROPY,
        keys::KHR_MATERIALS_CLEARCOAT => Extensions::KHR_MATERIALS_CLEARCOAT,
        keys::KHR_MATERIALS_DISPERSION => Extensions::KHR_MATERIALS_DISPERSION,
        keys::KHR_MATERIALS_EMISSIVE_STRENGTH => Extensions::KHR_MATERIALS_EMISSIVE_STRENGTH,
        keys::KHR_MATERIALS_IOR => Extensions::KHR_MATERIALS_IOR,
        keys::KHR_MATERIALS_IRIDESCENCE => Extensions::KHR_MATERIALS_IRIDESCENCE,
        keys::KHR_MATERIALS_SHEEN => Extensions::KHR_MATERIALS_SHEEN,
        keys::KHR_MATERIALS_SPECULAR => Extensions::KHR_MATERIALS_SPECULAR,
        keys::KHR_MATERIALS_TRANSMISSION => Extensions::KHR_MATERIALS_TRANSMISSION,
        keys::KHR_MATERIALS_UNLIT => Extensions::KHR_MATERIALS_UNLIT,
        keys::KHR_MATERIALS_VARIANTS => Extensions::KHR_MATERIALS_VARIANTS,
        keys::KHR_MATERIALS_VOLUME => Extensions::KHR_MATERIALS_VOLUME,
        keys::KHR_MESH_QUANTIZATION => Extensions::KHR_MESH_QUANTIZATION,
        keys::KHR_TEXTURE_BASISU => Extensions::KHR_TEXTURE_BASISU,
        keys::KHR_TEXTURE_TRANSFORM => Extensions::KHR_TEXTURE_TRANSFORM,
        keys::MSFT_PACKING_NRM => Extensions::MSFT_PACKING_NORMAL_ROUGHNESS_METALLIC,
        keys::MSFT_PACKING_ORM => Extensions::MSFT_PACKING_OCCLUSION_ROUGHNESS_METALLIC,
        keys::MSFT_TEXTURE_DDS => Extensions::MSFT_TEXTURE_DDS,
        _ => return None,
    };
    // A hash match alone is not trusted; the string must equal the one
    // candidate it mapped to.
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|(known, f)| *f == flag && *known == name)
        .map(|(_, f)| *f)
}

/// Caller-owned memory lent out for one buffer's decoded bytes.
pub struct MappedBuffer<'a> {
    /// Destination for exactly the requested byte length.
    pub bytes: &'a mut [u8],
    /// Opaque handle the caller uses to identify the buffer later; it ends
    /// up in [`graft_core::DataSource::Custom`].
    pub id: u64,
}

/// Lets the caller place decoded buffer bytes directly into caller-owned
/// memory.
///
/// The contract is a strict acquire-use-release scope: `map` must return
/// writable memory of the requested length before any decode writes happen,
/// and `unmap` is called with the handle immediately after the writes for
/// that buffer complete. Scopes of distinct buffers never overlap.
pub trait BufferMapper {
    fn map(&mut self, byte_len: usize) -> Option<MappedBuffer<'_>>;
    fn unmap(&mut self, id: u64);
}

/// Overrides the built-in base64 decoder. Receives the encoded payload and
/// the exact-size output slice.
pub type Base64Decoder = dyn Fn(&str, &mut [u8]) -> Result<()> + Send + Sync;

/// Receives the raw `extras` value of each parsed entity, with the entity's
/// section and index. The root-level `extras` is reported with an empty
/// category set and index 0.
pub type ExtrasParseHook = dyn FnMut(Categories, usize, &serde_json::Value) + Send;

/// Supplies serialized `extras` JSON for an entity being written, or `None`
/// for no extras.
pub type ExtrasWriteHook = dyn Fn(Categories, usize) -> Option<String> + Send + Sync;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_flags_resolve() {
        for (name, flag) in SUPPORTED_EXTENSIONS {
            assert_eq!(extension_flag(name), Some(*flag), "{name}");
        }
        assert_eq!(extension_flag("KHR_not_a_thing"), None);
    }
}
