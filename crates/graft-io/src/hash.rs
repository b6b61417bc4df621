//! CRC-32C string hashing for key dispatch.
//!
//! Document keys and extension names are matched by comparing a 32-bit hash
//! instead of the string itself; the known literals are hashed at compile
//! time through the `const fn` path. The hash is not used for integrity, only
//! for equality-class routing, and every dispatch site re-verifies the
//! original string against the one matched candidate before acting on it, so
//! a collision degrades to an ignored key rather than a misrouted one.

use std::sync::OnceLock;

/// CRC-32C (Castagnoli), reflected polynomial.
const POLYNOMIAL: u32 = 0x82F6_3B78;

const CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
}

/// Table-driven CRC-32C, usable in const context.
///
/// This is the portable implementation; it is also what hashes the known key
/// literals at compile time.
pub const fn crc32c(bytes: &[u8]) -> u32 {
    let mut crc = !0u32;
    let mut i = 0;
    while i < bytes.len() {
        crc = CRC_TABLE[((crc ^ bytes[i] as u32) & 0xFF) as usize] ^ (crc >> 8);
        i += 1;
    }
    !crc
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse4.2")]
unsafe fn crc32c_sse42(bytes: &[u8]) -> u32 {
    use std::arch::x86_64::{_mm_crc32_u64, _mm_crc32_u8};

    let mut chunks = bytes.chunks_exact(8);
    let mut crc = !0u64 & 0xFFFF_FFFF;
    for chunk in chunks.by_ref() {
        let value = u64::from_le_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]);
        crc = _mm_crc32_u64(crc, value);
    }
    let mut crc = crc as u32;
    for &byte in chunks.remainder() {
        crc = _mm_crc32_u8(crc, byte);
    }
    !crc
}

#[cfg(target_arch = "x86_64")]
fn hash_sse42(bytes: &[u8]) -> u32 {
    // Only ever selected after runtime detection of SSE4.2.
    unsafe { crc32c_sse42(bytes) }
}

type HashFn = fn(&[u8]) -> u32;

/// The routine picked for this process, chosen once on first use.
static ACTIVE: OnceLock<HashFn> = OnceLock::new();

fn select_implementation() -> HashFn {
    #[cfg(target_arch = "x86_64")]
    {
        if std::arch::is_x86_feature_detected!("sse4.2") {
            return hash_sse42;
        }
    }
    crc32c
}

/// Hash a byte string with the fastest routine available on this CPU.
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    (ACTIVE.get_or_init(select_implementation))(bytes)
}

/// Hash a string with the fastest routine available on this CPU.
pub fn hash_str(text: &str) -> u32 {
    hash_bytes(text.as_bytes())
}

/// Compile-time hashes of the known document keys and extension names.
pub(crate) mod keys {
    use super::crc32c;

    // Top-level document keys.
    pub const ACCESSORS: u32 = crc32c(b"accessors");
    pub const ANIMATIONS: u32 = crc32c(b"animations");
    pub const ASSET: u32 = crc32c(b"asset");
    pub const BUFFERS: u32 = crc32c(b"buffers");
    pub const BUFFER_VIEWS: u32 = crc32c(b"bufferViews");
    pub const CAMERAS: u32 = crc32c(b"cameras");
    pub const EXTENSIONS: u32 = crc32c(b"extensions");
    pub const EXTENSIONS_REQUIRED: u32 = crc32c(b"extensionsRequired");
    pub const EXTENSIONS_USED: u32 = crc32c(b"extensionsUsed");
    pub const EXTRAS: u32 = crc32c(b"extras");
    pub const IMAGES: u32 = crc32c(b"images");
    pub const MATERIALS: u32 = crc32c(b"materials");
    pub const MESHES: u32 = crc32c(b"meshes");
    pub const NODES: u32 = crc32c(b"nodes");
    pub const SAMPLERS: u32 = crc32c(b"samplers");
    pub const SCENE: u32 = crc32c(b"scene");
    pub const SCENES: u32 = crc32c(b"scenes");
    pub const SKINS: u32 = crc32c(b"skins");
    pub const TEXTURES: u32 = crc32c(b"textures");

    // Extension names.
    pub const EXT_MESH_GPU_INSTANCING: u32 = crc32c(b"EXT_mesh_gpu_instancing");
    pub const EXT_MESHOPT_COMPRESSION: u32 = crc32c(b"EXT_meshopt_compression");
    pub const EXT_TEXTURE_WEBP: u32 = crc32c(b"EXT_texture_webp");
    pub const KHR_ACCESSOR_FLOAT64: u32 = crc32c(b"KHR_accessor_float64");
    pub const KHR_LIGHTS_PUNCTUAL: u32 = crc32c(b"KHR_lights_punctual");
    pub const KHR_MATERIALS_ANISOTROPY: u32 = crc32c(b"KHR_materials_anisotropy");
    pub const KHR_MATERIALS_CLEARCOAT: u32 = crc32c(b"KHR_materials_clearcoat");
    pub const KHR_MATERIALS_DISPERSION: u32 = crc32c(b"KHR_materials_dispersion");
    pub const KHR_MATERIALS_EMISSIVE_STRENGTH: u32 = crc32c(b"KHR_materials_emissive_strength");
    pub const KHR_MATERIALS_IOR: u32 = crc32c(b"KHR_materials_ior");
    pub const KHR_MATERIALS_IRIDESCENCE: u32 = crc32c(b"KHR_materials_iridescence");
    pub const KHR_MATERIALS_SHEEN: u32 = crc32c(b"KHR_materials_sheen");
    pub const KHR_MATERIALS_SPECULAR: u32 = crc32c(b"KHR_materials_specular");
    pub const KHR_MATERIALS_TRANSMISSION: u32 = crc32c(b"KHR_materials_transmission");
    pub const KHR_MATERIALS_UNLIT: u32 = crc32c(b"KHR_materials_unlit");
    pub const KHR_MATERIALS_VARIANTS: u32 = crc32c(b"KHR_materials_variants");
    pub const KHR_MATERIALS_VOLUME: u32 = crc32c(b"KHR_materials_volume");
    pub const KHR_MESH_QUANTIZATION: u32 = crc32c(b"KHR_mesh_quantization");
    pub const KHR_TEXTURE_BASISU: u32 = crc32c(b"KHR_texture_basisu");
    pub const KHR_TEXTURE_TRANSFORM: u32 = crc32c(b"KHR_texture_transform");
    pub const MSFT_PACKING_NRM: u32 = crc32c(b"MSFT_packing_normalRoughnessMetallic");
    pub const MSFT_PACKING_ORM: u32 = crc32c(b"MSFT_packing_occlusionRoughnessMetallic");
    pub const MSFT_TEXTURE_DDS: u32 = crc32c(b"MSFT_texture_dds");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every known literal paired with its compile-time hash.
    const KNOWN: &[(&str, u32)] = &[
        ("accessors", keys::ACCESSORS),
        ("animations", keys::ANIMATIONS),
        ("asset", keys::ASSET),
        ("buffers", keys::BUFFERS),
        ("bufferViews", keys::BUFFER_VIEWS),
        ("cameras", keys::CAMERAS),
        ("extensions", keys::EXTENSIONS),
        ("extensionsRequired", keys::EXTENSIONS_REQUIRED),
        ("extensionsUsed", keys::EXTENSIONS_USED),
        ("extras", keys::EXTRAS),
        ("images", keys::IMAGES),
        ("materials", keys::MATERIALS),
        ("meshes", keys::MESHES),
        ("nodes", keys::NODES),
        ("samplers", keys::SAMPLERS),
        ("scene", keys::SCENE),
        ("scenes", keys::SCENES),
        ("skins", keys::SKINS),
        ("textures", keys::TEXTURES),
        ("EXT_mesh_gpu_instancing", keys::EXT_MESH_GPU_INSTANCING),
        ("EXT_meshopt_compression", keys::EXT_MESHOPT_COMPRESSION),
        ("EXT_texture_webp", keys::EXT_TEXTURE_WEBP),
        ("KHR_accessor_float64", keys::KHR_ACCESSOR_FLOAT64),
        ("KHR_lights_punctual", keys::KHR_LIGHTS_PUNCTUAL),
        ("KHR_materials_anisotropy", keys::KHR_MATERIALS_ANISOTROPY),
        ("KHR_materials_clearcoat", keys::KHR_MATERIALS_CLEARCOAT),
        ("KHR_materials_dispersion", keys::KHR_MATERIALS_DISPERSION),
        (
            "KHR_materials_emissive_strength",
            keys::KHR_MATERIALS_EMISSIVE_STRENGTH,
        ),
        ("KHR_materials_ior", keys::KHR_MATERIALS_IOR),
        ("KHR_materials_iridescence", keys::KHR_MATERIALS_IRIDESCENCE),
        ("KHR_materials_sheen", keys::KHR_MATERIALS_SHEEN),
        ("KHR_materials_specular", keys::KHR_MATERIALS_SPECULAR),
        ("KHR_materials_transmission", keys::KHR_MATERIALS_TRANSMISSION),
        ("KHR_materials_unlit", keys::KHR_MATERIALS_UNLIT),
        ("KHR_materials_variants", keys::KHR_MATERIALS_VARIANTS),
        ("KHR_materials_volume", keys::KHR_MATERIALS_VOLUME),
        ("KHR_mesh_quantization", keys::KHR_MESH_QUANTIZATION),
        ("KHR_texture_basisu", keys::KHR_TEXTURE_BASISU),
        ("KHR_texture_transform", keys::KHR_TEXTURE_TRANSFORM),
        (
            "MSFT_packing_normalRoughnessMetallic",
            keys::MSFT_PACKING_NRM,
        ),
        (
            "MSFT_packing_occlusionRoughnessMetallic",
            keys::MSFT_PACKING_ORM,
        ),
        ("MSFT_texture_dds", keys::MSFT_TEXTURE_DDS),
    ];

    #[test]
    fn check_value() {
        // Standard CRC-32C check value.
        assert_eq!(crc32c(b"123456789"), 0xE306_9283);
        assert_eq!(crc32c(b""), 0);
    }

    #[test]
    fn compile_time_matches_active_runtime() {
        for (text, compile_time) in KNOWN {
            assert_eq!(hash_str(text), *compile_time, "mismatch for {text:?}");
        }
    }

    #[test]
    fn all_implementations_agree() {
        for (text, compile_time) in KNOWN {
            assert_eq!(crc32c(text.as_bytes()), *compile_time);
            #[cfg(target_arch = "x86_64")]
            if std::arch::is_x86_feature_detected!("sse4.2") {
                assert_eq!(hash_sse42(text.as_bytes()), *compile_time);
            }
        }
    }

    #[test]
    fn no_collisions_among_known_keys() {
        for (i, (text_a, hash_a)) in KNOWN.iter().enumerate() {
            for (text_b, hash_b) in &KNOWN[i + 1..] {
                assert_ne!(hash_a, hash_b, "{text_a:?} collides with {text_b:?}");
            }
        }
    }
}
