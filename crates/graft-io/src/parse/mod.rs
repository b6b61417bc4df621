//! The glTF document parser.
//!
//! Parsing is a dependency-ordered walk of the tokenized JSON document: the
//! requested category set is first closed over the format's dependency graph,
//! then every top-level key is routed through the hash dispatcher and its
//! section parsed into the [`Asset`] graph. The first error aborts the whole
//! parse; no partial asset is ever returned.

mod geometry;
mod json;
mod material;
mod scene;

use std::path::Path;

use serde_json::Value;

use graft_core::{Asset, Categories, DataSource, MimeType};

use crate::glb::{self, ChunkHeader, FileKind, GlbHeader};
use crate::hash::{hash_str, keys};
use crate::options::{
    Base64Decoder, BufferMapper, Extensions, ExtrasParseHook, ParseOptions,
};
use crate::{GltfError, Result};

use json::*;

/// Which sections each section pulls in, as (section, dependencies) edges.
///
/// Category closure is a fixpoint over this table. The Skins/Nodes edge pair
/// forms a cycle; the fixpoint converges on it like on any other edge.
const CATEGORY_DEPENDENCIES: &[(Categories, Categories)] = &[
    (Categories::SCENES, Categories::NODES),
    (
        Categories::NODES,
        Categories::CAMERAS.union(Categories::MESHES).union(Categories::SKINS),
    ),
    (
        Categories::SKINS,
        Categories::ACCESSORS.union(Categories::NODES),
    ),
    (
        Categories::MESHES,
        Categories::ACCESSORS.union(Categories::MATERIALS),
    ),
    (Categories::MATERIALS, Categories::TEXTURES),
    (Categories::ANIMATIONS, Categories::ACCESSORS),
    (
        Categories::TEXTURES,
        Categories::IMAGES.union(Categories::SAMPLERS),
    ),
    (Categories::IMAGES, Categories::BUFFER_VIEWS),
    (Categories::ACCESSORS, Categories::BUFFER_VIEWS),
    (Categories::BUFFER_VIEWS, Categories::BUFFERS),
];

/// Close a requested category set over the section dependency graph.
pub fn expand_categories(requested: Categories) -> Categories {
    let mut expanded = requested;
    loop {
        let before = expanded;
        for (category, dependencies) in CATEGORY_DEPENDENCIES {
            if expanded.intersects(*category) {
                expanded |= *dependencies;
            }
        }
        if expanded == before {
            return expanded;
        }
    }
}

/// Reads glTF JSON documents and GLB containers into [`Asset`] graphs.
///
/// A parser is constructed with the set of extensions it will honor and may
/// be reused across documents. It is not meant to be shared between threads;
/// independent instances are fully independent.
pub struct GltfParser {
    extensions: Extensions,
    buffer_mapper: Option<Box<dyn BufferMapper>>,
    base64_decoder: Option<Box<Base64Decoder>>,
    extras_hook: Option<Box<ExtrasParseHook>>,
}

impl GltfParser {
    /// Create a parser honoring the given extension set.
    pub fn new(extensions: Extensions) -> Self {
        Self {
            extensions,
            buffer_mapper: None,
            base64_decoder: None,
            extras_hook: None,
        }
    }

    /// The extensions this parser honors.
    pub fn extensions(&self) -> Extensions {
        self.extensions
    }

    /// Route decoded buffer bytes into caller-owned memory.
    pub fn set_buffer_mapper(&mut self, mapper: Option<Box<dyn BufferMapper>>) {
        self.buffer_mapper = mapper;
    }

    /// Override the built-in base64 decoder.
    pub fn set_base64_decoder(&mut self, decoder: Option<Box<Base64Decoder>>) {
        self.base64_decoder = decoder;
    }

    /// Receive the raw `extras` of every parsed entity.
    pub fn set_extras_hook(&mut self, hook: Option<Box<ExtrasParseHook>>) {
        self.extras_hook = hook;
    }

    /// Parse a byte stream, auto-detecting JSON vs GLB.
    pub fn parse(
        &mut self,
        data: &[u8],
        base_dir: Option<&Path>,
        options: ParseOptions,
        categories: Categories,
    ) -> Result<Asset> {
        match glb::detect_file_kind(data) {
            Some(FileKind::Json) => self.parse_json(data, base_dir, options, categories),
            Some(FileKind::Binary) => self.parse_glb(data, base_dir, options, categories),
            None => Err(GltfError::InvalidFileData),
        }
    }

    /// Parse a bare glTF JSON document.
    pub fn parse_json(
        &mut self,
        data: &[u8],
        base_dir: Option<&Path>,
        options: ParseOptions,
        categories: Categories,
    ) -> Result<Asset> {
        self.check_external_dir(options, base_dir)?;

        let document: Value =
            serde_json::from_slice(data).map_err(|_| GltfError::InvalidJson)?;
        let root = document.as_object().ok_or(GltfError::InvalidJson)?;

        Walker {
            cfg: self,
            options,
            base_dir,
            glb_buffer: None,
            asset: Asset::default(),
        }
        .run(root, categories)
    }

    /// Parse a GLB container.
    pub fn parse_glb(
        &mut self,
        data: &[u8],
        base_dir: Option<&Path>,
        options: ParseOptions,
        categories: Categories,
    ) -> Result<Asset> {
        self.check_external_dir(options, base_dir)?;

        let header = GlbHeader::read(data).ok_or(GltfError::InvalidGlb)?;
        if header.magic != glb::GLB_MAGIC {
            return Err(GltfError::InvalidGlb);
        }
        if header.version != glb::GLB_VERSION {
            return Err(GltfError::UnsupportedVersion);
        }
        let total = header.length as usize;
        if total > data.len() {
            return Err(GltfError::InvalidGlb);
        }

        // The chunk order is fixed: JSON first, then the optional binary
        // chunk.
        let mut offset = GlbHeader::SIZE;
        let json_chunk = ChunkHeader::read(data, offset).ok_or(GltfError::InvalidGlb)?;
        if json_chunk.kind != glb::CHUNK_KIND_JSON {
            return Err(GltfError::InvalidGlb);
        }
        offset += ChunkHeader::SIZE;
        let json_end = offset
            .checked_add(json_chunk.length as usize)
            .filter(|&end| end <= data.len())
            .ok_or(GltfError::InvalidGlb)?;

        let document: Value = serde_json::from_slice(&data[offset..json_end])
            .map_err(|_| GltfError::InvalidJson)?;

        offset = glb::align4(json_end);
        let mut glb_buffer = None;
        if total > offset + ChunkHeader::SIZE {
            let bin_chunk = ChunkHeader::read(data, offset).ok_or(GltfError::InvalidGlb)?;
            if bin_chunk.kind != glb::CHUNK_KIND_BIN {
                return Err(GltfError::InvalidGlb);
            }
            offset += ChunkHeader::SIZE;
            let bin_end = offset
                .checked_add(bin_chunk.length as usize)
                .filter(|&end| end <= data.len())
                .ok_or(GltfError::InvalidGlb)?;
            if bin_chunk.length != 0 {
                glb_buffer = Some(self.bind_glb_chunk(&data[offset..bin_end]));
            }
        }

        let root = document.as_object().ok_or(GltfError::InvalidJson)?;
        Walker {
            cfg: self,
            options,
            base_dir,
            glb_buffer,
            asset: Asset::default(),
        }
        .run(root, categories)
    }

    fn check_external_dir(&self, options: ParseOptions, base_dir: Option<&Path>) -> Result<()> {
        if options.contains(ParseOptions::LOAD_EXTERNAL_BUFFERS)
            && !base_dir.is_some_and(Path::is_dir)
        {
            return Err(GltfError::InvalidPath);
        }
        Ok(())
    }

    /// Bind the GLB binary chunk, through the buffer mapper when one is set.
    fn bind_glb_chunk(&mut self, payload: &[u8]) -> DataSource {
        if let Some(mapper) = self.buffer_mapper.as_mut() {
            if let Some(mapped) = mapper.map(payload.len()) {
                let id = mapped.id;
                if mapped.bytes.len() >= payload.len() {
                    mapped.bytes[..payload.len()].copy_from_slice(payload);
                    mapper.unmap(id);
                    return DataSource::Custom {
                        id,
                        mime: MimeType::None,
                    };
                }
                mapper.unmap(id);
            }
        }
        DataSource::Bytes {
            bytes: payload.to_vec(),
            mime: MimeType::GltfBuffer,
        }
    }
}

/// One in-flight document walk.
pub(crate) struct Walker<'a> {
    pub(crate) cfg: &'a mut GltfParser,
    pub(crate) options: ParseOptions,
    pub(crate) base_dir: Option<&'a Path>,
    pub(crate) glb_buffer: Option<DataSource>,
    pub(crate) asset: Asset,
}

impl Walker<'_> {
    fn run(mut self, root: &JsonObject, requested: Categories) -> Result<Asset> {
        let requested = expand_categories(requested);

        for (key, value) in root {
            // Known keys are matched by hash; the guard re-verifies the
            // string so a colliding unknown key falls through to the
            // ignored path instead of being misrouted.
            match hash_str(key) {
                keys::ACCESSORS if key == "accessors" => {
                    self.section(Categories::ACCESSORS, requested, value, Self::parse_accessors)?;
                }
                keys::ANIMATIONS if key == "animations" => {
                    self.section(Categories::ANIMATIONS, requested, value, Self::parse_animations)?;
                }
                keys::BUFFERS if key == "buffers" => {
                    self.section(Categories::BUFFERS, requested, value, Self::parse_buffers)?;
                }
                keys::BUFFER_VIEWS if key == "bufferViews" => {
                    self.section(
                        Categories::BUFFER_VIEWS,
                        requested,
                        value,
                        Self::parse_buffer_views,
                    )?;
                }
                keys::CAMERAS if key == "cameras" => {
                    self.section(Categories::CAMERAS, requested, value, Self::parse_cameras)?;
                }
                keys::IMAGES if key == "images" => {
                    self.section(Categories::IMAGES, requested, value, Self::parse_images)?;
                }
                keys::MATERIALS if key == "materials" => {
                    self.section(Categories::MATERIALS, requested, value, Self::parse_materials)?;
                }
                keys::MESHES if key == "meshes" => {
                    self.section(Categories::MESHES, requested, value, Self::parse_meshes)?;
                }
                keys::NODES if key == "nodes" => {
                    self.section(Categories::NODES, requested, value, Self::parse_nodes)?;
                }
                keys::SAMPLERS if key == "samplers" => {
                    self.section(Categories::SAMPLERS, requested, value, Self::parse_samplers)?;
                }
                keys::SCENES if key == "scenes" => {
                    self.section(Categories::SCENES, requested, value, Self::parse_scenes)?;
                }
                keys::SKINS if key == "skins" => {
                    self.section(Categories::SKINS, requested, value, Self::parse_skins)?;
                }
                keys::TEXTURES if key == "textures" => {
                    self.section(Categories::TEXTURES, requested, value, Self::parse_textures)?;
                }
                keys::ASSET if key == "asset" => {
                    self.asset.available_categories |= Categories::ASSET_INFO;
                    if requested.contains(Categories::ASSET_INFO) {
                        match self.parse_asset_info(as_object(value)?) {
                            Ok(()) => {}
                            Err(error)
                                if self
                                    .options
                                    .contains(ParseOptions::DONT_REQUIRE_VALID_ASSET_MEMBER) =>
                            {
                                log::debug!("ignoring invalid asset member: {error}");
                            }
                            Err(error) => return Err(error),
                        }
                    }
                }
                keys::SCENE if key == "scene" => {
                    self.asset.default_scene = Some(as_usize(value)?);
                }
                keys::EXTENSIONS_USED if key == "extensionsUsed" => {
                    for name in as_array(value)? {
                        self.asset.extensions_used.push(as_str(name)?.to_owned());
                    }
                }
                keys::EXTENSIONS_REQUIRED if key == "extensionsRequired" => {
                    self.parse_extensions_required(as_array(value)?)?;
                }
                keys::EXTENSIONS if key == "extensions" => {
                    self.parse_root_extensions(as_object(value)?)?;
                }
                keys::EXTRAS if key == "extras" => {
                    if let Some(hook) = self.cfg.extras_hook.as_mut() {
                        hook(Categories::empty(), 0, value);
                    }
                }
                // Unknown keys are ignored for forward compatibility.
                _ => {}
            }
        }

        if self.asset.info.is_none()
            && requested.contains(Categories::ASSET_INFO)
            && !self
                .options
                .contains(ParseOptions::DONT_REQUIRE_VALID_ASSET_MEMBER)
        {
            return Err(GltfError::InvalidOrMissingAssetField);
        }

        // Variant mappings may have been parsed before the variant list;
        // bring every mapping to the full variant count.
        if !self.asset.material_variants.is_empty() {
            let count = self.asset.material_variants.len();
            for mesh in &mut self.asset.meshes {
                for primitive in &mut mesh.primitives {
                    if !primitive.variant_mappings.is_empty()
                        && primitive.variant_mappings.len() < count
                    {
                        primitive.variant_mappings.resize(count, None);
                    }
                }
            }
        }

        if self.options.contains(ParseOptions::GENERATE_MESH_INDICES) {
            self.generate_mesh_indices()?;
        }

        Ok(self.asset)
    }

    /// Record a section as available and parse it when requested.
    fn section(
        &mut self,
        category: Categories,
        requested: Categories,
        value: &Value,
        parse: fn(&mut Self, &[Value]) -> Result<()>,
    ) -> Result<()> {
        self.asset.available_categories |= category;
        if requested.contains(category) {
            parse(self, as_array(value)?)?;
        }
        Ok(())
    }

    fn parse_asset_info(&mut self, obj: &JsonObject) -> Result<()> {
        let version = string_field(obj, "version")?
            .ok_or(GltfError::InvalidOrMissingAssetField)?;
        let major = version
            .split('.')
            .next()
            .and_then(|major| major.parse::<u32>().ok())
            .ok_or(GltfError::InvalidOrMissingAssetField)?;
        if major != 2 {
            return Err(GltfError::UnsupportedVersion);
        }

        self.asset.info = Some(graft_core::AssetInfo {
            version,
            min_version: string_field(obj, "minVersion")?,
            generator: string_field(obj, "generator")?,
            copyright: string_field(obj, "copyright")?,
        });
        Ok(())
    }

    fn parse_extensions_required(&mut self, names: &[Value]) -> Result<()> {
        for name in names {
            let name = as_str(name)?;
            let flag = crate::options::extension_flag(name)
                .ok_or(GltfError::UnknownRequiredExtension)?;
            if !self.cfg.extensions.contains(flag) {
                return Err(GltfError::MissingExtensions);
            }
            self.asset.extensions_required.push(name.to_owned());
        }
        Ok(())
    }

    /// Root-level extension objects: punctual lights and material variants.
    fn parse_root_extensions(&mut self, obj: &JsonObject) -> Result<()> {
        for (key, value) in obj {
            match hash_str(key) {
                keys::KHR_LIGHTS_PUNCTUAL if key == "KHR_lights_punctual" => {
                    if self.cfg.extensions.contains(Extensions::KHR_LIGHTS_PUNCTUAL) {
                        let ext = as_object(value)?;
                        if let Some(lights) = array_field(ext, "lights")? {
                            self.parse_lights(lights)?;
                        }
                    }
                }
                keys::KHR_MATERIALS_VARIANTS if key == "KHR_materials_variants" => {
                    if self
                        .cfg
                        .extensions
                        .contains(Extensions::KHR_MATERIALS_VARIANTS)
                    {
                        let ext = as_object(value)?;
                        if let Some(variants) = array_field(ext, "variants")? {
                            for variant in variants {
                                let variant = as_object(variant)?;
                                let name = require(string_field(variant, "name")?)?;
                                self.asset.material_variants.push(name);
                            }
                        }
                    }
                }
                _ => {
                    log::debug!("skipping root extension {key:?}");
                }
            }
        }
        Ok(())
    }

    /// Report an entity's `extras` to the caller's hook.
    pub(crate) fn extras(&mut self, category: Categories, index: usize, obj: &JsonObject) {
        if let Some(hook) = self.cfg.extras_hook.as_mut() {
            if let Some(extras) = obj.get("extras") {
                hook(category, index, extras);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_closure_is_a_fixpoint() {
        for (category, _) in CATEGORY_DEPENDENCIES {
            let once = expand_categories(*category);
            assert_eq!(expand_categories(once), once, "not converged for {category:?}");
        }
        assert_eq!(expand_categories(Categories::ALL), Categories::ALL);
        assert_eq!(expand_categories(Categories::empty()), Categories::empty());
    }

    #[test]
    fn scenes_closure_pulls_in_the_render_graph() {
        let expanded = expand_categories(Categories::SCENES);
        let expected = Categories::SCENES
            | Categories::NODES
            | Categories::CAMERAS
            | Categories::MESHES
            | Categories::SKINS
            | Categories::ACCESSORS
            | Categories::MATERIALS
            | Categories::TEXTURES
            | Categories::IMAGES
            | Categories::SAMPLERS
            | Categories::BUFFER_VIEWS
            | Categories::BUFFERS;
        assert_eq!(expanded, expected);
        assert!(!expanded.contains(Categories::ANIMATIONS));
    }

    #[test]
    fn skins_nodes_cycle_converges() {
        let expanded = expand_categories(Categories::SKINS);
        assert!(expanded.contains(Categories::NODES));
        assert!(expanded.contains(Categories::SKINS));
        assert!(expanded.contains(Categories::ACCESSORS));
        assert!(expanded.contains(Categories::BUFFERS));
    }

    #[test]
    fn animations_closure_stays_lean() {
        assert_eq!(
            expand_categories(Categories::ANIMATIONS),
            Categories::ONLY_ANIMATIONS
        );
    }

    #[test]
    fn minimal_document() {
        let json = br#"{"asset": {"version": "2.0", "generator": "graft-test"}}"#;
        let mut parser = GltfParser::new(Extensions::empty());
        let asset = parser
            .parse(json, None, ParseOptions::empty(), Categories::ALL)
            .unwrap();
        let info = asset.info.unwrap();
        assert_eq!(info.version, "2.0");
        assert_eq!(info.generator.as_deref(), Some("graft-test"));
        assert_eq!(asset.available_categories, Categories::ASSET_INFO);
    }

    #[test]
    fn missing_asset_member_is_an_error() {
        let json = br#"{"scenes": []}"#;
        let mut parser = GltfParser::new(Extensions::empty());
        let error = parser
            .parse(json, None, ParseOptions::empty(), Categories::ALL)
            .unwrap_err();
        assert_eq!(error, GltfError::InvalidOrMissingAssetField);

        // The requirement is waived by the option.
        let asset = parser
            .parse(
                json,
                None,
                ParseOptions::DONT_REQUIRE_VALID_ASSET_MEMBER,
                Categories::ALL,
            )
            .unwrap();
        assert!(asset.info.is_none());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let json = br#"{"asset": {"version": "3.0"}}"#;
        let mut parser = GltfParser::new(Extensions::empty());
        let error = parser
            .parse(json, None, ParseOptions::empty(), Categories::ALL)
            .unwrap_err();
        assert_eq!(error, GltfError::UnsupportedVersion);
    }

    #[test]
    fn unknown_required_extension_is_rejected() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "extensionsUsed": ["VENDOR_not_real"],
            "extensionsRequired": ["VENDOR_not_real"]
        }"#;
        let mut parser = GltfParser::new(Extensions::all());
        let error = parser
            .parse(json, None, ParseOptions::empty(), Categories::ALL)
            .unwrap_err();
        assert_eq!(error, GltfError::UnknownRequiredExtension);
    }

    #[test]
    fn required_extension_must_be_enabled() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "extensionsUsed": ["KHR_lights_punctual"],
            "extensionsRequired": ["KHR_lights_punctual"]
        }"#;
        let mut parser = GltfParser::new(Extensions::empty());
        let error = parser
            .parse(json, None, ParseOptions::empty(), Categories::ALL)
            .unwrap_err();
        assert_eq!(error, GltfError::MissingExtensions);

        let mut parser = GltfParser::new(Extensions::KHR_LIGHTS_PUNCTUAL);
        assert!(parser
            .parse(json, None, ParseOptions::empty(), Categories::ALL)
            .is_ok());
    }

    #[test]
    fn unrequested_sections_are_recorded_but_not_materialized() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "animations": [],
            "scenes": [{"nodes": []}]
        }"#;
        let mut parser = GltfParser::new(Extensions::empty());
        let asset = parser
            .parse(json, None, ParseOptions::empty(), Categories::SCENES)
            .unwrap();
        assert!(asset.available_categories.contains(Categories::ANIMATIONS));
        assert!(asset.available_categories.contains(Categories::SCENES));
        assert_eq!(asset.scenes.len(), 1);
        assert!(asset.animations.is_empty());
    }
}
