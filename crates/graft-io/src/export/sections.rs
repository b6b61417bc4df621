//! Per-section serializers.
//!
//! Key order within each entity mirrors the reader's expectations and fields
//! equal to their documented default are omitted; both are part of the
//! output contract. The scope bookkeeping itself lives in
//! [`writer::JsonWriter`](super::writer::JsonWriter).

use indexmap::IndexMap;

use graft_core::{
    AccessorBounds, AlphaMode, Asset, AttributeMap, Categories, DataSource, Interpolation,
    LightType, NormalTextureInfo, OcclusionTextureInfo, PrimitiveMode, TextureInfo, Transform,
    Wrap,
};

use crate::GltfError;

use super::writer::JsonWriter;
use super::GltfExporter;

impl GltfExporter {
    pub(super) fn write_asset_info(&mut self, asset: &Asset, w: &mut JsonWriter) {
        w.begin_object_field("asset");
        match &asset.info {
            Some(info) => {
                if let Some(copyright) = &info.copyright {
                    w.string_field("copyright", copyright);
                }
                if let Some(generator) = &info.generator {
                    w.string_field("generator", generator);
                }
                if let Some(min_version) = &info.min_version {
                    w.string_field("minVersion", min_version);
                }
                w.string_field("version", &info.version);
            }
            None => {
                w.string_field("generator", "graft");
                w.string_field("version", "2.0");
            }
        }
        w.end_object();
    }

    pub(super) fn write_extension_declarations(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if !asset.extensions_used.is_empty() {
            w.begin_array_field("extensionsUsed");
            for name in &asset.extensions_used {
                w.string(name);
            }
            w.end_array();
        }
        if !asset.extensions_required.is_empty() {
            w.begin_array_field("extensionsRequired");
            for name in &asset.extensions_required {
                w.string(name);
            }
            w.end_array();
        }
    }

    pub(super) fn write_accessors(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.accessors.is_empty() {
            return;
        }
        w.begin_array_field("accessors");
        for (index, accessor) in asset.accessors.iter().enumerate() {
            w.begin_object();
            if let Some(view) = accessor.buffer_view {
                w.usize_field("bufferView", view);
            }
            if accessor.byte_offset != 0 {
                w.usize_field("byteOffset", accessor.byte_offset);
            }
            w.u64_field("componentType", u64::from(accessor.component_type.gl_code()));
            if accessor.normalized {
                w.bool_field("normalized", true);
            }
            w.usize_field("count", accessor.count);
            w.string_field("type", accessor.kind.name());
            if let Some(bounds) = &accessor.max {
                write_bounds(w, "max", bounds);
            }
            if let Some(bounds) = &accessor.min {
                write_bounds(w, "min", bounds);
            }
            if let Some(sparse) = &accessor.sparse {
                w.begin_object_field("sparse");
                w.usize_field("count", sparse.count);
                w.begin_object_field("indices");
                w.usize_field("bufferView", sparse.indices_view);
                if sparse.indices_offset != 0 {
                    w.usize_field("byteOffset", sparse.indices_offset);
                }
                w.u64_field(
                    "componentType",
                    u64::from(sparse.index_component_type.gl_code()),
                );
                w.end_object();
                w.begin_object_field("values");
                w.usize_field("bufferView", sparse.values_view);
                if sparse.values_offset != 0 {
                    w.usize_field("byteOffset", sparse.values_offset);
                }
                w.end_object();
                w.end_object();
            }
            self.write_extras(w, Categories::ACCESSORS, index);
            if let Some(name) = &accessor.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_animations(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.animations.is_empty() {
            return;
        }
        w.begin_array_field("animations");
        for (index, animation) in asset.animations.iter().enumerate() {
            w.begin_object();
            w.begin_array_field("channels");
            for channel in &animation.channels {
                w.begin_object();
                w.usize_field("sampler", channel.sampler);
                w.begin_object_field("target");
                if let Some(node) = channel.node {
                    w.usize_field("node", node);
                }
                w.string_field("path", channel.path.name());
                w.end_object();
                w.end_object();
            }
            w.end_array();
            w.begin_array_field("samplers");
            for sampler in &animation.samplers {
                w.begin_object();
                w.usize_field("input", sampler.input);
                if sampler.interpolation != Interpolation::Linear {
                    w.string_field("interpolation", sampler.interpolation.name());
                }
                w.usize_field("output", sampler.output);
                w.end_object();
            }
            w.end_array();
            self.write_extras(w, Categories::ANIMATIONS, index);
            if let Some(name) = &animation.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_buffers(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.buffers.is_empty() {
            return;
        }
        w.begin_array_field("buffers");
        for (index, buffer) in asset.buffers.iter().enumerate() {
            w.begin_object();
            match &buffer.data {
                DataSource::Bytes { .. } => {
                    // The GLB binary chunk carries buffer 0; every other
                    // byte-owning buffer is planned as an external file.
                    if index == 0 && self.exporting_binary {
                        self.buffer_paths.push(None);
                    } else {
                        let path = self.buffer_file_path(asset, index);
                        w.string_field("uri", &path_as_uri(&path));
                        self.buffer_paths.push(Some(path));
                    }
                }
                DataSource::Uri { uri, .. } => {
                    w.string_field("uri", uri);
                    self.buffer_paths.push(None);
                }
                DataSource::Fallback => {
                    w.key("extensions");
                    w.raw(r#"{"EXT_meshopt_compression":{"fallback":true}}"#);
                    self.buffer_paths.push(None);
                }
                DataSource::Empty | DataSource::BufferView { .. } | DataSource::Custom { .. } => {
                    // Bytes that cannot be retrieved are not serializable.
                    self.record_error(GltfError::InvalidGltf);
                    self.buffer_paths.push(None);
                }
            }
            w.usize_field("byteLength", buffer.byte_length);
            self.write_extras(w, Categories::BUFFERS, index);
            if let Some(name) = &buffer.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_buffer_views(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.buffer_views.is_empty() {
            return;
        }
        w.begin_array_field("bufferViews");
        for (index, view) in asset.buffer_views.iter().enumerate() {
            w.begin_object();
            w.usize_field("buffer", view.buffer);
            w.usize_field("byteLength", view.byte_length);
            if view.byte_offset != 0 {
                w.usize_field("byteOffset", view.byte_offset);
            }
            if let Some(stride) = view.byte_stride {
                w.usize_field("byteStride", stride);
            }
            if let Some(target) = view.target {
                w.u64_field("target", u64::from(target.gl_code()));
            }
            if let Some(meshopt) = &view.meshopt {
                w.begin_object_field("extensions");
                w.begin_object_field("EXT_meshopt_compression");
                w.usize_field("buffer", meshopt.buffer);
                if meshopt.byte_offset != 0 {
                    w.usize_field("byteOffset", meshopt.byte_offset);
                }
                w.usize_field("byteLength", meshopt.byte_length);
                w.usize_field("byteStride", meshopt.byte_stride);
                w.usize_field("count", meshopt.count);
                w.string_field("mode", meshopt.mode.name());
                if meshopt.filter != graft_core::CompressionFilter::None {
                    w.string_field("filter", meshopt.filter.name());
                }
                w.end_object();
                w.end_object();
            }
            self.write_extras(w, Categories::BUFFER_VIEWS, index);
            if let Some(name) = &view.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_cameras(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.cameras.is_empty() {
            return;
        }
        w.begin_array_field("cameras");
        for (index, camera) in asset.cameras.iter().enumerate() {
            w.begin_object();
            match camera.projection {
                graft_core::CameraProjection::Perspective {
                    aspect_ratio,
                    yfov,
                    znear,
                    zfar,
                } => {
                    w.string_field("type", "perspective");
                    w.begin_object_field("perspective");
                    if let Some(aspect_ratio) = aspect_ratio {
                        w.f32_field("aspectRatio", aspect_ratio);
                    }
                    w.f32_field("yfov", yfov);
                    if let Some(zfar) = zfar {
                        w.f32_field("zfar", zfar);
                    }
                    w.f32_field("znear", znear);
                    w.end_object();
                }
                graft_core::CameraProjection::Orthographic {
                    xmag,
                    ymag,
                    zfar,
                    znear,
                } => {
                    w.string_field("type", "orthographic");
                    w.begin_object_field("orthographic");
                    w.f32_field("xmag", xmag);
                    w.f32_field("ymag", ymag);
                    w.f32_field("zfar", zfar);
                    w.f32_field("znear", znear);
                    w.end_object();
                }
            }
            self.write_extras(w, Categories::CAMERAS, index);
            if let Some(name) = &camera.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_images(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.images.is_empty() {
            return;
        }
        w.begin_array_field("images");
        for (index, image) in asset.images.iter().enumerate() {
            w.begin_object();
            match &image.data {
                DataSource::BufferView { view, mime } => {
                    w.usize_field("bufferView", *view);
                    if let Some(name) = mime.name() {
                        w.string_field("mimeType", name);
                    }
                    self.image_paths.push(None);
                }
                DataSource::Uri { uri, .. } => {
                    w.string_field("uri", uri);
                    self.image_paths.push(None);
                }
                DataSource::Bytes { mime, .. } => {
                    let path = self.image_file_path(asset, index, *mime);
                    w.string_field("uri", &path_as_uri(&path));
                    self.image_paths.push(Some(path));
                }
                DataSource::Empty | DataSource::Custom { .. } | DataSource::Fallback => {
                    self.record_error(GltfError::InvalidGltf);
                    self.image_paths.push(None);
                }
            }
            self.write_extras(w, Categories::IMAGES, index);
            if let Some(name) = &image.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_materials(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.materials.is_empty() {
            return;
        }
        w.begin_array_field("materials");
        for (index, material) in asset.materials.iter().enumerate() {
            w.begin_object();

            let pbr = &material.pbr;
            let pbr_defaulted = pbr.base_color_factor == [1.0; 4]
                && pbr.base_color_texture.is_none()
                && pbr.metallic_factor == 1.0
                && pbr.roughness_factor == 1.0
                && pbr.metallic_roughness_texture.is_none();
            if !pbr_defaulted {
                w.begin_object_field("pbrMetallicRoughness");
                if pbr.base_color_factor != [1.0; 4] {
                    w.f32_array_field("baseColorFactor", &pbr.base_color_factor);
                }
                if let Some(info) = &pbr.base_color_texture {
                    self.write_texture_info(w, "baseColorTexture", info);
                }
                if pbr.metallic_factor != 1.0 {
                    w.f32_field("metallicFactor", pbr.metallic_factor);
                }
                if pbr.roughness_factor != 1.0 {
                    w.f32_field("roughnessFactor", pbr.roughness_factor);
                }
                if let Some(info) = &pbr.metallic_roughness_texture {
                    self.write_texture_info(w, "metallicRoughnessTexture", info);
                }
                w.end_object();
            }

            if let Some(normal) = &material.normal_texture {
                self.write_normal_texture(w, "normalTexture", normal);
            }
            if let Some(occlusion) = &material.occlusion_texture {
                self.write_occlusion_texture(w, occlusion);
            }
            if let Some(info) = &material.emissive_texture {
                self.write_texture_info(w, "emissiveTexture", info);
            }
            if material.emissive_factor != [0.0; 3] {
                w.f32_array_field("emissiveFactor", &material.emissive_factor);
            }
            if material.alpha_mode != AlphaMode::Opaque {
                w.string_field("alphaMode", material.alpha_mode.name());
            }
            if material.alpha_cutoff != 0.5 {
                w.f32_field("alphaCutoff", material.alpha_cutoff);
            }
            if material.double_sided {
                w.bool_field("doubleSided", true);
            }

            self.write_material_extensions(w, material);

            self.write_extras(w, Categories::MATERIALS, index);
            if let Some(name) = &material.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    fn write_material_extensions(&mut self, w: &mut JsonWriter, material: &graft_core::Material) {
        let any = material.unlit
            || material.ior != 1.5
            || material.emissive_strength != 1.0
            || material.dispersion != 0.0
            || material.anisotropy.is_some()
            || material.clearcoat.is_some()
            || material.iridescence.is_some()
            || material.sheen.is_some()
            || material.specular.is_some()
            || material.transmission.is_some()
            || material.volume.is_some()
            || material.packed_textures.is_some();
        if !any {
            return;
        }

        w.begin_object_field("extensions");

        if let Some(anisotropy) = &material.anisotropy {
            w.begin_object_field("KHR_materials_anisotropy");
            if anisotropy.strength != 0.0 {
                w.f32_field("anisotropyStrength", anisotropy.strength);
            }
            if anisotropy.rotation != 0.0 {
                w.f32_field("anisotropyRotation", anisotropy.rotation);
            }
            if let Some(info) = &anisotropy.texture {
                self.write_texture_info(w, "anisotropyTexture", info);
            }
            w.end_object();
        }
        if let Some(clearcoat) = &material.clearcoat {
            w.begin_object_field("KHR_materials_clearcoat");
            if clearcoat.factor != 0.0 {
                w.f32_field("clearcoatFactor", clearcoat.factor);
            }
            if let Some(info) = &clearcoat.texture {
                self.write_texture_info(w, "clearcoatTexture", info);
            }
            if clearcoat.roughness_factor != 0.0 {
                w.f32_field("clearcoatRoughnessFactor", clearcoat.roughness_factor);
            }
            if let Some(info) = &clearcoat.roughness_texture {
                self.write_texture_info(w, "clearcoatRoughnessTexture", info);
            }
            if let Some(normal) = &clearcoat.normal_texture {
                self.write_normal_texture(w, "clearcoatNormalTexture", normal);
            }
            w.end_object();
        }
        if material.dispersion != 0.0 {
            w.begin_object_field("KHR_materials_dispersion");
            w.f32_field("dispersion", material.dispersion);
            w.end_object();
        }
        if material.emissive_strength != 1.0 {
            w.begin_object_field("KHR_materials_emissive_strength");
            w.f32_field("emissiveStrength", material.emissive_strength);
            w.end_object();
        }
        if material.ior != 1.5 {
            w.begin_object_field("KHR_materials_ior");
            w.f32_field("ior", material.ior);
            w.end_object();
        }
        if let Some(iridescence) = &material.iridescence {
            w.begin_object_field("KHR_materials_iridescence");
            if iridescence.factor != 0.0 {
                w.f32_field("iridescenceFactor", iridescence.factor);
            }
            if let Some(info) = &iridescence.texture {
                self.write_texture_info(w, "iridescenceTexture", info);
            }
            if iridescence.ior != 1.3 {
                w.f32_field("iridescenceIor", iridescence.ior);
            }
            if iridescence.thickness_minimum != 100.0 {
                w.f32_field("iridescenceThicknessMinimum", iridescence.thickness_minimum);
            }
            if iridescence.thickness_maximum != 400.0 {
                w.f32_field("iridescenceThicknessMaximum", iridescence.thickness_maximum);
            }
            if let Some(info) = &iridescence.thickness_texture {
                self.write_texture_info(w, "iridescenceThicknessTexture", info);
            }
            w.end_object();
        }
        if let Some(sheen) = &material.sheen {
            w.begin_object_field("KHR_materials_sheen");
            if sheen.color_factor != [0.0; 3] {
                w.f32_array_field("sheenColorFactor", &sheen.color_factor);
            }
            if let Some(info) = &sheen.color_texture {
                self.write_texture_info(w, "sheenColorTexture", info);
            }
            if sheen.roughness_factor != 0.0 {
                w.f32_field("sheenRoughnessFactor", sheen.roughness_factor);
            }
            if let Some(info) = &sheen.roughness_texture {
                self.write_texture_info(w, "sheenRoughnessTexture", info);
            }
            w.end_object();
        }
        if let Some(specular) = &material.specular {
            w.begin_object_field("KHR_materials_specular");
            if specular.factor != 1.0 {
                w.f32_field("specularFactor", specular.factor);
            }
            if let Some(info) = &specular.texture {
                self.write_texture_info(w, "specularTexture", info);
            }
            if specular.color_factor != [1.0; 3] {
                w.f32_array_field("specularColorFactor", &specular.color_factor);
            }
            if let Some(info) = &specular.color_texture {
                self.write_texture_info(w, "specularColorTexture", info);
            }
            w.end_object();
        }
        if let Some(transmission) = &material.transmission {
            w.begin_object_field("KHR_materials_transmission");
            if transmission.factor != 0.0 {
                w.f32_field("transmissionFactor", transmission.factor);
            }
            if let Some(info) = &transmission.texture {
                self.write_texture_info(w, "transmissionTexture", info);
            }
            w.end_object();
        }
        if material.unlit {
            w.key("KHR_materials_unlit");
            w.raw("{}");
        }
        if let Some(volume) = &material.volume {
            w.begin_object_field("KHR_materials_volume");
            if volume.thickness_factor != 0.0 {
                w.f32_field("thicknessFactor", volume.thickness_factor);
            }
            if let Some(info) = &volume.thickness_texture {
                self.write_texture_info(w, "thicknessTexture", info);
            }
            if volume.attenuation_distance.is_finite() {
                w.f32_field("attenuationDistance", volume.attenuation_distance);
            }
            if volume.attenuation_color != [1.0; 3] {
                w.f32_array_field("attenuationColor", &volume.attenuation_color);
            }
            w.end_object();
        }
        if let Some(packed) = &material.packed_textures {
            if let Some(info) = &packed.normal_roughness_metallic {
                w.begin_object_field("MSFT_packing_normalRoughnessMetallic");
                self.write_texture_info(w, "normalRoughnessMetallicTexture", info);
                w.end_object();
            }
            if packed.occlusion_roughness_metallic.is_some()
                || packed.roughness_metallic_occlusion.is_some()
                || packed.normal.is_some()
            {
                w.begin_object_field("MSFT_packing_occlusionRoughnessMetallic");
                if let Some(info) = &packed.occlusion_roughness_metallic {
                    self.write_texture_info(w, "occlusionRoughnessMetallicTexture", info);
                }
                if let Some(info) = &packed.roughness_metallic_occlusion {
                    self.write_texture_info(w, "roughnessMetallicOcclusionTexture", info);
                }
                if let Some(info) = &packed.normal {
                    self.write_texture_info(w, "normalTexture", info);
                }
                w.end_object();
            }
        }

        w.end_object();
    }

    fn write_texture_info(&mut self, w: &mut JsonWriter, key: &str, info: &TextureInfo) {
        w.begin_object_field(key);
        self.write_texture_info_fields(w, info);
        w.end_object();
    }

    fn write_texture_info_fields(&mut self, w: &mut JsonWriter, info: &TextureInfo) {
        w.usize_field("index", info.texture);
        if info.tex_coord != 0 {
            w.usize_field("texCoord", info.tex_coord);
        }
        if let Some(transform) = &info.transform {
            w.begin_object_field("extensions");
            w.begin_object_field("KHR_texture_transform");
            if transform.offset != glam::Vec2::ZERO {
                w.f32_array_field("offset", &transform.offset.to_array());
            }
            if transform.rotation != 0.0 {
                w.f32_field("rotation", transform.rotation);
            }
            if transform.scale != glam::Vec2::ONE {
                w.f32_array_field("scale", &transform.scale.to_array());
            }
            if let Some(tex_coord) = transform.tex_coord {
                w.usize_field("texCoord", tex_coord);
            }
            w.end_object();
            w.end_object();
        }
    }

    fn write_normal_texture(&mut self, w: &mut JsonWriter, key: &str, info: &NormalTextureInfo) {
        w.begin_object_field(key);
        self.write_texture_info_fields(w, &info.texture);
        if info.scale != 1.0 {
            w.f32_field("scale", info.scale);
        }
        w.end_object();
    }

    fn write_occlusion_texture(&mut self, w: &mut JsonWriter, info: &OcclusionTextureInfo) {
        w.begin_object_field("occlusionTexture");
        self.write_texture_info_fields(w, &info.texture);
        if info.strength != 1.0 {
            w.f32_field("strength", info.strength);
        }
        w.end_object();
    }

    pub(super) fn write_meshes(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.meshes.is_empty() {
            return;
        }
        w.begin_array_field("meshes");
        for (index, mesh) in asset.meshes.iter().enumerate() {
            w.begin_object();
            w.begin_array_field("primitives");
            for primitive in &mesh.primitives {
                w.begin_object();
                write_attribute_map(w, "attributes", &primitive.attributes);
                if let Some(indices) = primitive.indices {
                    w.usize_field("indices", indices);
                }
                if let Some(material) = primitive.material {
                    w.usize_field("material", material);
                }
                if primitive.mode != PrimitiveMode::Triangles {
                    w.u64_field("mode", u64::from(primitive.mode.gl_code()));
                }
                if !primitive.targets.is_empty() {
                    w.begin_array_field("targets");
                    for target in &primitive.targets {
                        w.begin_object();
                        for (name, &accessor) in target {
                            w.usize_field(name, accessor);
                        }
                        w.end_object();
                    }
                    w.end_array();
                }
                if !primitive.variant_mappings.is_empty() {
                    // Mappings are grouped back into per-material entries.
                    let mut by_material: IndexMap<usize, Vec<usize>> = IndexMap::new();
                    for (variant, mapping) in primitive.variant_mappings.iter().enumerate() {
                        if let Some(material) = mapping {
                            by_material.entry(*material).or_default().push(variant);
                        }
                    }
                    w.begin_object_field("extensions");
                    w.begin_object_field("KHR_materials_variants");
                    w.begin_array_field("mappings");
                    for (material, variants) in &by_material {
                        w.begin_object();
                        w.usize_field("material", *material);
                        w.begin_array_field("variants");
                        for &variant in variants {
                            w.usize(variant);
                        }
                        w.end_array();
                        w.end_object();
                    }
                    w.end_array();
                    w.end_object();
                    w.end_object();
                }
                w.end_object();
            }
            w.end_array();
            if !mesh.weights.is_empty() {
                w.f32_array_field("weights", &mesh.weights);
            }
            self.write_extras(w, Categories::MESHES, index);
            if let Some(name) = &mesh.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_nodes(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.nodes.is_empty() {
            return;
        }
        w.begin_array_field("nodes");
        for (index, node) in asset.nodes.iter().enumerate() {
            w.begin_object();
            if let Some(camera) = node.camera {
                w.usize_field("camera", camera);
            }
            if !node.children.is_empty() {
                w.begin_array_field("children");
                for &child in &node.children {
                    w.usize(child);
                }
                w.end_array();
            }
            if let Some(mesh) = node.mesh {
                w.usize_field("mesh", mesh);
            }
            if let Some(skin) = node.skin {
                w.usize_field("skin", skin);
            }
            match &node.transform {
                Transform::Matrix(matrix) => {
                    w.f32_array_field("matrix", &matrix.to_cols_array());
                }
                Transform::Trs {
                    translation,
                    rotation,
                    scale,
                } => {
                    if *translation != glam::Vec3::ZERO {
                        w.f32_array_field("translation", &translation.to_array());
                    }
                    if *rotation != glam::Quat::IDENTITY {
                        w.f32_array_field("rotation", &rotation.to_array());
                    }
                    if *scale != glam::Vec3::ONE {
                        w.f32_array_field("scale", &scale.to_array());
                    }
                }
            }
            if !node.weights.is_empty() {
                w.f32_array_field("weights", &node.weights);
            }
            if node.light.is_some() || !node.instancing_attributes.is_empty() {
                w.begin_object_field("extensions");
                if let Some(light) = node.light {
                    w.begin_object_field("KHR_lights_punctual");
                    w.usize_field("light", light);
                    w.end_object();
                }
                if !node.instancing_attributes.is_empty() {
                    w.begin_object_field("EXT_mesh_gpu_instancing");
                    write_attribute_map(w, "attributes", &node.instancing_attributes);
                    w.end_object();
                }
                w.end_object();
            }
            self.write_extras(w, Categories::NODES, index);
            if let Some(name) = &node.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_samplers(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.samplers.is_empty() {
            return;
        }
        w.begin_array_field("samplers");
        for (index, sampler) in asset.samplers.iter().enumerate() {
            w.begin_object();
            if let Some(filter) = sampler.mag_filter {
                w.u64_field("magFilter", u64::from(filter.gl_code()));
            }
            if let Some(filter) = sampler.min_filter {
                w.u64_field("minFilter", u64::from(filter.gl_code()));
            }
            if sampler.wrap_s != Wrap::Repeat {
                w.u64_field("wrapS", u64::from(sampler.wrap_s.gl_code()));
            }
            if sampler.wrap_t != Wrap::Repeat {
                w.u64_field("wrapT", u64::from(sampler.wrap_t.gl_code()));
            }
            self.write_extras(w, Categories::SAMPLERS, index);
            if let Some(name) = &sampler.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_scenes(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if let Some(scene) = asset.default_scene {
            w.usize_field("scene", scene);
        }
        if asset.scenes.is_empty() {
            return;
        }
        w.begin_array_field("scenes");
        for (index, scene) in asset.scenes.iter().enumerate() {
            w.begin_object();
            if !scene.nodes.is_empty() {
                w.begin_array_field("nodes");
                for &node in &scene.nodes {
                    w.usize(node);
                }
                w.end_array();
            }
            self.write_extras(w, Categories::SCENES, index);
            if let Some(name) = &scene.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_skins(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.skins.is_empty() {
            return;
        }
        w.begin_array_field("skins");
        for (index, skin) in asset.skins.iter().enumerate() {
            w.begin_object();
            if let Some(matrices) = skin.inverse_bind_matrices {
                w.usize_field("inverseBindMatrices", matrices);
            }
            if let Some(skeleton) = skin.skeleton {
                w.usize_field("skeleton", skeleton);
            }
            w.begin_array_field("joints");
            for &joint in &skin.joints {
                w.usize(joint);
            }
            w.end_array();
            self.write_extras(w, Categories::SKINS, index);
            if let Some(name) = &skin.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    pub(super) fn write_textures(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.textures.is_empty() {
            return;
        }
        w.begin_array_field("textures");
        for (index, texture) in asset.textures.iter().enumerate() {
            w.begin_object();
            if let Some(sampler) = texture.sampler {
                w.usize_field("sampler", sampler);
            }
            if let Some(image) = texture.image {
                w.usize_field("source", image);
            }
            if texture.basisu_image.is_some()
                || texture.dds_image.is_some()
                || texture.webp_image.is_some()
            {
                w.begin_object_field("extensions");
                if let Some(image) = texture.basisu_image {
                    w.begin_object_field("KHR_texture_basisu");
                    w.usize_field("source", image);
                    w.end_object();
                }
                if let Some(image) = texture.dds_image {
                    w.begin_object_field("MSFT_texture_dds");
                    w.usize_field("source", image);
                    w.end_object();
                }
                if let Some(image) = texture.webp_image {
                    w.begin_object_field("EXT_texture_webp");
                    w.usize_field("source", image);
                    w.end_object();
                }
                w.end_object();
            }
            self.write_extras(w, Categories::TEXTURES, index);
            if let Some(name) = &texture.name {
                w.string_field("name", name);
            }
            w.end_object();
        }
        w.end_array();
    }

    /// Root `extensions`: punctual lights and material variant names.
    pub(super) fn write_root_extensions(&mut self, asset: &Asset, w: &mut JsonWriter) {
        if asset.lights.is_empty() && asset.material_variants.is_empty() {
            return;
        }
        w.begin_object_field("extensions");

        if !asset.lights.is_empty() {
            w.begin_object_field("KHR_lights_punctual");
            w.begin_array_field("lights");
            for light in &asset.lights {
                w.begin_object();
                if light.color != [1.0; 3] {
                    w.f32_array_field("color", &light.color);
                }
                if light.intensity != 1.0 {
                    w.f32_field("intensity", light.intensity);
                }
                w.string_field("type", light.kind.name());
                if let Some(range) = light.range {
                    w.f32_field("range", range);
                }
                if light.kind == LightType::Spot {
                    w.begin_object_field("spot");
                    if let Some(inner) = light.inner_cone_angle {
                        if inner != 0.0 {
                            w.f32_field("innerConeAngle", inner);
                        }
                    }
                    if let Some(outer) = light.outer_cone_angle {
                        if outer != std::f32::consts::FRAC_PI_4 {
                            w.f32_field("outerConeAngle", outer);
                        }
                    }
                    w.end_object();
                }
                if let Some(name) = &light.name {
                    w.string_field("name", name);
                }
                w.end_object();
            }
            w.end_array();
            w.end_object();
        }

        if !asset.material_variants.is_empty() {
            w.begin_object_field("KHR_materials_variants");
            w.begin_array_field("variants");
            for variant in &asset.material_variants {
                w.begin_object();
                w.string_field("name", variant);
                w.end_object();
            }
            w.end_array();
            w.end_object();
        }

        w.end_object();
    }
}

fn write_attribute_map(w: &mut JsonWriter, key: &str, attributes: &AttributeMap) {
    w.begin_object_field(key);
    for (name, &accessor) in attributes {
        w.usize_field(name, accessor);
    }
    w.end_object();
}

fn write_bounds(w: &mut JsonWriter, key: &str, bounds: &AccessorBounds) {
    w.begin_array_field(key);
    match bounds {
        AccessorBounds::Floats(values) => {
            for &value in values {
                w.f64(value);
            }
        }
        AccessorBounds::Ints(values) => {
            for &value in values {
                w.i64(value);
            }
        }
    }
    w.end_array();
}

fn path_as_uri(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    use graft_core::{Categories, DataSource};

    use crate::export::{GltfExporter, Exported};
    use crate::options::{ExportOptions, Extensions, ParseOptions};
    use crate::parse::GltfParser;
    use crate::GltfError;

    fn parse(json: &[u8]) -> graft_core::Asset {
        GltfParser::new(Extensions::all())
            .parse(json, None, ParseOptions::empty(), Categories::ALL)
            .unwrap()
    }

    /// A small document exercising scenes, nodes, materials and samplers but
    /// no binary payloads.
    const STRUCTURAL_DOC: &str = r#"{
        "asset": {"version": "2.0", "generator": "hand-rolled"},
        "scene": 0,
        "scenes": [{"nodes": [0], "name": "Root"}],
        "nodes": [
            {"children": [1], "translation": [1, 2, 3], "name": "parent"},
            {"rotation": [0, 0.7071068, 0, 0.7071068], "scale": [2, 2, 2]}
        ],
        "materials": [{
            "pbrMetallicRoughness": {
                "baseColorFactor": [0.5, 0.25, 1, 1],
                "roughnessFactor": 0.125
            },
            "alphaMode": "MASK",
            "doubleSided": true,
            "name": "painted"
        }],
        "samplers": [{"magFilter": 9729, "wrapS": 33071}]
    }"#;

    #[test]
    fn json_roundtrip_preserves_the_asset() {
        let original = parse(STRUCTURAL_DOC.as_bytes());
        let exported = GltfExporter::new()
            .export_json(&original, ExportOptions::VALIDATE_ASSET)
            .unwrap();
        let reparsed = parse(exported.output.as_bytes());
        assert_eq!(original, reparsed);
    }

    #[test]
    fn pretty_output_reparses_identically() {
        let original = parse(STRUCTURAL_DOC.as_bytes());
        let exported = GltfExporter::new()
            .export_json(&original, ExportOptions::PRETTY_PRINT_JSON)
            .unwrap();
        assert!(exported.output.contains('\n'));
        let reparsed = parse(exported.output.as_bytes());
        assert_eq!(original, reparsed);
    }

    fn geometry_doc() -> String {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, 1.0, 0.0];
        let indices: [u16; 3] = [0, 1, 2];
        let mut payload: Vec<u8> = positions.iter().flat_map(|f| f.to_le_bytes()).collect();
        payload.extend(indices.iter().flat_map(|i| i.to_le_bytes()));
        let encoded = BASE64.encode(&payload);

        format!(
            r#"{{
                "asset": {{"version": "2.0"}},
                "scene": 0,
                "scenes": [{{"nodes": [0]}}],
                "nodes": [{{"mesh": 0}}],
                "meshes": [{{"primitives": [{{
                    "attributes": {{"POSITION": 0}},
                    "indices": 1
                }}]}}],
                "accessors": [
                    {{
                        "bufferView": 0, "componentType": 5126, "count": 3,
                        "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 0]
                    }},
                    {{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}}
                ],
                "bufferViews": [
                    {{"buffer": 0, "byteLength": 36, "target": 34962}},
                    {{"buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963}}
                ],
                "buffers": [{{
                    "byteLength": 42,
                    "uri": "data:application/octet-stream;base64,{encoded}"
                }}]
            }}"#
        )
    }

    #[test]
    fn glb_roundtrip_reproduces_structure_and_payload() {
        let original = parse(geometry_doc().as_bytes());
        let exported = GltfExporter::new()
            .export_glb(&original, ExportOptions::VALIDATE_ASSET)
            .unwrap();

        // Buffer 0 was embedded, so nothing is planned as an external file.
        assert_eq!(exported.buffer_paths, vec![None]);

        let reparsed = GltfParser::new(Extensions::all())
            .parse(
                &exported.output,
                None,
                ParseOptions::empty(),
                Categories::ALL,
            )
            .unwrap();

        assert_eq!(original.accessors, reparsed.accessors);
        assert_eq!(original.buffer_views, reparsed.buffer_views);
        assert_eq!(original.meshes, reparsed.meshes);
        assert_eq!(reparsed.buffers.len(), 1);
        assert_eq!(reparsed.buffers[0].byte_length, 42);

        // The embedded binary payload is byte-identical to the original;
        // the chunk itself only adds trailing zero padding.
        let original_bytes = match &original.buffers[0].data {
            DataSource::Bytes { bytes, .. } => bytes,
            other => panic!("expected bytes, got {other:?}"),
        };
        let reparsed_bytes = match &reparsed.buffers[0].data {
            DataSource::Bytes { bytes, .. } => bytes,
            other => panic!("expected bytes, got {other:?}"),
        };
        assert_eq!(original_bytes.as_slice(), &reparsed_bytes[..42]);
        assert!(reparsed_bytes[42..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn json_export_plans_external_buffer_files() {
        let original = parse(geometry_doc().as_bytes());
        let mut exporter = GltfExporter::new();
        exporter.set_buffer_folder("buffers");
        let Exported {
            output,
            buffer_paths,
            ..
        } = exporter.export_json(&original, ExportOptions::empty()).unwrap();

        assert_eq!(
            buffer_paths,
            vec![Some(std::path::PathBuf::from("buffers/buffer0.bin"))]
        );
        assert!(output.contains(r#""uri":"buffers/buffer0.bin""#));
    }

    #[test]
    fn unsupported_data_source_is_a_sticky_error() {
        let mut asset = parse(geometry_doc().as_bytes());
        asset.buffers[0].data = DataSource::Custom {
            id: 7,
            mime: graft_core::MimeType::None,
        };
        let error = GltfExporter::new()
            .export_json(&asset, ExportOptions::empty())
            .unwrap_err();
        assert_eq!(error, GltfError::InvalidGltf);
    }

    #[test]
    fn lights_and_variants_roundtrip_through_root_extensions() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "extensionsUsed": ["KHR_lights_punctual", "KHR_materials_variants"],
            "extensions": {
                "KHR_lights_punctual": {"lights": [
                    {"type": "spot", "intensity": 40, "spot": {"outerConeAngle": 0.5}}
                ]},
                "KHR_materials_variants": {"variants": [{"name": "worn"}, {"name": "new"}]}
            },
            "materials": [{}, {}],
            "meshes": [{"primitives": [{
                "attributes": {"_SEED": 0},
                "extensions": {"KHR_materials_variants": {
                    "mappings": [{"material": 1, "variants": [0, 1]}]
                }}
            }]}],
            "accessors": [{"componentType": 5126, "count": 1, "type": "SCALAR"}]
        }"#;
        let original = parse(json.as_bytes());
        assert_eq!(original.material_variants.len(), 2);
        assert_eq!(
            original.meshes[0].primitives[0].variant_mappings,
            vec![Some(1), Some(1)]
        );

        let exported = GltfExporter::new()
            .export_json(&original, ExportOptions::VALIDATE_ASSET)
            .unwrap();
        let reparsed = parse(exported.output.as_bytes());
        assert_eq!(original.lights, reparsed.lights);
        assert_eq!(original.material_variants, reparsed.material_variants);
        assert_eq!(original.meshes, reparsed.meshes);
    }
}
