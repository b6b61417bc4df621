//! Section parsers for materials, textures and samplers.

use glam::Vec2;
use serde_json::Value;

use graft_core::{
    AlphaMode, Anisotropy, Categories, Clearcoat, Filter, Iridescence, Material,
    NormalTextureInfo, OcclusionTextureInfo, PackedTextures, Sampler, Sheen, Specular, Texture,
    TextureInfo, TextureTransform, Transmission, Volume, Wrap,
};

use crate::hash::{hash_str, keys};
use crate::options::Extensions;
use crate::{GltfError, Result};

use super::json::*;
use super::Walker;

impl Walker<'_> {
    pub(crate) fn parse_samplers(&mut self, values: &[Value]) -> Result<()> {
        self.asset.samplers.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;

            let mag_filter = match u64_field(obj, "magFilter")? {
                Some(code) => Some(Filter::from_gl(code).ok_or(GltfError::InvalidGltf)?),
                None => None,
            };
            let min_filter = match u64_field(obj, "minFilter")? {
                Some(code) => Some(Filter::from_gl(code).ok_or(GltfError::InvalidGltf)?),
                None => None,
            };
            let wrap_s = match u64_field(obj, "wrapS")? {
                Some(code) => Wrap::from_gl(code).ok_or(GltfError::InvalidGltf)?,
                None => Wrap::Repeat,
            };
            let wrap_t = match u64_field(obj, "wrapT")? {
                Some(code) => Wrap::from_gl(code).ok_or(GltfError::InvalidGltf)?,
                None => Wrap::Repeat,
            };

            let sampler = Sampler {
                mag_filter,
                min_filter,
                wrap_s,
                wrap_t,
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::SAMPLERS, self.asset.samplers.len(), obj);
            self.asset.samplers.push(sampler);
        }
        Ok(())
    }

    pub(crate) fn parse_textures(&mut self, values: &[Value]) -> Result<()> {
        self.asset.textures.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;

            let mut texture = Texture {
                sampler: usize_field(obj, "sampler")?,
                image: usize_field(obj, "source")?,
                basisu_image: None,
                dds_image: None,
                webp_image: None,
                name: string_field(obj, "name")?,
            };

            if let Some(extensions) = object_field(obj, "extensions")? {
                let enabled = self.cfg.extensions();
                for (key, ext_value) in extensions {
                    match hash_str(key) {
                        keys::KHR_TEXTURE_BASISU if key == "KHR_texture_basisu" => {
                            if enabled.contains(Extensions::KHR_TEXTURE_BASISU) {
                                let ext = as_object(ext_value)?;
                                texture.basisu_image = Some(require(usize_field(ext, "source")?)?);
                            }
                        }
                        keys::MSFT_TEXTURE_DDS if key == "MSFT_texture_dds" => {
                            if enabled.contains(Extensions::MSFT_TEXTURE_DDS) {
                                let ext = as_object(ext_value)?;
                                texture.dds_image = Some(require(usize_field(ext, "source")?)?);
                            }
                        }
                        keys::EXT_TEXTURE_WEBP if key == "EXT_texture_webp" => {
                            if enabled.contains(Extensions::EXT_TEXTURE_WEBP) {
                                let ext = as_object(ext_value)?;
                                texture.webp_image = Some(require(usize_field(ext, "source")?)?);
                            }
                        }
                        _ => {
                            log::debug!("skipping texture extension {key:?}");
                        }
                    }
                }
            }

            self.extras(Categories::TEXTURES, self.asset.textures.len(), obj);
            self.asset.textures.push(texture);
        }
        Ok(())
    }

    pub(crate) fn parse_materials(&mut self, values: &[Value]) -> Result<()> {
        self.asset.materials.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;
            let mut material = Material::default();

            if let Some(pbr) = object_field(obj, "pbrMetallicRoughness")? {
                material.pbr.base_color_factor =
                    f32_array_field::<4>(pbr, "baseColorFactor")?.unwrap_or([1.0; 4]);
                material.pbr.metallic_factor = f32_field(pbr, "metallicFactor")?.unwrap_or(1.0);
                material.pbr.roughness_factor = f32_field(pbr, "roughnessFactor")?.unwrap_or(1.0);
                material.pbr.base_color_texture = self.texture_info_field(pbr, "baseColorTexture")?;
                material.pbr.metallic_roughness_texture =
                    self.texture_info_field(pbr, "metallicRoughnessTexture")?;
            }

            if let Some(normal) = object_field(obj, "normalTexture")? {
                material.normal_texture = Some(NormalTextureInfo {
                    texture: self.parse_texture_info(normal)?,
                    scale: f32_field(normal, "scale")?.unwrap_or(1.0),
                });
            }
            if let Some(occlusion) = object_field(obj, "occlusionTexture")? {
                material.occlusion_texture = Some(OcclusionTextureInfo {
                    texture: self.parse_texture_info(occlusion)?,
                    strength: f32_field(occlusion, "strength")?.unwrap_or(1.0),
                });
            }
            material.emissive_texture = self.texture_info_field(obj, "emissiveTexture")?;
            material.emissive_factor =
                f32_array_field::<3>(obj, "emissiveFactor")?.unwrap_or([0.0; 3]);

            if let Some(mode) = str_field(obj, "alphaMode")? {
                material.alpha_mode = AlphaMode::from_name(mode).ok_or(GltfError::InvalidGltf)?;
            }
            material.alpha_cutoff = f32_field(obj, "alphaCutoff")?.unwrap_or(0.5);
            material.double_sided = bool_field(obj, "doubleSided")?.unwrap_or(false);

            if let Some(extensions) = object_field(obj, "extensions")? {
                self.parse_material_extensions(extensions, &mut material)?;
            }

            material.name = string_field(obj, "name")?;

            self.extras(Categories::MATERIALS, self.asset.materials.len(), obj);
            self.asset.materials.push(material);
        }
        Ok(())
    }

    /// Walk a material's `extensions` object, honoring only enabled bits.
    fn parse_material_extensions(
        &mut self,
        extensions: &JsonObject,
        material: &mut Material,
    ) -> Result<()> {
        let enabled = self.cfg.extensions();
        for (key, value) in extensions {
            match hash_str(key) {
                keys::KHR_MATERIALS_UNLIT if key == "KHR_materials_unlit" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_UNLIT) {
                        material.unlit = true;
                    }
                }
                keys::KHR_MATERIALS_IOR if key == "KHR_materials_ior" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_IOR) {
                        let ext = as_object(value)?;
                        material.ior = f32_field(ext, "ior")?.unwrap_or(1.5);
                    }
                }
                keys::KHR_MATERIALS_EMISSIVE_STRENGTH
                    if key == "KHR_materials_emissive_strength" =>
                {
                    if enabled.contains(Extensions::KHR_MATERIALS_EMISSIVE_STRENGTH) {
                        let ext = as_object(value)?;
                        material.emissive_strength =
                            f32_field(ext, "emissiveStrength")?.unwrap_or(1.0);
                    }
                }
                keys::KHR_MATERIALS_DISPERSION if key == "KHR_materials_dispersion" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_DISPERSION) {
                        let ext = as_object(value)?;
                        material.dispersion = f32_field(ext, "dispersion")?.unwrap_or(0.0);
                    }
                }
                keys::KHR_MATERIALS_ANISOTROPY if key == "KHR_materials_anisotropy" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_ANISOTROPY) {
                        let ext = as_object(value)?;
                        material.anisotropy = Some(Box::new(Anisotropy {
                            strength: f32_field(ext, "anisotropyStrength")?.unwrap_or(0.0),
                            rotation: f32_field(ext, "anisotropyRotation")?.unwrap_or(0.0),
                            texture: self.texture_info_field(ext, "anisotropyTexture")?,
                        }));
                    }
                }
                keys::KHR_MATERIALS_CLEARCOAT if key == "KHR_materials_clearcoat" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_CLEARCOAT) {
                        let ext = as_object(value)?;
                        let normal_texture = match object_field(ext, "clearcoatNormalTexture")? {
                            Some(normal) => Some(NormalTextureInfo {
                                texture: self.parse_texture_info(normal)?,
                                scale: f32_field(normal, "scale")?.unwrap_or(1.0),
                            }),
                            None => None,
                        };
                        material.clearcoat = Some(Box::new(Clearcoat {
                            factor: f32_field(ext, "clearcoatFactor")?.unwrap_or(0.0),
                            texture: self.texture_info_field(ext, "clearcoatTexture")?,
                            roughness_factor: f32_field(ext, "clearcoatRoughnessFactor")?
                                .unwrap_or(0.0),
                            roughness_texture: self
                                .texture_info_field(ext, "clearcoatRoughnessTexture")?,
                            normal_texture,
                        }));
                    }
                }
                keys::KHR_MATERIALS_IRIDESCENCE if key == "KHR_materials_iridescence" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_IRIDESCENCE) {
                        let ext = as_object(value)?;
                        material.iridescence = Some(Box::new(Iridescence {
                            factor: f32_field(ext, "iridescenceFactor")?.unwrap_or(0.0),
                            texture: self.texture_info_field(ext, "iridescenceTexture")?,
                            ior: f32_field(ext, "iridescenceIor")?.unwrap_or(1.3),
                            thickness_minimum: f32_field(ext, "iridescenceThicknessMinimum")?
                                .unwrap_or(100.0),
                            thickness_maximum: f32_field(ext, "iridescenceThicknessMaximum")?
                                .unwrap_or(400.0),
                            thickness_texture: self
                                .texture_info_field(ext, "iridescenceThicknessTexture")?,
                        }));
                    }
                }
                keys::KHR_MATERIALS_SHEEN if key == "KHR_materials_sheen" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_SHEEN) {
                        let ext = as_object(value)?;
                        material.sheen = Some(Box::new(Sheen {
                            color_factor: f32_array_field::<3>(ext, "sheenColorFactor")?
                                .unwrap_or([0.0; 3]),
                            color_texture: self.texture_info_field(ext, "sheenColorTexture")?,
                            roughness_factor: f32_field(ext, "sheenRoughnessFactor")?
                                .unwrap_or(0.0),
                            roughness_texture: self
                                .texture_info_field(ext, "sheenRoughnessTexture")?,
                        }));
                    }
                }
                keys::KHR_MATERIALS_SPECULAR if key == "KHR_materials_specular" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_SPECULAR) {
                        let ext = as_object(value)?;
                        material.specular = Some(Box::new(Specular {
                            factor: f32_field(ext, "specularFactor")?.unwrap_or(1.0),
                            texture: self.texture_info_field(ext, "specularTexture")?,
                            color_factor: f32_array_field::<3>(ext, "specularColorFactor")?
                                .unwrap_or([1.0; 3]),
                            color_texture: self.texture_info_field(ext, "specularColorTexture")?,
                        }));
                    }
                }
                keys::KHR_MATERIALS_TRANSMISSION if key == "KHR_materials_transmission" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_TRANSMISSION) {
                        let ext = as_object(value)?;
                        material.transmission = Some(Box::new(Transmission {
                            factor: f32_field(ext, "transmissionFactor")?.unwrap_or(0.0),
                            texture: self.texture_info_field(ext, "transmissionTexture")?,
                        }));
                    }
                }
                keys::KHR_MATERIALS_VOLUME if key == "KHR_materials_volume" => {
                    if enabled.contains(Extensions::KHR_MATERIALS_VOLUME) {
                        let ext = as_object(value)?;
                        material.volume = Some(Box::new(Volume {
                            thickness_factor: f32_field(ext, "thicknessFactor")?.unwrap_or(0.0),
                            thickness_texture: self.texture_info_field(ext, "thicknessTexture")?,
                            attenuation_distance: f32_field(ext, "attenuationDistance")?
                                .unwrap_or(f32::INFINITY),
                            attenuation_color: f32_array_field::<3>(ext, "attenuationColor")?
                                .unwrap_or([1.0; 3]),
                        }));
                    }
                }
                keys::MSFT_PACKING_NRM if key == "MSFT_packing_normalRoughnessMetallic" => {
                    if enabled.contains(Extensions::MSFT_PACKING_NORMAL_ROUGHNESS_METALLIC) {
                        let ext = as_object(value)?;
                        let packed = material
                            .packed_textures
                            .get_or_insert_with(|| Box::new(PackedTextures::default()));
                        if let Some(info) = object_field(ext, "normalRoughnessMetallicTexture")? {
                            packed.normal_roughness_metallic =
                                Some(TextureInfo::new(require(usize_field(info, "index")?)?));
                        }
                    }
                }
                keys::MSFT_PACKING_ORM if key == "MSFT_packing_occlusionRoughnessMetallic" => {
                    if enabled.contains(Extensions::MSFT_PACKING_OCCLUSION_ROUGHNESS_METALLIC) {
                        let ext = as_object(value)?;
                        let packed = material
                            .packed_textures
                            .get_or_insert_with(|| Box::new(PackedTextures::default()));
                        if let Some(info) =
                            object_field(ext, "occlusionRoughnessMetallicTexture")?
                        {
                            packed.occlusion_roughness_metallic =
                                Some(TextureInfo::new(require(usize_field(info, "index")?)?));
                        }
                        if let Some(info) =
                            object_field(ext, "roughnessMetallicOcclusionTexture")?
                        {
                            packed.roughness_metallic_occlusion =
                                Some(TextureInfo::new(require(usize_field(info, "index")?)?));
                        }
                        if let Some(info) = object_field(ext, "normalTexture")? {
                            packed.normal =
                                Some(TextureInfo::new(require(usize_field(info, "index")?)?));
                        }
                    }
                }
                _ => {
                    log::debug!("skipping material extension {key:?}");
                }
            }
        }
        Ok(())
    }

    fn texture_info_field(
        &mut self,
        obj: &JsonObject,
        key: &str,
    ) -> Result<Option<TextureInfo>> {
        match object_field(obj, key)? {
            Some(info) => Ok(Some(self.parse_texture_info(info)?)),
            None => Ok(None),
        }
    }

    fn parse_texture_info(&mut self, obj: &JsonObject) -> Result<TextureInfo> {
        let mut info = TextureInfo {
            texture: require(usize_field(obj, "index")?)?,
            tex_coord: usize_field(obj, "texCoord")?.unwrap_or(0),
            transform: None,
        };

        if let Some(extensions) = object_field(obj, "extensions")? {
            if self
                .cfg
                .extensions()
                .contains(Extensions::KHR_TEXTURE_TRANSFORM)
            {
                if let Some(transform) = object_field(extensions, "KHR_texture_transform")? {
                    info.transform = Some(Box::new(TextureTransform {
                        offset: f32_array_field::<2>(transform, "offset")?
                            .map_or(Vec2::ZERO, Vec2::from),
                        rotation: f32_field(transform, "rotation")?.unwrap_or(0.0),
                        scale: f32_array_field::<2>(transform, "scale")?
                            .map_or(Vec2::ONE, Vec2::from),
                        tex_coord: usize_field(transform, "texCoord")?,
                    }));
                }
            }
        }

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::GltfParser;
    use crate::options::ParseOptions;

    fn parse(json: &str, extensions: Extensions) -> graft_core::Asset {
        GltfParser::new(extensions)
            .parse(
                json.as_bytes(),
                None,
                ParseOptions::empty(),
                Categories::ALL,
            )
            .unwrap()
    }

    #[test]
    fn material_defaults() {
        let asset = parse(
            r#"{"asset": {"version": "2.0"}, "materials": [{}]}"#,
            Extensions::empty(),
        );
        let material = &asset.materials[0];
        assert_eq!(*material, Material::default());
        assert_eq!(material.pbr.base_color_factor, [1.0; 4]);
        assert_eq!(material.ior, 1.5);
        assert_eq!(material.alpha_cutoff, 0.5);
    }

    #[test]
    fn disabled_extension_sub_records_are_skipped() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "materials": [{
                "extensions": {
                    "KHR_materials_clearcoat": {"clearcoatFactor": 0.8},
                    "KHR_materials_unlit": {}
                }
            }]
        }"#;

        let ignored = parse(json, Extensions::empty());
        assert!(ignored.materials[0].clearcoat.is_none());
        assert!(!ignored.materials[0].unlit);

        let honored = parse(
            json,
            Extensions::KHR_MATERIALS_CLEARCOAT | Extensions::KHR_MATERIALS_UNLIT,
        );
        let clearcoat = honored.materials[0].clearcoat.as_ref().unwrap();
        assert_eq!(clearcoat.factor, 0.8);
        assert!(honored.materials[0].unlit);
    }

    #[test]
    fn texture_transform_on_texture_info() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "materials": [{
                "pbrMetallicRoughness": {
                    "baseColorTexture": {
                        "index": 0,
                        "extensions": {"KHR_texture_transform": {
                            "offset": [0.25, 0.5],
                            "scale": [2.0, 2.0]
                        }}
                    }
                }
            }]
        }"#;
        let asset = parse(json, Extensions::KHR_TEXTURE_TRANSFORM);
        let info = asset.materials[0].pbr.base_color_texture.as_ref().unwrap();
        let transform = info.transform.as_ref().unwrap();
        assert_eq!(transform.offset, Vec2::new(0.25, 0.5));
        assert_eq!(transform.scale, Vec2::splat(2.0));
        assert_eq!(transform.rotation, 0.0);
    }

    #[test]
    fn alternate_texture_sources() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "textures": [{
                "source": 0,
                "extensions": {
                    "KHR_texture_basisu": {"source": 1},
                    "EXT_texture_webp": {"source": 2}
                }
            }]
        }"#;
        let asset = parse(
            json,
            Extensions::KHR_TEXTURE_BASISU | Extensions::EXT_TEXTURE_WEBP,
        );
        let texture = &asset.textures[0];
        assert_eq!(texture.image, Some(0));
        assert_eq!(texture.basisu_image, Some(1));
        assert_eq!(texture.webp_image, Some(2));
        assert_eq!(texture.dds_image, None);
    }

    #[test]
    fn sampler_wrap_defaults() {
        let asset = parse(
            r#"{"asset": {"version": "2.0"}, "samplers": [{"magFilter": 9728}]}"#,
            Extensions::empty(),
        );
        let sampler = &asset.samplers[0];
        assert_eq!(sampler.mag_filter, Some(Filter::Nearest));
        assert_eq!(sampler.wrap_s, Wrap::Repeat);
        assert_eq!(sampler.wrap_t, Wrap::Repeat);
    }
}
