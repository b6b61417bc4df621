//! Section parsers for scenes, nodes, skins, cameras, animations and
//! punctual lights.

use glam::{Mat4, Quat, Vec3};
use serde_json::Value;

use graft_core::{
    Animation, AnimationChannel, AnimationPath, AnimationSampler, Camera, CameraProjection,
    Categories, Interpolation, Light, LightType, Node, Scene, Skin, Transform,
};

use crate::hash::{hash_str, keys};
use crate::options::{Extensions, ParseOptions};
use crate::{GltfError, Result};

use super::json::*;
use super::Walker;

impl Walker<'_> {
    pub(crate) fn parse_scenes(&mut self, values: &[Value]) -> Result<()> {
        self.asset.scenes.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;
            let scene = Scene {
                nodes: index_list_field(obj, "nodes")?.unwrap_or_default(),
                name: string_field(obj, "name")?,
            };
            self.extras(Categories::SCENES, self.asset.scenes.len(), obj);
            self.asset.scenes.push(scene);
        }
        Ok(())
    }

    pub(crate) fn parse_nodes(&mut self, values: &[Value]) -> Result<()> {
        self.asset.nodes.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;

            let transform = if let Some(matrix) = f32_array_field::<16>(obj, "matrix")? {
                let matrix = Mat4::from_cols_array(&matrix);
                if self.options.contains(ParseOptions::DECOMPOSE_NODE_MATRICES) {
                    let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
                    Transform::Trs {
                        translation,
                        rotation,
                        scale,
                    }
                } else {
                    Transform::Matrix(matrix)
                }
            } else {
                Transform::Trs {
                    translation: f32_array_field::<3>(obj, "translation")?
                        .map_or(Vec3::ZERO, Vec3::from),
                    rotation: f32_array_field::<4>(obj, "rotation")?
                        .map_or(Quat::IDENTITY, Quat::from_array),
                    scale: f32_array_field::<3>(obj, "scale")?.map_or(Vec3::ONE, Vec3::from),
                }
            };

            let mut light = None;
            let mut instancing_attributes = graft_core::AttributeMap::new();
            if let Some(extensions) = object_field(obj, "extensions")? {
                for (key, ext_value) in extensions {
                    match hash_str(key) {
                        keys::KHR_LIGHTS_PUNCTUAL if key == "KHR_lights_punctual" => {
                            if self.cfg.extensions().contains(Extensions::KHR_LIGHTS_PUNCTUAL) {
                                let ext = as_object(ext_value)?;
                                light = Some(require(usize_field(ext, "light")?)?);
                            }
                        }
                        keys::EXT_MESH_GPU_INSTANCING if key == "EXT_mesh_gpu_instancing" => {
                            if self
                                .cfg
                                .extensions()
                                .contains(Extensions::EXT_MESH_GPU_INSTANCING)
                            {
                                let ext = as_object(ext_value)?;
                                if let Some(attributes) = object_field(ext, "attributes")? {
                                    for (name, index) in attributes {
                                        instancing_attributes
                                            .insert(name.clone(), as_usize(index)?);
                                    }
                                }
                            }
                        }
                        _ => {
                            log::debug!("skipping node extension {key:?}");
                        }
                    }
                }
            }

            let node = Node {
                mesh: usize_field(obj, "mesh")?,
                camera: usize_field(obj, "camera")?,
                skin: usize_field(obj, "skin")?,
                light,
                children: index_list_field(obj, "children")?.unwrap_or_default(),
                weights: f32_list_field(obj, "weights")?.unwrap_or_default(),
                transform,
                instancing_attributes,
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::NODES, self.asset.nodes.len(), obj);
            self.asset.nodes.push(node);
        }
        Ok(())
    }

    pub(crate) fn parse_skins(&mut self, values: &[Value]) -> Result<()> {
        self.asset.skins.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;
            let skin = Skin {
                joints: require(index_list_field(obj, "joints")?)?,
                skeleton: usize_field(obj, "skeleton")?,
                inverse_bind_matrices: usize_field(obj, "inverseBindMatrices")?,
                name: string_field(obj, "name")?,
            };
            self.extras(Categories::SKINS, self.asset.skins.len(), obj);
            self.asset.skins.push(skin);
        }
        Ok(())
    }

    pub(crate) fn parse_cameras(&mut self, values: &[Value]) -> Result<()> {
        self.asset.cameras.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;

            let projection = match require(str_field(obj, "type")?)? {
                "perspective" => {
                    let perspective = require(object_field(obj, "perspective")?)?;
                    CameraProjection::Perspective {
                        aspect_ratio: f32_field(perspective, "aspectRatio")?,
                        yfov: require(f32_field(perspective, "yfov")?)?,
                        znear: require(f32_field(perspective, "znear")?)?,
                        zfar: f32_field(perspective, "zfar")?,
                    }
                }
                "orthographic" => {
                    let orthographic = require(object_field(obj, "orthographic")?)?;
                    CameraProjection::Orthographic {
                        xmag: require(f32_field(orthographic, "xmag")?)?,
                        ymag: require(f32_field(orthographic, "ymag")?)?,
                        zfar: require(f32_field(orthographic, "zfar")?)?,
                        znear: require(f32_field(orthographic, "znear")?)?,
                    }
                }
                _ => return Err(GltfError::InvalidGltf),
            };

            let camera = Camera {
                projection,
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::CAMERAS, self.asset.cameras.len(), obj);
            self.asset.cameras.push(camera);
        }
        Ok(())
    }

    pub(crate) fn parse_animations(&mut self, values: &[Value]) -> Result<()> {
        self.asset.animations.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;

            let mut channels = Vec::new();
            for channel in require(array_field(obj, "channels")?)? {
                let channel = as_object(channel)?;
                let target = require(object_field(channel, "target")?)?;
                channels.push(AnimationChannel {
                    sampler: require(usize_field(channel, "sampler")?)?,
                    node: usize_field(target, "node")?,
                    path: AnimationPath::from_name(require(str_field(target, "path")?)?)
                        .ok_or(GltfError::InvalidGltf)?,
                });
            }

            let mut samplers = Vec::new();
            for sampler in require(array_field(obj, "samplers")?)? {
                let sampler = as_object(sampler)?;
                let interpolation = match str_field(sampler, "interpolation")? {
                    Some(name) => {
                        Interpolation::from_name(name).ok_or(GltfError::InvalidGltf)?
                    }
                    None => Interpolation::Linear,
                };
                samplers.push(AnimationSampler {
                    input: require(usize_field(sampler, "input")?)?,
                    output: require(usize_field(sampler, "output")?)?,
                    interpolation,
                });
            }

            let animation = Animation {
                channels,
                samplers,
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::ANIMATIONS, self.asset.animations.len(), obj);
            self.asset.animations.push(animation);
        }
        Ok(())
    }

    /// Lights from the root `KHR_lights_punctual` extension object.
    pub(crate) fn parse_lights(&mut self, values: &[Value]) -> Result<()> {
        self.asset.lights.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;
            let kind = LightType::from_name(require(str_field(obj, "type")?)?)
                .ok_or(GltfError::InvalidGltf)?;

            let (inner_cone_angle, outer_cone_angle) = if kind == LightType::Spot {
                let spot = object_field(obj, "spot")?;
                let inner = spot
                    .map(|spot| f32_field(spot, "innerConeAngle"))
                    .transpose()?
                    .flatten()
                    .unwrap_or(0.0);
                let outer = spot
                    .map(|spot| f32_field(spot, "outerConeAngle"))
                    .transpose()?
                    .flatten()
                    .unwrap_or(std::f32::consts::FRAC_PI_4);
                (Some(inner), Some(outer))
            } else {
                (None, None)
            };

            self.asset.lights.push(Light {
                kind,
                color: f32_array_field::<3>(obj, "color")?.unwrap_or([1.0; 3]),
                intensity: f32_field(obj, "intensity")?.unwrap_or(1.0),
                range: f32_field(obj, "range")?,
                inner_cone_angle,
                outer_cone_angle,
                name: string_field(obj, "name")?,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::GltfParser;

    fn parse(json: &str, extensions: Extensions, options: ParseOptions) -> graft_core::Asset {
        GltfParser::new(extensions)
            .parse(json.as_bytes(), None, options, Categories::ALL)
            .unwrap()
    }

    #[test]
    fn node_trs_defaults() {
        let asset = parse(
            r#"{
                "asset": {"version": "2.0"},
                "nodes": [{"translation": [1.0, 2.0, 3.0]}]
            }"#,
            Extensions::empty(),
            ParseOptions::empty(),
        );
        assert_eq!(
            asset.nodes[0].transform,
            Transform::Trs {
                translation: Vec3::new(1.0, 2.0, 3.0),
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
            }
        );
    }

    #[test]
    fn matrix_decomposition_is_opt_in() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "nodes": [{"matrix": [
                2, 0, 0, 0,
                0, 2, 0, 0,
                0, 0, 2, 0,
                4, 5, 6, 1
            ]}]
        }"#;

        let kept = parse(json, Extensions::empty(), ParseOptions::empty());
        assert!(matches!(kept.nodes[0].transform, Transform::Matrix(_)));

        let decomposed = parse(
            json,
            Extensions::empty(),
            ParseOptions::DECOMPOSE_NODE_MATRICES,
        );
        match decomposed.nodes[0].transform {
            Transform::Trs {
                translation, scale, ..
            } => {
                assert_eq!(translation, Vec3::new(4.0, 5.0, 6.0));
                assert_eq!(scale, Vec3::splat(2.0));
            }
            ref other => panic!("expected TRS, got {other:?}"),
        }
    }

    #[test]
    fn spot_light_cone_defaults() {
        let asset = parse(
            r#"{
                "asset": {"version": "2.0"},
                "extensions": {"KHR_lights_punctual": {"lights": [
                    {"type": "spot", "spot": {}},
                    {"type": "directional"}
                ]}},
                "extensionsUsed": ["KHR_lights_punctual"]
            }"#,
            Extensions::KHR_LIGHTS_PUNCTUAL,
            ParseOptions::empty(),
        );
        let spot = &asset.lights[0];
        assert_eq!(spot.inner_cone_angle, Some(0.0));
        assert_eq!(spot.outer_cone_angle, Some(std::f32::consts::FRAC_PI_4));
        let directional = &asset.lights[1];
        assert_eq!(directional.inner_cone_angle, None);
        assert_eq!(directional.intensity, 1.0);
    }

    #[test]
    fn lights_require_the_extension_bit() {
        let asset = parse(
            r#"{
                "asset": {"version": "2.0"},
                "extensions": {"KHR_lights_punctual": {"lights": [{"type": "point"}]}}
            }"#,
            Extensions::empty(),
            ParseOptions::empty(),
        );
        assert!(asset.lights.is_empty());
    }

    #[test]
    fn node_light_reference() {
        let asset = parse(
            r#"{
                "asset": {"version": "2.0"},
                "nodes": [{"extensions": {"KHR_lights_punctual": {"light": 0}}}],
                "extensions": {"KHR_lights_punctual": {"lights": [{"type": "point"}]}}
            }"#,
            Extensions::KHR_LIGHTS_PUNCTUAL,
            ParseOptions::empty(),
        );
        assert_eq!(asset.nodes[0].light, Some(0));
    }

    #[test]
    fn animation_parsing() {
        let asset = parse(
            r#"{
                "asset": {"version": "2.0"},
                "animations": [{
                    "channels": [{"sampler": 0, "target": {"node": 0, "path": "rotation"}}],
                    "samplers": [{"input": 0, "output": 1, "interpolation": "CUBICSPLINE"}]
                }]
            }"#,
            Extensions::empty(),
            ParseOptions::empty(),
        );
        let animation = &asset.animations[0];
        assert_eq!(animation.channels[0].path, AnimationPath::Rotation);
        assert_eq!(
            animation.samplers[0].interpolation,
            Interpolation::CubicSpline
        );
    }
}
