//! Cross-referential asset validation.
//!
//! [`validate`] is a pure pass over a completed [`Asset`], independent of how
//! the asset was produced. It returns on the first violated rule; there is no
//! partial or aggregated reporting. Every semantic violation maps to
//! [`GltfError::InvalidGltf`].

use graft_core::{
    AccessorBounds, Asset, CameraProjection, ComponentType, CompressionMode, DataSource,
    Interpolation, LightType, TextureInfo, Transform,
};

use crate::{GltfError, Result};

/// Check every cross-reference and semantic rule of a completed asset.
pub fn validate(asset: &Asset) -> Result<()> {
    validate_extension_declarations(asset)?;
    validate_accessors(asset)?;
    validate_animations(asset)?;
    validate_buffers(asset)?;
    validate_buffer_views(asset)?;
    validate_cameras(asset)?;
    validate_images(asset)?;
    validate_lights(asset)?;
    validate_materials(asset)?;
    validate_meshes(asset)?;
    validate_nodes(asset)?;
    validate_samplers(asset)?;
    validate_scenes(asset)?;
    validate_skins(asset)?;
    validate_textures(asset)?;
    Ok(())
}

fn invalid() -> GltfError {
    GltfError::InvalidGltf
}

fn validate_extension_declarations(asset: &Asset) -> Result<()> {
    // extensionsRequired must be a subset of extensionsUsed.
    if asset.extensions_required.len() > asset.extensions_used.len() {
        return Err(invalid());
    }
    for required in &asset.extensions_required {
        if !asset.uses_extension(required) {
            return Err(invalid());
        }
    }
    Ok(())
}

fn validate_accessors(asset: &Asset) -> Result<()> {
    for accessor in &asset.accessors {
        if accessor.count < 1 {
            return Err(invalid());
        }
        if let Some(view_index) = accessor.buffer_view {
            if view_index >= asset.buffer_views.len() {
                return Err(invalid());
            }
        }

        if accessor.byte_offset != 0 {
            // Both the offset into the view and the combined offset into the
            // buffer must be multiples of the component size, and so must a
            // declared stride.
            let component_size = accessor.component_type.byte_size();
            if accessor.byte_offset % component_size != 0 {
                return Err(invalid());
            }
            if let Some(view_index) = accessor.buffer_view {
                let view = &asset.buffer_views[view_index];
                if (accessor.byte_offset + view.byte_offset) % component_size != 0 {
                    return Err(invalid());
                }
                if let Some(stride) = view.byte_stride {
                    if stride % component_size != 0 {
                        return Err(invalid());
                    }
                }
            }
        }

        // Floating-point accessors carry floating-point bounds.
        for bounds in [&accessor.min, &accessor.max].into_iter().flatten() {
            if accessor.component_type.is_float()
                && !matches!(bounds, AccessorBounds::Floats(_))
            {
                return Err(invalid());
            }
        }

        if let Some(sparse) = &accessor.sparse {
            let indices_view = asset
                .buffer_views
                .get(sparse.indices_view)
                .ok_or_else(invalid)?;
            if indices_view.byte_stride.is_some() || indices_view.target.is_some() {
                return Err(invalid());
            }
            let values_view = asset
                .buffer_views
                .get(sparse.values_view)
                .ok_or_else(invalid)?;
            if values_view.byte_stride.is_some() || values_view.target.is_some() {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

fn validate_animations(asset: &Asset) -> Result<()> {
    for animation in &asset.animations {
        if animation.channels.is_empty() || animation.samplers.is_empty() {
            return Err(invalid());
        }

        // The (node, path) pair of every channel is unique per animation.
        for (index, channel) in animation.channels.iter().enumerate() {
            for other in &animation.channels[index + 1..] {
                if channel.node == other.node && channel.path == other.path {
                    return Err(invalid());
                }
            }
        }

        for channel in &animation.channels {
            let sampler = animation
                .samplers
                .get(channel.sampler)
                .ok_or_else(invalid)?;

            let input = asset.accessors.get(sampler.input).ok_or_else(invalid)?;
            if input.kind != graft_core::AccessorKind::Scalar {
                return Err(invalid());
            }
            if !input.component_type.is_float() {
                return Err(invalid());
            }
            if view_is_compressed(asset, input.buffer_view) {
                continue;
            }
            if input.count == 0 {
                continue;
            }
            if channel.path == graft_core::AnimationPath::Weights {
                // Weight outputs scale with the morph target count, which is
                // not known here.
                continue;
            }

            let output = asset.accessors.get(sampler.output).ok_or_else(invalid)?;
            if view_is_compressed(asset, output.buffer_view) {
                continue;
            }

            match sampler.interpolation {
                Interpolation::Linear | Interpolation::Step => {
                    if input.count != output.count {
                        return Err(invalid());
                    }
                }
                Interpolation::CubicSpline => {
                    if input.count < 2 || input.count * 3 != output.count {
                        return Err(invalid());
                    }
                }
            }
        }
    }
    Ok(())
}

fn view_is_compressed(asset: &Asset, view: Option<usize>) -> bool {
    view.and_then(|index| asset.buffer_views.get(index))
        .is_some_and(|view| view.meshopt.is_some())
}

fn validate_buffers(asset: &Asset) -> Result<()> {
    for buffer in &asset.buffers {
        if buffer.byte_length < 1 {
            return Err(invalid());
        }
    }
    Ok(())
}

fn validate_buffer_views(asset: &Asset) -> Result<()> {
    for view in &asset.buffer_views {
        if view.byte_length < 1 {
            return Err(invalid());
        }
        if let Some(stride) = view.byte_stride {
            if !(4..=252).contains(&stride) || stride % 4 != 0 {
                return Err(invalid());
            }
        }
        if view.buffer >= asset.buffers.len() {
            return Err(invalid());
        }

        if let Some(meshopt) = &view.meshopt {
            if !asset.uses_extension("EXT_meshopt_compression") {
                return Err(invalid());
            }
            if meshopt.buffer >= asset.buffers.len() {
                return Err(invalid());
            }
            match meshopt.mode {
                CompressionMode::Attributes => {
                    if meshopt.byte_stride % 4 != 0 || meshopt.byte_stride > 256 {
                        return Err(invalid());
                    }
                }
                CompressionMode::Triangles => {
                    if meshopt.count % 3 != 0 {
                        return Err(invalid());
                    }
                    if meshopt.byte_stride != 2 && meshopt.byte_stride != 4 {
                        return Err(invalid());
                    }
                }
                CompressionMode::Indices => {
                    if meshopt.byte_stride != 2 && meshopt.byte_stride != 4 {
                        return Err(invalid());
                    }
                }
            }
        }
    }
    Ok(())
}

fn validate_cameras(asset: &Asset) -> Result<()> {
    for camera in &asset.cameras {
        match camera.projection {
            CameraProjection::Orthographic { zfar, .. } => {
                if zfar == 0.0 {
                    return Err(invalid());
                }
            }
            CameraProjection::Perspective {
                aspect_ratio,
                yfov,
                znear,
                zfar,
            } => {
                if aspect_ratio == Some(0.0) {
                    return Err(invalid());
                }
                if yfov == 0.0 || znear == 0.0 {
                    return Err(invalid());
                }
                if zfar == Some(0.0) {
                    return Err(invalid());
                }
            }
        }
    }
    Ok(())
}

fn validate_images(asset: &Asset) -> Result<()> {
    for image in &asset.images {
        if let DataSource::BufferView { view, .. } = image.data {
            if view >= asset.buffer_views.len() {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

fn validate_lights(asset: &Asset) -> Result<()> {
    for light in &asset.lights {
        if light.kind == LightType::Directional && light.range.is_some() {
            return Err(invalid());
        }
        if let Some(range) = light.range {
            if range <= 0.0 {
                return Err(invalid());
            }
        }

        if light.kind != LightType::Spot {
            if light.inner_cone_angle.is_some() || light.outer_cone_angle.is_some() {
                return Err(invalid());
            }
        } else {
            let (Some(inner), Some(outer)) = (light.inner_cone_angle, light.outer_cone_angle)
            else {
                return Err(invalid());
            };
            if inner < 0.0 || inner > outer || outer > std::f32::consts::FRAC_PI_2 {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

fn validate_materials(asset: &Asset) -> Result<()> {
    let texture_in_bounds = |info: &Option<TextureInfo>| {
        info.as_ref()
            .map_or(true, |info| info.texture < asset.textures.len())
    };

    for material in &asset.materials {
        if let Some(normal) = &material.normal_texture {
            if normal.texture.texture >= asset.textures.len() {
                return Err(invalid());
            }
        }
        if let Some(occlusion) = &material.occlusion_texture {
            if occlusion.texture.texture >= asset.textures.len() {
                return Err(invalid());
            }
        }
        if !texture_in_bounds(&material.emissive_texture)
            || !texture_in_bounds(&material.pbr.base_color_texture)
            || !texture_in_bounds(&material.pbr.metallic_roughness_texture)
        {
            return Err(invalid());
        }

        // Every extension sub-record implies the extension is declared used.
        if material.anisotropy.is_some() && !asset.uses_extension("KHR_materials_anisotropy") {
            return Err(invalid());
        }
        if material.clearcoat.is_some() && !asset.uses_extension("KHR_materials_clearcoat") {
            return Err(invalid());
        }
        if material.iridescence.is_some() && !asset.uses_extension("KHR_materials_iridescence") {
            return Err(invalid());
        }
        if material.sheen.is_some() && !asset.uses_extension("KHR_materials_sheen") {
            return Err(invalid());
        }
        if material.specular.is_some() && !asset.uses_extension("KHR_materials_specular") {
            return Err(invalid());
        }
        if material.transmission.is_some() && !asset.uses_extension("KHR_materials_transmission")
        {
            return Err(invalid());
        }
        if material.volume.is_some() && !asset.uses_extension("KHR_materials_volume") {
            return Err(invalid());
        }
        if material.emissive_strength != 1.0
            && !asset.uses_extension("KHR_materials_emissive_strength")
        {
            return Err(invalid());
        }
        if material.ior != 1.5 && !asset.uses_extension("KHR_materials_ior") {
            return Err(invalid());
        }
        if material.dispersion != 0.0 && !asset.uses_extension("KHR_materials_dispersion") {
            return Err(invalid());
        }
        if let Some(packed) = &material.packed_textures {
            if packed.normal_roughness_metallic.is_some()
                && !asset.uses_extension("MSFT_packing_normalRoughnessMetallic")
            {
                return Err(invalid());
            }
            if (packed.occlusion_roughness_metallic.is_some()
                || packed.roughness_metallic_occlusion.is_some()
                || packed.normal.is_some())
                && !asset.uses_extension("MSFT_packing_occlusionRoughnessMetallic")
            {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

fn validate_meshes(asset: &Asset) -> Result<()> {
    let quantized = asset.uses_extension("KHR_mesh_quantization");

    for mesh in &asset.meshes {
        for primitive in &mesh.primitives {
            if let Some(material) = primitive.material {
                if material >= asset.materials.len() {
                    return Err(invalid());
                }
            }

            if !primitive.variant_mappings.is_empty() {
                if !asset.uses_extension("KHR_materials_variants") {
                    return Err(invalid());
                }
                if primitive.variant_mappings.len() != asset.material_variants.len() {
                    return Err(invalid());
                }
                for mapping in primitive.variant_mappings.iter().flatten() {
                    if *mapping >= asset.materials.len() {
                        return Err(invalid());
                    }
                }
            }

            if let Some(indices) = primitive.indices {
                let accessor = asset.accessors.get(indices).ok_or_else(invalid)?;
                if let Some(view_index) = accessor.buffer_view {
                    // A stride is only allowed on vertex attribute views.
                    let view = asset.buffer_views.get(view_index).ok_or_else(invalid)?;
                    if view.byte_stride.is_some() {
                        return Err(invalid());
                    }
                }
            }

            for (name, &accessor_index) in &primitive.attributes {
                let accessor = asset.accessors.get(accessor_index).ok_or_else(invalid)?;
                validate_attribute_semantic(name, accessor, quantized)?;
            }
        }
    }
    Ok(())
}

/// The fixed attribute semantic table, relaxable under `KHR_mesh_quantization`.
fn validate_attribute_semantic(
    name: &str,
    accessor: &graft_core::Accessor,
    quantized: bool,
) -> Result<()> {
    use graft_core::AccessorKind as Kind;

    let component = accessor.component_type;
    match name {
        "POSITION" => {
            // Vertex position accessors must carry bounds.
            if accessor.min.is_none() || accessor.max.is_none() {
                return Err(invalid());
            }
            if accessor.kind != Kind::Vec3 {
                return Err(invalid());
            }
            if !quantized {
                if component != ComponentType::Float {
                    return Err(invalid());
                }
            } else if component == ComponentType::Double || component == ComponentType::UnsignedInt
            {
                return Err(invalid());
            }
        }
        "NORMAL" => {
            if accessor.kind != Kind::Vec3 {
                return Err(invalid());
            }
            if !quantized {
                if component != ComponentType::Float {
                    return Err(invalid());
                }
            } else if component != ComponentType::Float
                && component != ComponentType::Short
                && component != ComponentType::Byte
            {
                return Err(invalid());
            }
        }
        "TANGENT" => {
            if accessor.kind != Kind::Vec4 {
                return Err(invalid());
            }
            if !quantized {
                if component != ComponentType::Float {
                    return Err(invalid());
                }
            } else if component != ComponentType::Float
                && component != ComponentType::Short
                && component != ComponentType::Byte
            {
                return Err(invalid());
            }
        }
        _ if name.starts_with("TEXCOORD_") => {
            if accessor.kind != Kind::Vec2 {
                return Err(invalid());
            }
            if !quantized {
                if component != ComponentType::Float
                    && component != ComponentType::UnsignedByte
                    && component != ComponentType::UnsignedShort
                {
                    return Err(invalid());
                }
            } else if component == ComponentType::Double || component == ComponentType::UnsignedInt
            {
                return Err(invalid());
            }
        }
        _ if name.starts_with("COLOR_") => {
            if accessor.kind != Kind::Vec3 && accessor.kind != Kind::Vec4 {
                return Err(invalid());
            }
            if component != ComponentType::Float
                && component != ComponentType::UnsignedByte
                && component != ComponentType::UnsignedShort
            {
                return Err(invalid());
            }
        }
        _ if name.starts_with("JOINTS_") => {
            if accessor.kind != Kind::Vec4 {
                return Err(invalid());
            }
            if component != ComponentType::UnsignedByte && component != ComponentType::UnsignedShort
            {
                return Err(invalid());
            }
        }
        _ if name.starts_with("WEIGHTS_") => {
            if accessor.kind != Kind::Vec4 {
                return Err(invalid());
            }
            if component != ComponentType::Float
                && component != ComponentType::UnsignedByte
                && component != ComponentType::UnsignedShort
            {
                return Err(invalid());
            }
        }
        _ if name.starts_with('_') => {
            // Application-specific semantics may use any shape but never an
            // unsigned int component type.
            if component == ComponentType::UnsignedInt {
                return Err(invalid());
            }
        }
        // Anything else is not a semantic the format accepts.
        _ => return Err(invalid()),
    }
    Ok(())
}

fn validate_nodes(asset: &Asset) -> Result<()> {
    for node in &asset.nodes {
        if let Some(camera) = node.camera {
            if camera >= asset.cameras.len() {
                return Err(invalid());
            }
        }
        if let Some(skin) = node.skin {
            if skin >= asset.skins.len() {
                return Err(invalid());
            }
        }
        if let Some(mesh) = node.mesh {
            if mesh >= asset.meshes.len() {
                return Err(invalid());
            }
        }
        if let Some(light) = node.light {
            if light >= asset.lights.len() {
                return Err(invalid());
            }
        }
        for &child in &node.children {
            if child >= asset.nodes.len() {
                return Err(invalid());
            }
        }

        if let Transform::Trs { rotation, .. } = node.transform {
            for component in rotation.to_array() {
                if !(-1.0..=1.0).contains(&component) {
                    return Err(invalid());
                }
            }
        }

        if (node.skin.is_some() || !node.weights.is_empty()) && node.mesh.is_none() {
            return Err(invalid());
        }

        if node.skin.is_some() {
            // A skinned mesh needs JOINTS_0 and WEIGHTS_0 on every primitive.
            let mesh = &asset.meshes[node.mesh.ok_or_else(invalid)?];
            for primitive in &mesh.primitives {
                if primitive.find_attribute("JOINTS_0").is_none()
                    || primitive.find_attribute("WEIGHTS_0").is_none()
                {
                    return Err(invalid());
                }
            }
        }
    }
    Ok(())
}

fn validate_samplers(asset: &Asset) -> Result<()> {
    for sampler in &asset.samplers {
        if let Some(filter) = sampler.mag_filter {
            if filter != graft_core::Filter::Nearest && filter != graft_core::Filter::Linear {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

fn validate_scenes(asset: &Asset) -> Result<()> {
    for scene in &asset.scenes {
        for &node in &scene.nodes {
            if node >= asset.nodes.len() {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

fn validate_skins(asset: &Asset) -> Result<()> {
    for skin in &asset.skins {
        if skin.joints.is_empty() {
            return Err(invalid());
        }
        for &joint in &skin.joints {
            if joint >= asset.nodes.len() {
                return Err(invalid());
            }
        }
        if let Some(skeleton) = skin.skeleton {
            if skeleton >= asset.nodes.len() {
                return Err(invalid());
            }
        }
        if let Some(matrices) = skin.inverse_bind_matrices {
            if matrices >= asset.accessors.len() {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

fn validate_textures(asset: &Asset) -> Result<()> {
    let container_extensions = asset.uses_extension("KHR_texture_basisu")
        || asset.uses_extension("MSFT_texture_dds")
        || asset.uses_extension("EXT_texture_webp");

    for texture in &asset.textures {
        if let Some(sampler) = texture.sampler {
            if sampler >= asset.samplers.len() {
                return Err(invalid());
            }
        }

        // An image must resolve somewhere, unless a container extension
        // supplies an alternate source.
        if container_extensions {
            if texture.image.is_none()
                && texture.basisu_image.is_none()
                && texture.dds_image.is_none()
                && texture.webp_image.is_none()
            {
                return Err(invalid());
            }
        } else if texture.image.is_none() {
            return Err(invalid());
        }

        for image in [
            texture.image,
            texture.basisu_image,
            texture.dds_image,
            texture.webp_image,
        ]
        .into_iter()
        .flatten()
        {
            if image >= asset.images.len() {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::{
        Accessor, AccessorKind, Animation, AnimationChannel, AnimationPath, AnimationSampler,
        Buffer, Light, Mesh, Primitive, Skin,
    };
    use smallvec::smallvec;

    fn float_accessor(kind: AccessorKind, count: usize) -> Accessor {
        Accessor {
            buffer_view: None,
            byte_offset: 0,
            component_type: ComponentType::Float,
            kind,
            count,
            normalized: false,
            min: None,
            max: None,
            sparse: None,
            name: None,
        }
    }

    fn position_primitive(component_type: ComponentType) -> Asset {
        let mut accessor = float_accessor(AccessorKind::Vec3, 3);
        accessor.component_type = component_type;
        accessor.min = Some(AccessorBounds::Floats(smallvec![0.0, 0.0, 0.0]));
        accessor.max = Some(AccessorBounds::Floats(smallvec![1.0, 1.0, 1.0]));

        let mut primitive = Primitive::default();
        primitive.attributes.insert("POSITION".to_string(), 0);

        Asset {
            accessors: vec![accessor],
            meshes: vec![Mesh {
                primitives: vec![primitive],
                ..Mesh::default()
            }],
            ..Asset::default()
        }
    }

    #[test]
    fn empty_asset_is_valid() {
        assert!(validate(&Asset::default()).is_ok());
    }

    #[test]
    fn zero_count_accessor_fails() {
        let asset = Asset {
            accessors: vec![float_accessor(AccessorKind::Scalar, 0)],
            ..Asset::default()
        };
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }

    #[test]
    fn required_extensions_must_be_declared_used() {
        let asset = Asset {
            extensions_used: vec!["KHR_lights_punctual".to_string()],
            extensions_required: vec!["KHR_texture_transform".to_string()],
            ..Asset::default()
        };
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));

        let asset = Asset {
            extensions_used: vec!["KHR_texture_transform".to_string()],
            extensions_required: vec!["KHR_texture_transform".to_string()],
            ..Asset::default()
        };
        assert!(validate(&asset).is_ok());
    }

    #[test]
    fn quantized_position_needs_the_extension() {
        let asset = position_primitive(ComponentType::UnsignedByte);
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));

        let mut asset = position_primitive(ComponentType::UnsignedByte);
        asset.extensions_used.push("KHR_mesh_quantization".to_string());
        assert!(validate(&asset).is_ok());

        // Unsigned int positions stay invalid even when quantized.
        let mut asset = position_primitive(ComponentType::UnsignedInt);
        asset.extensions_used.push("KHR_mesh_quantization".to_string());
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }

    #[test]
    fn position_requires_bounds() {
        let mut asset = position_primitive(ComponentType::Float);
        assert!(validate(&asset).is_ok());
        asset.accessors[0].min = None;
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }

    #[test]
    fn misaligned_accessor_offset_fails() {
        let mut accessor = float_accessor(AccessorKind::Scalar, 1);
        accessor.byte_offset = 2; // not a multiple of 4
        let asset = Asset {
            accessors: vec![accessor],
            ..Asset::default()
        };
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }

    #[test]
    fn duplicate_animation_targets_fail() {
        let channel = AnimationChannel {
            sampler: 0,
            node: Some(0),
            path: AnimationPath::Rotation,
        };
        let asset = Asset {
            accessors: vec![float_accessor(AccessorKind::Scalar, 2)],
            animations: vec![Animation {
                channels: vec![channel.clone(), channel],
                samplers: vec![AnimationSampler {
                    input: 0,
                    output: 0,
                    interpolation: Interpolation::Linear,
                }],
                ..Animation::default()
            }],
            nodes: vec![graft_core::Node::default()],
            ..Asset::default()
        };
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }

    #[test]
    fn cubic_spline_count_rule() {
        let mut asset = Asset {
            accessors: vec![
                float_accessor(AccessorKind::Scalar, 2),
                float_accessor(AccessorKind::Vec3, 6),
            ],
            animations: vec![Animation {
                channels: vec![AnimationChannel {
                    sampler: 0,
                    node: Some(0),
                    path: AnimationPath::Translation,
                }],
                samplers: vec![AnimationSampler {
                    input: 0,
                    output: 1,
                    interpolation: Interpolation::CubicSpline,
                }],
                ..Animation::default()
            }],
            nodes: vec![graft_core::Node::default()],
            ..Asset::default()
        };
        assert!(validate(&asset).is_ok());

        asset.accessors[1].count = 5;
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }

    #[test]
    fn directional_light_with_range_fails() {
        let asset = Asset {
            lights: vec![Light {
                kind: LightType::Directional,
                color: [1.0; 3],
                intensity: 1.0,
                range: Some(10.0),
                inner_cone_angle: None,
                outer_cone_angle: None,
                name: None,
            }],
            ..Asset::default()
        };
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }

    #[test]
    fn skinned_node_without_mesh_fails() {
        let asset = Asset {
            nodes: vec![graft_core::Node {
                skin: Some(0),
                ..graft_core::Node::default()
            }],
            skins: vec![Skin {
                joints: vec![0],
                ..Skin::default()
            }],
            ..Asset::default()
        };
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }

    #[test]
    fn material_extension_record_requires_declaration() {
        let mut asset = Asset {
            materials: vec![graft_core::Material {
                clearcoat: Some(Box::default()),
                ..graft_core::Material::default()
            }],
            ..Asset::default()
        };
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));

        asset
            .extensions_used
            .push("KHR_materials_clearcoat".to_string());
        assert!(validate(&asset).is_ok());
    }

    #[test]
    fn zero_length_buffer_fails() {
        let asset = Asset {
            buffers: vec![Buffer::default()],
            ..Asset::default()
        };
        assert_eq!(validate(&asset), Err(GltfError::InvalidGltf));
    }
}
