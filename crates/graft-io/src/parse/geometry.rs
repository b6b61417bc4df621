//! Section parsers for buffers, buffer views, accessors, images and meshes,
//! plus buffer/image data resolution and index synthesis.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use smallvec::SmallVec;

use graft_core::{
    Accessor, AccessorBounds, AccessorKind, Buffer, BufferTarget, BufferView, Categories,
    ComponentType, CompressionFilter, CompressionMode, DataSource, Image, Mesh,
    MeshoptCompression, MimeType, Primitive, PrimitiveMode,
};

use crate::hash::{hash_str, keys};
use crate::options::{Extensions, ParseOptions};
use crate::uri::Uri;
use crate::{GltfError, Result};

use super::json::*;
use super::Walker;

impl Walker<'_> {
    pub(crate) fn parse_accessors(&mut self, values: &[Value]) -> Result<()> {
        self.asset.accessors.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;

            let component_type = ComponentType::from_gl(require(u64_field(obj, "componentType")?)?)
                .ok_or(GltfError::InvalidGltf)?;
            if component_type == ComponentType::Double
                && !self.options.contains(ParseOptions::ALLOW_DOUBLE)
                && !self.cfg.extensions().contains(Extensions::KHR_ACCESSOR_FLOAT64)
            {
                return Err(GltfError::InvalidGltf);
            }
            let kind = AccessorKind::from_name(require(str_field(obj, "type")?)?)
                .ok_or(GltfError::InvalidGltf)?;

            let accessor = Accessor {
                buffer_view: usize_field(obj, "bufferView")?,
                byte_offset: usize_field(obj, "byteOffset")?.unwrap_or(0),
                component_type,
                kind,
                count: require(usize_field(obj, "count")?)?,
                normalized: bool_field(obj, "normalized")?.unwrap_or(false),
                min: parse_bounds(obj, "min", component_type)?,
                max: parse_bounds(obj, "max", component_type)?,
                sparse: self.parse_sparse(obj)?,
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::ACCESSORS, self.asset.accessors.len(), obj);
            self.asset.accessors.push(accessor);
        }
        Ok(())
    }

    fn parse_sparse(&mut self, obj: &JsonObject) -> Result<Option<graft_core::SparseAccessor>> {
        let Some(sparse) = object_field(obj, "sparse")? else {
            return Ok(None);
        };

        let indices = require(object_field(sparse, "indices")?)?;
        let values = require(object_field(sparse, "values")?)?;
        let index_component_type =
            ComponentType::from_gl(require(u64_field(indices, "componentType")?)?)
                .ok_or(GltfError::InvalidGltf)?;

        Ok(Some(graft_core::SparseAccessor {
            count: require(usize_field(sparse, "count")?)?,
            indices_view: require(usize_field(indices, "bufferView")?)?,
            indices_offset: usize_field(indices, "byteOffset")?.unwrap_or(0),
            index_component_type,
            values_view: require(usize_field(values, "bufferView")?)?,
            values_offset: usize_field(values, "byteOffset")?.unwrap_or(0),
        }))
    }

    pub(crate) fn parse_buffer_views(&mut self, values: &[Value]) -> Result<()> {
        self.asset.buffer_views.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;

            let target = match u64_field(obj, "target")? {
                Some(code) => Some(BufferTarget::from_gl(code).ok_or(GltfError::InvalidGltf)?),
                None => None,
            };

            let mut meshopt = None;
            if let Some(extensions) = object_field(obj, "extensions")? {
                for (key, ext_value) in extensions {
                    match hash_str(key) {
                        keys::EXT_MESHOPT_COMPRESSION if key == "EXT_meshopt_compression" => {
                            if self
                                .cfg
                                .extensions()
                                .contains(Extensions::EXT_MESHOPT_COMPRESSION)
                            {
                                meshopt = Some(Box::new(parse_meshopt(as_object(ext_value)?)?));
                            }
                        }
                        _ => {
                            log::debug!("skipping buffer view extension {key:?}");
                        }
                    }
                }
            }

            let view = BufferView {
                buffer: require(usize_field(obj, "buffer")?)?,
                byte_offset: usize_field(obj, "byteOffset")?.unwrap_or(0),
                byte_length: require(usize_field(obj, "byteLength")?)?,
                byte_stride: usize_field(obj, "byteStride")?,
                target,
                meshopt,
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::BUFFER_VIEWS, self.asset.buffer_views.len(), obj);
            self.asset.buffer_views.push(view);
        }
        Ok(())
    }

    pub(crate) fn parse_buffers(&mut self, values: &[Value]) -> Result<()> {
        self.asset.buffers.reserve(values.len());
        for (index, value) in values.iter().enumerate() {
            let obj = as_object(value)?;
            let byte_length = require(usize_field(obj, "byteLength")?)?;

            let data = if let Some(uri) = str_field(obj, "uri")? {
                self.resolve_uri_source(uri, MimeType::GltfBuffer, ParseOptions::LOAD_EXTERNAL_BUFFERS)?
            } else if index == 0 && self.glb_buffer.is_some() {
                // Buffer 0 of a GLB container without a URI is the embedded
                // binary chunk.
                self.glb_buffer.take().unwrap_or_default()
            } else if self.buffer_is_meshopt_fallback(obj)? {
                DataSource::Fallback
            } else {
                return Err(GltfError::InvalidGltf);
            };

            let buffer = Buffer {
                byte_length,
                data,
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::BUFFERS, self.asset.buffers.len(), obj);
            self.asset.buffers.push(buffer);
        }
        Ok(())
    }

    fn buffer_is_meshopt_fallback(&self, obj: &JsonObject) -> Result<bool> {
        if !self
            .cfg
            .extensions()
            .contains(Extensions::EXT_MESHOPT_COMPRESSION)
        {
            return Ok(false);
        }
        let Some(extensions) = object_field(obj, "extensions")? else {
            return Ok(false);
        };
        let Some(compression) = object_field(extensions, "EXT_meshopt_compression")? else {
            return Ok(false);
        };
        Ok(bool_field(compression, "fallback")?.unwrap_or(false))
    }

    pub(crate) fn parse_images(&mut self, values: &[Value]) -> Result<()> {
        self.asset.images.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;
            let mime = str_field(obj, "mimeType")?
                .map(MimeType::from_name)
                .unwrap_or(MimeType::None);

            let data = if let Some(uri) = str_field(obj, "uri")? {
                self.resolve_uri_source(uri, mime, ParseOptions::LOAD_EXTERNAL_IMAGES)?
            } else if let Some(view) = usize_field(obj, "bufferView")? {
                DataSource::BufferView { view, mime }
            } else {
                return Err(GltfError::InvalidGltf);
            };

            let image = Image {
                data,
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::IMAGES, self.asset.images.len(), obj);
            self.asset.images.push(image);
        }
        Ok(())
    }

    /// Resolve a `uri` field into a data source.
    ///
    /// Data URIs decode immediately; local files load eagerly only under the
    /// given option, and otherwise stay as lazy URI references.
    fn resolve_uri_source(
        &mut self,
        uri: &str,
        default_mime: MimeType,
        load_option: ParseOptions,
    ) -> Result<DataSource> {
        let uri = Uri::parse(uri);
        if !uri.valid() {
            return Err(GltfError::InvalidUri);
        }

        if uri.is_data_uri() {
            return self.decode_data_uri(&uri);
        }

        if uri.is_local_path() && self.options.contains(load_option) {
            let path = match self.base_dir {
                Some(dir) => dir.join(uri.path()),
                None => uri.path().into(),
            };
            let bytes = std::fs::read(&path).map_err(|_| GltfError::MissingExternalBuffer)?;
            return Ok(DataSource::Bytes {
                bytes,
                mime: default_mime,
            });
        }

        Ok(DataSource::Uri {
            uri: uri.as_str().to_owned(),
            byte_offset: 0,
            mime: default_mime,
        })
    }

    /// Decode a base64 data URI, through the buffer mapper when one is set.
    fn decode_data_uri(&mut self, uri: &Uri) -> Result<DataSource> {
        let (media_type, is_base64, payload) = uri.data_parts().ok_or(GltfError::InvalidUri)?;
        if !is_base64 {
            return Err(GltfError::InvalidUri);
        }
        let mime = MimeType::from_name(media_type);

        let padding = payload.bytes().rev().take_while(|&b| b == b'=').count();
        let decoded_len = ((payload.len() / 4) * 3).saturating_sub(padding);

        if let Some(mapper) = self.cfg.buffer_mapper.as_mut() {
            if let Some(mapped) = mapper.map(decoded_len) {
                let id = mapped.id;
                if mapped.bytes.len() >= decoded_len {
                    let result = match self.cfg.base64_decoder.as_deref() {
                        Some(decode) => decode(payload, &mut mapped.bytes[..decoded_len]),
                        None => BASE64
                            .decode_slice(payload, mapped.bytes)
                            .map(|_| ())
                            .map_err(|_| GltfError::InvalidUri),
                    };
                    // The mapped scope is closed immediately after the
                    // decode writes, error or not.
                    mapper.unmap(id);
                    result?;
                    return Ok(DataSource::Custom { id, mime });
                }
                mapper.unmap(id);
            }
        }

        let bytes = match self.cfg.base64_decoder.as_deref() {
            Some(decode) => {
                let mut bytes = vec![0u8; decoded_len];
                decode(payload, &mut bytes)?;
                bytes
            }
            None => BASE64.decode(payload).map_err(|_| GltfError::InvalidUri)?,
        };
        Ok(DataSource::Bytes { bytes, mime })
    }

    pub(crate) fn parse_meshes(&mut self, values: &[Value]) -> Result<()> {
        self.asset.meshes.reserve(values.len());
        for value in values {
            let obj = as_object(value)?;

            let mut primitives = Vec::new();
            for primitive in require(array_field(obj, "primitives")?)? {
                primitives.push(self.parse_primitive(as_object(primitive)?)?);
            }

            let mesh = Mesh {
                primitives,
                weights: f32_list_field(obj, "weights")?.unwrap_or_default(),
                name: string_field(obj, "name")?,
            };

            self.extras(Categories::MESHES, self.asset.meshes.len(), obj);
            self.asset.meshes.push(mesh);
        }
        Ok(())
    }

    fn parse_primitive(&mut self, obj: &JsonObject) -> Result<Primitive> {
        let mode = match u64_field(obj, "mode")? {
            Some(code) => PrimitiveMode::from_gl(code).ok_or(GltfError::InvalidGltf)?,
            None => PrimitiveMode::Triangles,
        };

        let attributes = parse_attributes(require(object_field(obj, "attributes")?)?)?;

        let mut targets = Vec::new();
        if let Some(target_values) = array_field(obj, "targets")? {
            for target in target_values {
                targets.push(parse_attributes(as_object(target)?)?);
            }
        }

        let mut variant_mappings = Vec::new();
        if let Some(extensions) = object_field(obj, "extensions")? {
            for (key, ext_value) in extensions {
                match hash_str(key) {
                    keys::KHR_MATERIALS_VARIANTS if key == "KHR_materials_variants" => {
                        if self
                            .cfg
                            .extensions()
                            .contains(Extensions::KHR_MATERIALS_VARIANTS)
                        {
                            variant_mappings = parse_variant_mappings(as_object(ext_value)?)?;
                        }
                    }
                    _ => {
                        log::debug!("skipping primitive extension {key:?}");
                    }
                }
            }
        }

        Ok(Primitive {
            attributes,
            targets,
            mode,
            indices: usize_field(obj, "indices")?,
            material: usize_field(obj, "material")?,
            variant_mappings,
        })
    }

    /// Synthesize an index accessor for every primitive without one.
    ///
    /// Each topology has its own primitive-count and index-count formula; the
    /// generated component width is the narrowest unsigned integer that can
    /// represent the index count.
    pub(crate) fn generate_mesh_indices(&mut self) -> Result<()> {
        for mesh_index in 0..self.asset.meshes.len() {
            for primitive_index in 0..self.asset.meshes[mesh_index].primitives.len() {
                let primitive = &self.asset.meshes[mesh_index].primitives[primitive_index];
                if primitive.indices.is_some() {
                    continue;
                }

                let position = primitive
                    .find_attribute("POSITION")
                    .ok_or(GltfError::InvalidGltf)?;
                let position_count = self
                    .asset
                    .accessors
                    .get(position)
                    .ok_or(GltfError::InvalidGltf)?
                    .count;

                let mode = primitive.mode;
                let primitive_count = match mode {
                    PrimitiveMode::Points => position_count,
                    PrimitiveMode::Lines => position_count / 2,
                    PrimitiveMode::LineLoop | PrimitiveMode::LineStrip => {
                        position_count.saturating_sub(1)
                    }
                    PrimitiveMode::Triangles => position_count / 3,
                    PrimitiveMode::TriangleStrip | PrimitiveMode::TriangleFan => {
                        position_count.saturating_sub(2)
                    }
                };
                let index_count = match mode {
                    PrimitiveMode::Points => primitive_count,
                    PrimitiveMode::Lines
                    | PrimitiveMode::LineLoop
                    | PrimitiveMode::LineStrip => primitive_count * 2,
                    PrimitiveMode::Triangles
                    | PrimitiveMode::TriangleStrip
                    | PrimitiveMode::TriangleFan => primitive_count * 3,
                };

                let (bytes, component_type) = write_sequential_indices(index_count);

                let buffer_index = self.asset.buffers.len();
                self.asset.buffers.push(Buffer {
                    byte_length: bytes.len(),
                    data: DataSource::Bytes {
                        bytes,
                        mime: MimeType::GltfBuffer,
                    },
                    name: None,
                });

                let view_index = self.asset.buffer_views.len();
                self.asset.buffer_views.push(BufferView {
                    buffer: buffer_index,
                    byte_offset: 0,
                    byte_length: self.asset.buffers[buffer_index].byte_length,
                    byte_stride: None,
                    target: None,
                    meshopt: None,
                    name: None,
                });

                let accessor_index = self.asset.accessors.len();
                self.asset.accessors.push(Accessor {
                    buffer_view: Some(view_index),
                    byte_offset: 0,
                    component_type,
                    kind: AccessorKind::Scalar,
                    count: index_count,
                    normalized: false,
                    min: None,
                    max: None,
                    sparse: None,
                    name: None,
                });

                self.asset.meshes[mesh_index].primitives[primitive_index].indices =
                    Some(accessor_index);
            }
        }
        Ok(())
    }
}

fn parse_attributes(obj: &JsonObject) -> Result<graft_core::AttributeMap> {
    let mut attributes = graft_core::AttributeMap::with_capacity(obj.len());
    for (name, value) in obj {
        attributes.insert(name.clone(), as_usize(value)?);
    }
    Ok(attributes)
}

fn parse_variant_mappings(obj: &JsonObject) -> Result<Vec<Option<usize>>> {
    let mut mappings: Vec<Option<usize>> = Vec::new();
    if let Some(entries) = array_field(obj, "mappings")? {
        for entry in entries {
            let entry = as_object(entry)?;
            let material = require(usize_field(entry, "material")?)?;
            for variant in require(index_list_field(entry, "variants")?)? {
                if variant >= mappings.len() {
                    mappings.resize(variant + 1, None);
                }
                mappings[variant] = Some(material);
            }
        }
    }
    Ok(mappings)
}

fn parse_meshopt(obj: &JsonObject) -> Result<MeshoptCompression> {
    let mode = CompressionMode::from_name(require(str_field(obj, "mode")?)?)
        .ok_or(GltfError::InvalidGltf)?;
    let filter = match str_field(obj, "filter")? {
        Some(name) => CompressionFilter::from_name(name).ok_or(GltfError::InvalidGltf)?,
        None => CompressionFilter::None,
    };

    Ok(MeshoptCompression {
        buffer: require(usize_field(obj, "buffer")?)?,
        byte_offset: usize_field(obj, "byteOffset")?.unwrap_or(0),
        byte_length: require(usize_field(obj, "byteLength")?)?,
        byte_stride: require(usize_field(obj, "byteStride")?)?,
        count: require(usize_field(obj, "count")?)?,
        mode,
        filter,
    })
}

fn parse_bounds(
    obj: &JsonObject,
    key: &str,
    component_type: ComponentType,
) -> Result<Option<AccessorBounds>> {
    let Some(value) = obj.get(key) else {
        return Ok(None);
    };
    let array = as_array(value)?;

    // The list kind is coupled to the component type: floating-point
    // accessors carry float bounds, integer accessors integer bounds.
    if component_type.is_float() {
        let mut bounds = SmallVec::with_capacity(array.len());
        for item in array {
            bounds.push(item.as_f64().ok_or(GltfError::InvalidGltf)?);
        }
        Ok(Some(AccessorBounds::Floats(bounds)))
    } else {
        let mut bounds = SmallVec::with_capacity(array.len());
        for item in array {
            bounds.push(item.as_i64().ok_or(GltfError::InvalidGltf)?);
        }
        Ok(Some(AccessorBounds::Ints(bounds)))
    }
}

/// Little-endian `0..count` in the narrowest width that holds `count`.
fn write_sequential_indices(count: usize) -> (Vec<u8>, ComponentType) {
    if count < 255 {
        ((0..count).map(|i| i as u8).collect(), ComponentType::UnsignedByte)
    } else if count < 65535 {
        let mut bytes = Vec::with_capacity(count * 2);
        for i in 0..count {
            bytes.extend_from_slice(&(i as u16).to_le_bytes());
        }
        (bytes, ComponentType::UnsignedShort)
    } else {
        let mut bytes = Vec::with_capacity(count * 4);
        for i in 0..count {
            bytes.extend_from_slice(&(i as u32).to_le_bytes());
        }
        (bytes, ComponentType::UnsignedInt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::GltfParser;

    fn parse_all(json: &str) -> Result<graft_core::Asset> {
        GltfParser::new(Extensions::empty()).parse(
            json.as_bytes(),
            None,
            ParseOptions::empty(),
            Categories::ALL,
        )
    }

    #[test]
    fn accessor_fields_and_defaults() {
        let asset = parse_all(
            r#"{
                "asset": {"version": "2.0"},
                "accessors": [{
                    "bufferView": 0,
                    "componentType": 5126,
                    "count": 3,
                    "type": "VEC3",
                    "min": [0.0, 0.0, 0.0],
                    "max": [1.0, 2.0, 3.0]
                }],
                "bufferViews": [{"buffer": 0, "byteLength": 36}],
                "buffers": [{"byteLength": 36, "uri": "data:application/octet-stream;base64,"}]
            }"#,
        )
        .unwrap();

        let accessor = &asset.accessors[0];
        assert_eq!(accessor.component_type, ComponentType::Float);
        assert_eq!(accessor.kind, AccessorKind::Vec3);
        assert_eq!(accessor.byte_offset, 0);
        assert!(!accessor.normalized);
        assert_eq!(
            accessor.max,
            Some(AccessorBounds::Floats(SmallVec::from_slice(&[1.0, 2.0, 3.0])))
        );
    }

    #[test]
    fn double_component_type_is_gated() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "accessors": [{"componentType": 5130, "count": 1, "type": "SCALAR"}]
        }"#;
        assert_eq!(parse_all(json).unwrap_err(), GltfError::InvalidGltf);

        let asset = GltfParser::new(Extensions::empty())
            .parse(
                json.as_bytes(),
                None,
                ParseOptions::ALLOW_DOUBLE,
                Categories::ALL,
            )
            .unwrap();
        assert_eq!(asset.accessors[0].component_type, ComponentType::Double);
    }

    #[test]
    fn integer_bounds_for_integer_accessors() {
        let asset = parse_all(
            r#"{
                "asset": {"version": "2.0"},
                "accessors": [{"componentType": 5123, "count": 4, "type": "SCALAR", "max": [41]}]
            }"#,
        )
        .unwrap();
        assert_eq!(
            asset.accessors[0].max,
            Some(AccessorBounds::Ints(SmallVec::from_slice(&[41])))
        );
    }

    #[test]
    fn data_uri_buffer_decodes() {
        let asset = parse_all(
            r#"{
                "asset": {"version": "2.0"},
                "buffers": [{
                    "byteLength": 5,
                    "uri": "data:application/octet-stream;base64,SGVsbG8="
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(
            asset.buffers[0].data,
            DataSource::Bytes {
                bytes: b"Hello".to_vec(),
                mime: MimeType::OctetStream,
            }
        );
    }

    #[test]
    fn external_buffer_stays_lazy_without_the_option() {
        let asset = parse_all(
            r#"{
                "asset": {"version": "2.0"},
                "buffers": [{"byteLength": 16, "uri": "meshes/terrain.bin"}]
            }"#,
        )
        .unwrap();
        match &asset.buffers[0].data {
            DataSource::Uri { uri, byte_offset, .. } => {
                assert_eq!(uri, "meshes/terrain.bin");
                assert_eq!(*byte_offset, 0);
            }
            other => panic!("expected a lazy URI source, got {other:?}"),
        }
    }

    #[test]
    fn buffer_without_any_source_is_rejected() {
        let error = parse_all(
            r#"{
                "asset": {"version": "2.0"},
                "buffers": [{"byteLength": 16}]
            }"#,
        )
        .unwrap_err();
        assert_eq!(error, GltfError::InvalidGltf);
    }

    #[test]
    fn image_from_buffer_view() {
        let asset = parse_all(
            r#"{
                "asset": {"version": "2.0"},
                "images": [{"bufferView": 2, "mimeType": "image/png"}]
            }"#,
        )
        .unwrap();
        assert_eq!(
            asset.images[0].data,
            DataSource::BufferView {
                view: 2,
                mime: MimeType::Png,
            }
        );
    }

    #[test]
    fn sequential_index_widths() {
        let (bytes, ty) = write_sequential_indices(10);
        assert_eq!(ty, ComponentType::UnsignedByte);
        assert_eq!(bytes, (0u8..10).collect::<Vec<_>>());

        let (bytes, ty) = write_sequential_indices(300);
        assert_eq!(ty, ComponentType::UnsignedShort);
        assert_eq!(bytes.len(), 600);
        assert_eq!(&bytes[..4], &[0, 0, 1, 0]);
        assert_eq!(&bytes[598..], &(299u16.to_le_bytes()));

        let (_, ty) = write_sequential_indices(70000);
        assert_eq!(ty, ComponentType::UnsignedInt);
    }

    #[test]
    fn triangles_primitive_gets_synthesized_indices() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
            "accessors": [{
                "componentType": 5126, "count": 300, "type": "VEC3",
                "min": [0,0,0], "max": [1,1,1]
            }]
        }"#;
        let asset = GltfParser::new(Extensions::empty())
            .parse(
                json.as_bytes(),
                None,
                ParseOptions::GENERATE_MESH_INDICES,
                Categories::ALL,
            )
            .unwrap();

        let indices = asset.meshes[0].primitives[0].indices.unwrap();
        let accessor = &asset.accessors[indices];
        assert_eq!(accessor.count, 300);
        assert_eq!(accessor.component_type, ComponentType::UnsignedShort);
        assert_eq!(accessor.kind, AccessorKind::Scalar);

        let view = &asset.buffer_views[accessor.buffer_view.unwrap()];
        match &asset.buffers[view.buffer].data {
            DataSource::Bytes { bytes, .. } => {
                let values: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                assert_eq!(values, (0u16..300).collect::<Vec<_>>());
            }
            other => panic!("expected in-memory indices, got {other:?}"),
        }
    }
}
