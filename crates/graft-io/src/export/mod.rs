//! The glTF exporter.
//!
//! Mirrors the parser in reverse: an [`Asset`] is serialized to a JSON
//! document and/or packed into a GLB container. The exporter itself never
//! touches the filesystem; externalized buffers and images come back as
//! planned relative paths, parallel-indexed to the asset's lists, and the
//! thin [`GltfExporter::export_json_to_file`]/[`GltfExporter::export_glb_to_file`]
//! helpers materialize them.

mod sections;
mod writer;

pub use writer::pretty_print_json;

use std::path::{Path, PathBuf};

use graft_core::{Asset, DataSource, MimeType};

use crate::glb::{self, ChunkHeader, GlbHeader};
use crate::options::{ExportOptions, ExtrasWriteHook};
use crate::{validate, GltfError, Result};

use writer::JsonWriter;

/// The product of an export call: the serialized output plus the external
/// file plan. `buffer_paths[i]`/`image_paths[i]` name the relative file the
/// caller must materialize for buffer/image `i`, or `None` when nothing was
/// externalized for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Exported<T> {
    pub output: T,
    pub buffer_paths: Vec<Option<PathBuf>>,
    pub image_paths: Vec<Option<PathBuf>>,
}

/// Serializes [`Asset`] graphs to glTF JSON and GLB.
///
/// Reusable across assets; not meant to be shared between threads.
#[derive(Default)]
pub struct GltfExporter {
    buffer_folder: PathBuf,
    image_folder: PathBuf,
    extras_hook: Option<Box<ExtrasWriteHook>>,

    // Per-call state.
    exporting_binary: bool,
    error: Option<GltfError>,
    buffer_paths: Vec<Option<PathBuf>>,
    image_paths: Vec<Option<PathBuf>>,
}

impl GltfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder prefix for planned external buffer files.
    pub fn set_buffer_folder(&mut self, folder: impl Into<PathBuf>) {
        self.buffer_folder = folder.into();
    }

    /// Folder prefix for planned external image files.
    pub fn set_image_folder(&mut self, folder: impl Into<PathBuf>) {
        self.image_folder = folder.into();
    }

    /// Supply `extras` JSON for entities being written.
    pub fn set_extras_hook(&mut self, hook: Option<Box<ExtrasWriteHook>>) {
        self.extras_hook = hook;
    }

    /// Serialize an asset to a glTF JSON string.
    pub fn export_json(&mut self, asset: &Asset, options: ExportOptions) -> Result<Exported<String>> {
        self.reset(false);

        if options.contains(ExportOptions::VALIDATE_ASSET) {
            validate(asset)?;
        }

        let mut output = self.write_document(asset)?;
        if options.contains(ExportOptions::PRETTY_PRINT_JSON) {
            output = pretty_print_json(&output);
        }

        Ok(Exported {
            output,
            buffer_paths: std::mem::take(&mut self.buffer_paths),
            image_paths: std::mem::take(&mut self.image_paths),
        })
    }

    /// Pack an asset into a GLB byte buffer.
    ///
    /// Buffer 0 is embedded as the binary chunk when its bytes are owned in
    /// memory and fit the container's 32-bit chunk length.
    pub fn export_glb(&mut self, asset: &Asset, options: ExportOptions) -> Result<Exported<Vec<u8>>> {
        self.reset(true);
        if options.contains(ExportOptions::PRETTY_PRINT_JSON) {
            log::debug!("pretty printing is ignored for binary export");
        }

        if options.contains(ExportOptions::VALIDATE_ASSET) {
            validate(asset)?;
        }

        let json = self.write_document(asset)?;

        let embedded = asset.buffers.first().and_then(|buffer| {
            if buffer.byte_length >= u32::MAX as usize {
                return None;
            }
            match &buffer.data {
                DataSource::Bytes { bytes, .. } => {
                    Some(&bytes[..buffer.byte_length.min(bytes.len())])
                }
                _ => None,
            }
        });

        let mut total = GlbHeader::SIZE + ChunkHeader::SIZE + glb::align4(json.len());
        if let Some(payload) = embedded {
            total += ChunkHeader::SIZE + glb::align4(payload.len());
        }
        // The header length field is 32-bit; a stream that cannot state its
        // own size is unrepresentable.
        if total >= u32::MAX as usize {
            return Err(GltfError::InvalidGlb);
        }

        let mut output = Vec::with_capacity(total);
        GlbHeader {
            magic: glb::GLB_MAGIC,
            version: glb::GLB_VERSION,
            length: total as u32,
        }
        .write(&mut output);

        ChunkHeader {
            length: glb::align4(json.len()) as u32,
            kind: glb::CHUNK_KIND_JSON,
        }
        .write(&mut output);
        output.extend_from_slice(json.as_bytes());
        // JSON chunks pad with spaces.
        output.resize(glb::align4(output.len()), b' ');

        if let Some(payload) = embedded {
            ChunkHeader {
                length: glb::align4(payload.len()) as u32,
                kind: glb::CHUNK_KIND_BIN,
            }
            .write(&mut output);
            output.extend_from_slice(payload);
            // Binary chunks pad with zeroes.
            output.resize(glb::align4(output.len()), 0);
        }

        Ok(Exported {
            output,
            buffer_paths: std::mem::take(&mut self.buffer_paths),
            image_paths: std::mem::take(&mut self.image_paths),
        })
    }

    /// Serialize to JSON and materialize the document and its external files
    /// under `target`'s directory.
    pub fn export_json_to_file(
        &mut self,
        asset: &Asset,
        target: &Path,
        options: ExportOptions,
    ) -> Result<()> {
        let exported = self.export_json(asset, options)?;
        let parent = target.parent().map(Path::to_path_buf).unwrap_or_default();
        ensure_dir(&parent)?;
        std::fs::write(target, exported.output).map_err(|_| GltfError::FailedWritingFiles)?;
        write_external_files(asset, &exported.buffer_paths, &exported.image_paths, &parent)
    }

    /// Pack to GLB and materialize the container and its external files
    /// under `target`'s directory.
    pub fn export_glb_to_file(
        &mut self,
        asset: &Asset,
        target: &Path,
        options: ExportOptions,
    ) -> Result<()> {
        let exported = self.export_glb(asset, options)?;
        let parent = target.parent().map(Path::to_path_buf).unwrap_or_default();
        ensure_dir(&parent)?;
        std::fs::write(target, exported.output).map_err(|_| GltfError::FailedWritingFiles)?;
        write_external_files(asset, &exported.buffer_paths, &exported.image_paths, &parent)
    }

    fn reset(&mut self, binary: bool) {
        self.exporting_binary = binary;
        self.error = None;
        self.buffer_paths = Vec::new();
        self.image_paths = Vec::new();
    }

    /// Serialize the whole document, surfacing any sticky serialization
    /// error recorded along the way.
    fn write_document(&mut self, asset: &Asset) -> Result<String> {
        let mut writer = JsonWriter::new();
        writer.begin_object();

        self.write_asset_info(asset, &mut writer);
        self.write_extension_declarations(asset, &mut writer);
        self.write_accessors(asset, &mut writer);
        self.write_animations(asset, &mut writer);
        self.write_buffers(asset, &mut writer);
        self.write_buffer_views(asset, &mut writer);
        self.write_cameras(asset, &mut writer);
        self.write_images(asset, &mut writer);
        self.write_materials(asset, &mut writer);
        self.write_meshes(asset, &mut writer);
        self.write_nodes(asset, &mut writer);
        self.write_samplers(asset, &mut writer);
        self.write_scenes(asset, &mut writer);
        self.write_skins(asset, &mut writer);
        self.write_textures(asset, &mut writer);
        self.write_root_extensions(asset, &mut writer);

        writer.end_object();

        match self.error {
            Some(error) => Err(error),
            None => Ok(writer.finish()),
        }
    }

    /// Record a mid-serialization failure; the first one wins and is
    /// surfaced when the call returns.
    pub(crate) fn record_error(&mut self, error: GltfError) {
        self.error.get_or_insert(error);
    }

    pub(crate) fn write_extras(
        &mut self,
        writer: &mut JsonWriter,
        category: graft_core::Categories,
        index: usize,
    ) {
        if let Some(hook) = self.extras_hook.as_deref() {
            if let Some(extras) = hook(category, index) {
                writer.key("extras");
                writer.raw(&extras);
            }
        }
    }

    /// Relative path planned for an externalized buffer.
    pub(crate) fn buffer_file_path(&self, asset: &Asset, index: usize) -> PathBuf {
        let file_name = match &asset.buffers[index].name {
            Some(name) if !name.is_empty() => format!("{name}.bin"),
            _ => format!("buffer{index}.bin"),
        };
        self.buffer_folder.join(file_name)
    }

    /// Relative path planned for an externalized image.
    pub(crate) fn image_file_path(&self, asset: &Asset, index: usize, mime: MimeType) -> PathBuf {
        let extension = match mime {
            MimeType::Jpeg => ".jpeg",
            MimeType::Png => ".png",
            MimeType::Ktx2 => ".ktx2",
            MimeType::Dds => ".dds",
            _ => ".bin",
        };
        let file_name = match &asset.images[index].name {
            Some(name) if !name.is_empty() => format!("{name}{extension}"),
            _ => format!("image{index}{extension}"),
        };
        self.image_folder.join(file_name)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|_| GltfError::InvalidPath)
}

/// Materialize the planned external buffer/image files next to an exported
/// document.
fn write_external_files(
    asset: &Asset,
    buffer_paths: &[Option<PathBuf>],
    image_paths: &[Option<PathBuf>],
    base: &Path,
) -> Result<()> {
    let entries = buffer_paths
        .iter()
        .enumerate()
        .filter_map(|(index, path)| {
            path.as_ref()
                .map(|path| (path, &asset.buffers[index].data))
        })
        .chain(image_paths.iter().enumerate().filter_map(|(index, path)| {
            path.as_ref().map(|path| (path, &asset.images[index].data))
        }));

    for (path, data) in entries {
        let DataSource::Bytes { bytes, .. } = data else {
            // Only byte-owning sources are ever planned as external files.
            return Err(GltfError::FailedWritingFiles);
        };
        let target = base.join(path);
        if let Some(parent) = target.parent() {
            ensure_dir(parent).map_err(|_| GltfError::FailedWritingFiles)?;
        }
        std::fs::write(&target, bytes).map_err(|_| GltfError::FailedWritingFiles)?;
    }
    Ok(())
}
