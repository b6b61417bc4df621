//! Buffers, buffer views and the data-source union.

/// MIME type tag attached to binary payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MimeType {
    #[default]
    None,
    Jpeg,
    Png,
    Ktx2,
    Dds,
    /// `application/gltf-buffer`
    GltfBuffer,
    /// `application/octet-stream`
    OctetStream,
}

impl MimeType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "image/jpeg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/ktx2" => Self::Ktx2,
            "image/vnd-ms.dds" => Self::Dds,
            "application/gltf-buffer" => Self::GltfBuffer,
            "application/octet-stream" => Self::OctetStream,
            _ => Self::None,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Jpeg => Some("image/jpeg"),
            Self::Png => Some("image/png"),
            Self::Ktx2 => Some("image/ktx2"),
            Self::Dds => Some("image/vnd-ms.dds"),
            Self::GltfBuffer => Some("application/gltf-buffer"),
            Self::OctetStream => Some("application/octet-stream"),
        }
    }
}

/// Where the bytes of a buffer or image come from.
///
/// Exactly one origin holds per entity once parsing has finished; `Empty`
/// surviving a parse is an error in the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DataSource {
    /// No origin resolved (the initial state).
    #[default]
    Empty,
    /// Bytes owned in memory, e.g. a decoded data URI or the GLB binary chunk.
    Bytes { bytes: Vec<u8>, mime: MimeType },
    /// A window into another buffer (images embedded in GLB containers).
    BufferView { view: usize, mime: MimeType },
    /// An external resource that was not loaded eagerly.
    Uri {
        uri: String,
        byte_offset: usize,
        mime: MimeType,
    },
    /// Bytes placed into caller-owned memory through the buffer map/unmap
    /// callbacks; `id` is the caller's handle.
    Custom { id: u64, mime: MimeType },
    /// A buffer declared with no retrievable bytes, used by compression
    /// schemes that provide a fallback path (`EXT_meshopt_compression`).
    Fallback,
}

impl DataSource {
    /// Whether the source owns its bytes in memory.
    pub fn is_bytes(&self) -> bool {
        matches!(self, Self::Bytes { .. })
    }
}

/// A chunk of raw binary data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buffer {
    pub byte_length: usize,
    pub data: DataSource,
    pub name: Option<String>,
}

/// Intended GPU binding point for a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// `ARRAY_BUFFER` (34962), vertex data.
    ArrayBuffer,
    /// `ELEMENT_ARRAY_BUFFER` (34963), index data.
    ElementArrayBuffer,
}

impl BufferTarget {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            34962 => Some(Self::ArrayBuffer),
            34963 => Some(Self::ElementArrayBuffer),
            _ => None,
        }
    }

    pub fn gl_code(self) -> u32 {
        match self {
            Self::ArrayBuffer => 34962,
            Self::ElementArrayBuffer => 34963,
        }
    }
}

/// Compression mode of an `EXT_meshopt_compression` buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    Attributes,
    Triangles,
    Indices,
}

impl CompressionMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ATTRIBUTES" => Some(Self::Attributes),
            "TRIANGLES" => Some(Self::Triangles),
            "INDICES" => Some(Self::Indices),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Attributes => "ATTRIBUTES",
            Self::Triangles => "TRIANGLES",
            Self::Indices => "INDICES",
        }
    }
}

/// Post-decompression filter of an `EXT_meshopt_compression` buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionFilter {
    #[default]
    None,
    Octahedral,
    Quaternion,
    Exponential,
}

impl CompressionFilter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NONE" => Some(Self::None),
            "OCTAHEDRAL" => Some(Self::Octahedral),
            "QUATERNION" => Some(Self::Quaternion),
            "EXPONENTIAL" => Some(Self::Exponential),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Octahedral => "OCTAHEDRAL",
            Self::Quaternion => "QUATERNION",
            Self::Exponential => "EXPONENTIAL",
        }
    }
}

/// The `EXT_meshopt_compression` sub-record of a buffer view.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshoptCompression {
    /// Buffer holding the compressed stream.
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: usize,
    /// Number of elements in the stream.
    pub count: usize,
    pub mode: CompressionMode,
    pub filter: CompressionFilter,
}

/// A byte-range window into a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    /// Distance between vertex attribute starts; only meaningful for vertex
    /// data.
    pub byte_stride: Option<usize>,
    pub target: Option<BufferTarget>,
    /// Exclusively-owned compression sub-record, present only when the
    /// document carries `EXT_meshopt_compression` for this view.
    pub meshopt: Option<Box<MeshoptCompression>>,
    pub name: Option<String>,
}
