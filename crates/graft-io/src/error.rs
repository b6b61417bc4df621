//! Error types for graft-io.

use thiserror::Error;

/// Result type for graft-io operations.
pub type Result<T> = std::result::Result<T, GltfError>;

/// Errors that can occur while reading, validating or writing a glTF asset.
///
/// Every entry point communicates exactly one failure; errors are never
/// aggregated. A missing optional field is not an error, it resolves to the
/// documented default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GltfError {
    /// The base directory passed for resolving external files is invalid.
    #[error("the directory for external files is invalid")]
    InvalidPath,

    /// One or more extensions are required by the document but not enabled
    /// on the parser.
    #[error("a required extension is not enabled")]
    MissingExtensions,

    /// An extension required by the document is not known to graft.
    #[error("a required extension is not supported")]
    UnknownRequiredExtension,

    /// The JSON text could not be tokenized.
    #[error("the JSON is malformed")]
    InvalidJson,

    /// The document is missing something or carries invalid data. Also the
    /// code for every semantic rule the validator enforces.
    #[error("the glTF is missing something or has invalid data")]
    InvalidGltf,

    /// The `asset` member is missing or invalid.
    #[error("the asset member is missing or invalid")]
    InvalidOrMissingAssetField,

    /// The GLB container is invalid.
    #[error("the GLB container is invalid")]
    InvalidGlb,

    /// An external buffer was not found while eager loading was requested.
    #[error("an external buffer was not found")]
    MissingExternalBuffer,

    /// The document or container version is not supported.
    #[error("the glTF version is not supported")]
    UnsupportedVersion,

    /// A buffer or image URI failed to parse.
    #[error("a resource URI failed to parse")]
    InvalidUri,

    /// The input is neither a glTF JSON document nor a GLB container.
    #[error("the file data is invalid or its type could not be determined")]
    InvalidFileData,

    /// The file-writing helper failed to materialize an output file.
    #[error("failed writing output files")]
    FailedWritingFiles,
}
