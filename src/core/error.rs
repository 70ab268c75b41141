//! Authoring-time error taxonomy (§7).
//!
//! Degenerate geometry and numerical hazards are *not* errors — they
//! reduce to "no contribution" at render time. Only bad references
//! supplied during scene authoring are rejected here.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthoringError {
    #[error("vertex index {index} out of range (geometry has {len} vertices)")]
    VertexIndexOutOfRange { index: u32, len: usize },

    #[error("texture coordinate index {index} out of range ({len} texcoords present)")]
    TexCoordIndexOutOfRange { index: u32, len: usize },

    #[error("triangle has texture coordinates on some vertices but not all")]
    PartialTextureCoordinates,
}
