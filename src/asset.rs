//! Model loading (§1 "Deliberately OUT OF SCOPE"): the asset loader is
//! an external collaborator. This module specifies only the interface
//! a loader must satisfy to hand meshes and materials to a [`Scene`](crate::scene::Scene).

use crate::core::geometry::Geometry;
use crate::core::material::Material;
use std::sync::Arc;

/// A single named material as read from an asset file, before
/// resolution to a [`Material`] (texture bytes may still need to be
/// loaded separately by the caller).
pub struct MaterialDescriptor {
    pub name: String,
    pub material: Arc<Material>,
    pub texture_path: Option<String>,
}

/// Returned by a successful load: one or more meshes, each already
/// carrying its resolved material, ready to pass to `Scene::add`.
pub struct LoadedAssets {
    pub meshes: Vec<Geometry>,
    pub materials: Vec<MaterialDescriptor>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("malformed asset file {path}: {reason}")]
    Malformed { path: String, reason: String },
    #[error("referenced texture file not found: {path}")]
    MissingTexture { path: String },
}

/// Loads a scene description (3DS-style asset file per §1) from
/// `path`, returning its meshes and materials. A missing texture file
/// is a loader-level concern (§7: "surfaced by the loader"); the
/// renderer itself treats an unset texture as white.
pub trait AssetLoader {
    fn load(&self, path: &str) -> Result<LoadedAssets, AssetError>;
}
