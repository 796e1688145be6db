//! Asset store interface
//!
//! The external importer turns source files into [`MeshAsset`]s (skeleton
//! plus clips) and registers them in the [`AssetLibrary`] under a logical
//! mesh asset path.

pub mod library;
pub mod mesh_asset;

pub use library::AssetLibrary;
pub use mesh_asset::MeshAsset;
