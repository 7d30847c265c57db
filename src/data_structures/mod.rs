//! Viewer data structures: models, transforms and GPU textures.
//!
//! - `model` holds the CPU-side mesh and material data parsed from an asset
//! - `transform` holds node/root transforms and their GPU instance layout
//! - `texture` wraps GPU textures (colour maps and depth buffers)

pub mod model;
pub mod texture;
pub mod transform;
