//! Asset loading and animation playback.
//!
//! The split matters for testing: `anim` is pure data (specs and playback
//! cursors), `library` owns the GPU textures. Gameplay code holds an
//! `AnimationCatalog` and never touches textures outside of render calls.

mod anim;
mod library;

pub use anim::{Animation, AnimationCatalog, AnimationSpec};
pub use library::{standard_catalog, AssetLibrary, IMAGES_DIR};
