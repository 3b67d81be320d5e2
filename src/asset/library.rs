//! Asset Library - Textures and animation specs
//!
//! Loads every image set the game draws from `assets/images/`. Missing files
//! are reported on stderr and replaced with a flat-color placeholder so the
//! game always comes up, just ugly.

use std::collections::HashMap;

use macroquad::prelude::*;

use super::anim::{AnimationCatalog, AnimationSpec};

/// Directory where image sets are stored
pub const IMAGES_DIR: &str = "assets/images";

/// Animation clips the game plays, keyed by sprite set.
const ANIMATIONS: &[(&str, AnimationSpec)] = &[
    ("player/idle", AnimationSpec::new(4, 6, true)),
    ("player/run", AnimationSpec::new(8, 4, true)),
    ("player/jump", AnimationSpec::new(1, 5, true)),
    ("player/wall_slide", AnimationSpec::new(1, 5, true)),
    ("enemy/idle", AnimationSpec::new(4, 6, true)),
    ("enemy/run", AnimationSpec::new(8, 4, true)),
    ("particle/leaf", AnimationSpec::new(18, 20, false)),
    ("particle/particle", AnimationSpec::new(4, 6, false)),
];

/// Image sets to load: key, file count, placeholder size and color.
const IMAGE_SETS: &[(&str, usize, (u16, u16), Color)] = &[
    ("player/idle", 4, (8, 15), SKYBLUE),
    ("player/run", 8, (8, 15), SKYBLUE),
    ("player/jump", 1, (8, 15), SKYBLUE),
    ("player/wall_slide", 1, (8, 15), SKYBLUE),
    ("enemy/idle", 4, (8, 15), MAROON),
    ("enemy/run", 8, (8, 15), MAROON),
    ("particle/leaf", 18, (4, 4), GREEN),
    ("particle/particle", 4, (4, 4), WHITE),
    ("tiles/grass", 9, (16, 16), DARKGREEN),
    ("tiles/stone", 9, (16, 16), GRAY),
    ("tiles/decor", 4, (16, 16), LIME),
    ("tiles/large_decor", 3, (32, 32), DARKGREEN),
    ("clouds", 2, (48, 16), LIGHTGRAY),
    ("background", 1, (320, 240), DARKBLUE),
    ("gun", 1, (5, 3), DARKGRAY),
    ("projectile", 1, (3, 2), YELLOW),
];

/// Catalog of every animation clip, independent of texture loading.
pub fn standard_catalog() -> AnimationCatalog {
    AnimationCatalog::from_entries(ANIMATIONS)
}

/// A library of loaded textures plus the animation catalog.
///
/// Every image set the game references is guaranteed present after `load()`:
/// sets that fail to load from disk get placeholder textures instead.
pub struct AssetLibrary {
    images: HashMap<String, Vec<Texture2D>>,
    animations: AnimationCatalog,
    fallback: Texture2D,
}

impl AssetLibrary {
    /// Load every image set, substituting placeholders for missing files.
    pub async fn load() -> Self {
        let mut images = HashMap::new();
        let mut missing = 0usize;

        for &(key, count, (w, h), color) in IMAGE_SETS {
            let mut set = Vec::with_capacity(count);
            for index in 0..count {
                let path = if count == 1 {
                    format!("{}/{}.png", IMAGES_DIR, key)
                } else {
                    format!("{}/{}/{}.png", IMAGES_DIR, key, index)
                };
                let texture = match load_texture(&path).await {
                    Ok(texture) => texture,
                    Err(err) => {
                        eprintln!("Failed to load {}: {}", path, err);
                        missing += 1;
                        placeholder(w, h, color)
                    }
                };
                texture.set_filter(FilterMode::Nearest);
                set.push(texture);
            }
            images.insert(key.to_string(), set);
        }

        if missing > 0 {
            println!(
                "Asset library loaded with {} placeholder texture(s)",
                missing
            );
        } else {
            println!("Asset library loaded");
        }

        Self {
            images,
            animations: standard_catalog(),
            fallback: placeholder(8, 8, MAGENTA),
        }
    }

    /// Look up one image of a set. Unknown keys and out-of-range indices
    /// yield the fallback texture.
    pub fn image(&self, key: &str, index: usize) -> &Texture2D {
        self.images
            .get(key)
            .and_then(|set| set.get(index))
            .unwrap_or(&self.fallback)
    }

    /// Number of images in a set, zero for unknown keys.
    pub fn image_count(&self, key: &str) -> usize {
        self.images.get(key).map_or(0, |set| set.len())
    }

    pub fn animations(&self) -> &AnimationCatalog {
        &self.animations
    }
}

fn placeholder(w: u16, h: u16, color: Color) -> Texture2D {
    let image = Image::gen_image_color(w, h, color);
    let texture = Texture2D::from_image(&image);
    texture.set_filter(FilterMode::Nearest);
    texture
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_has_every_animated_set() {
        let catalog = standard_catalog();
        for (key, _) in ANIMATIONS {
            assert!(catalog.contains(key), "missing clip {}", key);
        }
    }

    #[test]
    fn test_leaf_clip_is_one_shot() {
        let catalog = standard_catalog();
        let spec = catalog.spec("particle/leaf");
        assert!(!spec.looped);
        assert_eq!(spec.frames, 18);
        assert_eq!(spec.frame_duration, 20);
    }

    #[test]
    fn test_every_animation_has_an_image_set() {
        for (anim_key, spec) in ANIMATIONS {
            let set = IMAGE_SETS
                .iter()
                .find(|(key, ..)| key == anim_key)
                .unwrap_or_else(|| panic!("no image set for {}", anim_key));
            assert_eq!(set.1, spec.frames, "image count mismatch for {}", anim_key);
        }
    }
}
