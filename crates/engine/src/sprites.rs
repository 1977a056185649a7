use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{ImageReader, RgbaImage};
use thiserror::Error;
use tracing::{debug, warn};

/// Sprite keys double as override file stems, so they stay flat
/// snake_case identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key is empty")]
    Empty,
    #[error("sprite key '{key}' is longer than {max} characters", max = MAX_SPRITE_KEY_LEN)]
    TooLong { key: String },
    #[error("sprite key '{key}' must start with a lowercase letter")]
    BadLeadingChar { key: String },
    #[error("sprite key '{key}' has '{character}' at {index}; use a-z, 0-9 and '_'")]
    InvalidCharacter {
        key: String,
        character: char,
        index: usize,
    },
}

const MAX_SPRITE_KEY_LEN: usize = 48;

/// Hands out ready-to-draw raster images by symbolic key.
pub trait SpriteProvider {
    fn sprite(&self, key: &str) -> Option<&RgbaImage>;
}

/// Keyed sprite registry. Images are registered in code and may be
/// replaced by `<key>.png` files from an override directory.
#[derive(Debug, Default)]
pub struct SpriteAtlas {
    sprites: HashMap<String, RgbaImage>,
}

impl SpriteAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, image: RgbaImage) -> Result<(), SpriteKeyError> {
        validate_sprite_key(key)?;
        self.sprites.insert(key.to_string(), image);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sprites.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Swaps in `<dir>/<key>.png` for every registered key that has one.
    /// Unreadable files keep the registered image. Returns the number of
    /// sprites replaced.
    pub fn apply_overrides(&mut self, dir: &Path) -> usize {
        let mut replaced = 0;
        for (key, image) in self.sprites.iter_mut() {
            let path = override_path(dir, key);
            if !path.is_file() {
                continue;
            }
            match load_sprite_rgba(&path) {
                Ok(loaded) => {
                    debug!(sprite_key = %key, path = %path.display(), "sprite_override_loaded");
                    *image = loaded;
                    replaced += 1;
                }
                Err(reason) => {
                    warn!(
                        sprite_key = %key,
                        path = %path.display(),
                        reason = %reason,
                        "sprite_override_failed_keeping_builtin"
                    );
                }
            }
        }
        replaced
    }
}

impl SpriteProvider for SpriteAtlas {
    fn sprite(&self, key: &str) -> Option<&RgbaImage> {
        self.sprites.get(key)
    }
}

pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    let Some(first) = key.chars().next() else {
        return Err(SpriteKeyError::Empty);
    };
    if key.len() > MAX_SPRITE_KEY_LEN {
        return Err(SpriteKeyError::TooLong { key: key.to_string() });
    }
    if !first.is_ascii_lowercase() {
        return Err(SpriteKeyError::BadLeadingChar { key: key.to_string() });
    }
    match key
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '_'))
    {
        Some((index, character)) => Err(SpriteKeyError::InvalidCharacter {
            key: key.to_string(),
            character,
            index,
        }),
        None => Ok(()),
    }
}

fn override_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.png"))
}

fn load_sprite_rgba(path: &Path) -> Result<RgbaImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    Ok(decoded.to_rgba8())
}
