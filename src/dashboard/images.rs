//! Loading of the face images shown for a voter.
//!
//! Each image is handled on its own: an image that cannot be read turns into a
//! placeholder and never stops the rest of the page.

use std::path::{Path, PathBuf};

use image::ImageReader;
use log::{debug, warn};
use url::Url;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ImageTile {
    Loaded { src: String, caption: String },
    Placeholder { path: String, message: String },
}

impl ImageTile {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ImageTile::Loaded { .. })
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Gallery {
    pub tiles: Vec<ImageTile>,
    pub failures: usize,
}

fn resolve(path: &str, root: Option<&Path>) -> PathBuf {
    let p = Path::new(path);
    match root {
        Some(r) if p.is_relative() => r.join(p),
        _ => p.to_path_buf(),
    }
}

/// Decodes the whole image, so that truncated or corrupt files are rejected.
/// Returns the `file://` URL of the image.
fn check_image(p: &Path) -> Result<String, String> {
    let canonical = p.canonicalize().map_err(|e| e.to_string())?;
    let img = ImageReader::open(&canonical)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())?;
    debug!(
        "check_image: {:?}: {}x{}",
        canonical,
        img.width(),
        img.height()
    );
    Url::from_file_path(&canonical)
        .map(|u| u.to_string())
        .map_err(|_| format!("cannot build a URL for {}", canonical.display()))
}

/// Prepares one image for display. `index` starts at 0.
pub fn render_image(path: &str, root: Option<&Path>, index: usize) -> ImageTile {
    let caption = format!("Image {}", index + 1);
    if path.starts_with("http://") || path.starts_with("https://") {
        // Remote images are left to the browser.
        return ImageTile::Loaded {
            src: path.to_string(),
            caption,
        };
    }
    if path.trim().is_empty() {
        return ImageTile::Placeholder {
            path: path.to_string(),
            message: "no image path".to_string(),
        };
    }
    match check_image(&resolve(path, root)) {
        Ok(src) => ImageTile::Loaded { src, caption },
        Err(message) => ImageTile::Placeholder {
            path: path.to_string(),
            message,
        },
    }
}

pub fn render_gallery<'a>(paths: impl IntoIterator<Item = &'a str>, root: Option<&Path>) -> Gallery {
    let tiles: Vec<ImageTile> = paths
        .into_iter()
        .enumerate()
        .map(|(idx, p)| render_image(p, root, idx))
        .collect();
    let failures = tiles.iter().filter(|t| !t.is_loaded()).count();
    for t in tiles.iter() {
        if let ImageTile::Placeholder { path, message } = t {
            warn!("Cannot load image {:?}: {}", path, message);
        }
    }
    Gallery { tiles, failures }
}
