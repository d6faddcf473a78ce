//! Image loading.
//!
//! Turns raw file payloads into [`Raster`]s at their natural pixel size.
//! Decoding is I/O-bound and may block, so besides the direct
//! [`load_image`] call there is [`decode_in_background`], which runs the
//! decode on the rayon pool and hands back a [`PendingDecode`] to wait on.
//!
//! # Example
//!
//! ```ignore
//! use image_compare::decode::{Payload, decode_in_background};
//!
//! let pending = decode_in_background(Payload::from_path("before.png".as_ref())?);
//! // ... do other work ...
//! let reference = pending.wait()?;
//! println!("{}: {}x{}", reference.name, reference.raster.width(), reference.raster.height());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::raster::Raster;

/// Extensions of the raster formats the loader can decode.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff",
];

/// Undecoded image bytes plus the name shown to the user.
#[derive(Debug, Clone)]
pub struct Payload {
    /// Display name, usually the file name.
    pub name: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

impl Payload {
    /// Wrap in-memory bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Read a file; its file name becomes the display name.
    ///
    /// An unreadable file is reported as a decode failure.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = display_name(path);
        let data = fs::read(path).map_err(|e| Error::decode(&name, e))?;
        Ok(Self { name, data })
    }
}

/// A decoded image and its display name.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Display name.
    pub name: String,
    /// Pixels at the image's natural size.
    pub raster: Raster,
}

/// Decode a payload into an RGBA8 raster.
///
/// Any format in [`SUPPORTED_EXTENSIONS`] is accepted; the format is sniffed
/// from the bytes, not the name. Non-RGBA sources are expanded to opaque
/// RGBA8.
pub fn load_image(payload: &Payload) -> Result<LoadedImage> {
    let decoded = image::load_from_memory(&payload.data)
        .map_err(|e| Error::decode(&payload.name, e))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let raster = Raster::from_rgba_bytes(width as usize, height as usize, decoded.as_raw())
        .map_err(|e| Error::decode(&payload.name, e))?;

    tracing::debug!(name = %payload.name, width, height, "decoded image");

    Ok(LoadedImage {
        name: payload.name.clone(),
        raster,
    })
}

/// Read and decode a file.
pub fn load_path(path: &Path) -> Result<LoadedImage> {
    load_image(&Payload::from_path(path)?)
}

/// Decode many payloads in parallel, keeping input order.
pub fn load_many(payloads: &[Payload]) -> Vec<Result<LoadedImage>> {
    payloads.par_iter().map(load_image).collect()
}

/// Handle to a decode running on the rayon pool.
#[derive(Debug)]
pub struct PendingDecode {
    name: String,
    rx: mpsc::Receiver<Result<LoadedImage>>,
}

impl PendingDecode {
    /// Name of the payload being decoded.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until the decode finishes.
    pub fn wait(self) -> Result<LoadedImage> {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(Error::decode(&self.name, "decoder worker stopped")))
    }

    /// Return the result if the decode has already finished.
    pub fn try_take(&self) -> Option<Result<LoadedImage>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                Some(Err(Error::decode(&self.name, "decoder worker stopped")))
            }
        }
    }
}

/// Start decoding `payload` on the rayon pool.
pub fn decode_in_background(payload: Payload) -> PendingDecode {
    let (tx, rx) = mpsc::channel();
    let name = payload.name.clone();
    rayon::spawn(move || {
        // Receiver may have been dropped; nothing to report to then.
        let _ = tx.send(load_image(&payload));
    });
    PendingDecode { name, rx }
}

/// List image files under `dir`, recursively, in filesystem listing order.
///
/// Hidden directories are skipped, as are files whose extension is not in
/// [`SUPPORTED_EXTENSIONS`]. The order is whatever the filesystem returns
/// and is deliberately not sorted.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Error::Discovery(format!("Path does not exist: {}", dir.display())));
    }

    if !dir.is_dir() {
        return Err(Error::Discovery(format!("Path is not a directory: {}", dir.display())));
    }

    let mut images = Vec::new();
    discover_recursive(dir, &mut images)?;
    Ok(images)
}

fn discover_recursive(current: &Path, images: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(current).map_err(|e| {
        Error::Discovery(format!("Failed to read directory {}: {}", current.display(), e))
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::Discovery(format!("Failed to read entry in {}: {}", current.display(), e))
        })?;

        let path = entry.path();

        if path.is_dir() {
            if path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or(false, |s| s.starts_with('.'))
            {
                continue;
            }
            discover_recursive(&path, images)?;
        } else if path.is_file() && has_supported_extension(&path) {
            images.push(path);
        }
    }

    Ok(())
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .map_or(false, |e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}

/// Name of a discovered file: its path below `root`, `/`-separated.
///
/// Two files sharing a base name in different subdirectories therefore get
/// different names. Falls back to [`display_name`] when `path` is not under
/// `root`.
#[must_use]
pub fn relative_name(root: &Path, path: &Path) -> String {
    let Ok(relative) = path.strip_prefix(root) else {
        return display_name(path);
    };
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        display_name(path)
    } else {
        parts.join("/")
    }
}

/// File name of `path`, falling back to the full path.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgb::RGBA8;

    fn png_payload(name: &str, width: usize, height: usize, pixel: RGBA8) -> Payload {
        let raster = Raster::filled(width, height, pixel).unwrap();
        Payload::new(name, raster.to_png().unwrap())
    }

    #[test]
    fn test_load_png_natural_size() {
        let payload = png_payload("a.png", 7, 3, RGBA8::new(1, 2, 3, 255));
        let loaded = load_image(&payload).unwrap();
        assert_eq!(loaded.name, "a.png");
        assert_eq!(loaded.raster.dimensions(), (7, 3));
        assert_eq!(loaded.raster.pixel(6, 2), Some(RGBA8::new(1, 2, 3, 255)));
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let payload = Payload::new("notes.png", b"definitely not an image".to_vec());
        let err = load_image(&payload).unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("notes.png"));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let err = load_path(Path::new("/nonexistent/dir/missing.png")).unwrap_err();
        assert!(matches!(err, Error::Decode { ref name, .. } if name == "missing.png"));
    }

    #[test]
    fn test_load_many_keeps_order() {
        let payloads = vec![
            png_payload("one.png", 1, 1, RGBA8::new(0, 0, 0, 255)),
            Payload::new("broken.png", vec![0, 1, 2]),
            png_payload("three.png", 3, 1, RGBA8::new(0, 0, 0, 255)),
        ];
        let loaded = load_many(&payloads);
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].as_ref().unwrap().name, "one.png");
        assert!(loaded[1].is_err());
        assert_eq!(loaded[2].as_ref().unwrap().raster.width(), 3);
    }

    #[test]
    fn test_decode_in_background() {
        let pending = decode_in_background(png_payload("bg.png", 2, 2, RGBA8::new(9, 9, 9, 255)));
        assert_eq!(pending.name(), "bg.png");
        let loaded = pending.wait().unwrap();
        assert_eq!(loaded.raster.dimensions(), (2, 2));
    }

    #[test]
    fn test_try_take_polls_until_done() {
        let pending = decode_in_background(png_payload("poll.png", 4, 1, RGBA8::new(5, 6, 7, 255)));
        let loaded = loop {
            if let Some(result) = pending.try_take() {
                break result.unwrap();
            }
            std::thread::yield_now();
        };
        assert_eq!(loaded.name, "poll.png");
        assert_eq!(loaded.raster.pixel(3, 0), Some(RGBA8::new(5, 6, 7, 255)));
    }

    #[test]
    fn test_decode_in_background_failure() {
        let pending = decode_in_background(Payload::new("bad.gif", vec![0xFF; 8]));
        assert!(pending.wait().unwrap_err().is_decode());
    }

    #[test]
    fn test_discover_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(dir.path().join("b.JPG"), b"x").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.webp"), b"x").unwrap();
        std::fs::create_dir(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join(".hidden").join("d.png"), b"x").unwrap();

        let mut names: Vec<String> = discover_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| display_name(p))
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.webp"]);
    }

    #[test]
    fn test_relative_name() {
        let root = Path::new("/data/after");
        assert_eq!(relative_name(root, Path::new("/data/after/x.png")), "x.png");
        assert_eq!(relative_name(root, Path::new("/data/after/a/x.png")), "a/x.png");
        assert_eq!(relative_name(root, Path::new("/data/after/b/c/x.png")), "b/c/x.png");
        assert_eq!(relative_name(root, Path::new("/elsewhere/y.png")), "y.png");
    }

    #[test]
    fn test_discover_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(discover_images(&file), Err(Error::Discovery(_))));
    }
}
