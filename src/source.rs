//! Image size sources.
//!
//! The editor never decodes pixels; it only needs an image's natural size
//! to build the view transform. [`FileImageSource`] reads it from the file
//! header with the `image` crate.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{FileKey, FileRef};
use crate::view::Size;

/// Natural pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }
}

/// Errors from probing an image.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file could not be found or read
    #[error("Failed to read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header could not be decoded
    #[error("Failed to decode image {name}: {message}")]
    Decode { name: String, message: String },

    /// Decoded, but zero width or height
    #[error("Image {name} has no pixels ({width}x{height})")]
    Empty {
        name: String,
        width: u32,
        height: u32,
    },

    /// The source has no entry for this file
    #[error("Unknown image: {0}")]
    Unknown(FileKey),
}

/// Anything that can tell the editor how large an image is.
pub trait ImageSource {
    fn image_size(&self, file: &FileRef) -> Result<ImageSize, SourceError>;
}

fn checked(name: &str, width: u32, height: u32) -> Result<ImageSize, SourceError> {
    if width == 0 || height == 0 {
        return Err(SourceError::Empty {
            name: name.to_string(),
            width,
            height,
        });
    }
    Ok(ImageSize::new(width, height))
}

/// Read the natural size from encoded image bytes.
pub fn probe_bytes(name: &str, bytes: &[u8]) -> Result<ImageSize, SourceError> {
    let decode_err = |e: &dyn std::fmt::Display| SourceError::Decode {
        name: name.to_string(),
        message: e.to_string(),
    };
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_err(&e))?
        .into_dimensions()
        .map_err(|e| decode_err(&e))?;
    checked(name, width, height)
}

/// Probes image files under a root folder. A file's name is its path
/// relative to the root.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    root: PathBuf,
}

impl FileImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, file: &FileRef) -> PathBuf {
        self.root.join(&file.name)
    }
}

impl ImageSource for FileImageSource {
    fn image_size(&self, file: &FileRef) -> Result<ImageSize, SourceError> {
        let path = self.path_for(file);
        if !path.is_file() {
            return Err(SourceError::Io {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a file"),
                path,
            });
        }
        let (width, height) = image::image_dimensions(&path).map_err(|e| match e {
            image::ImageError::IoError(source) => SourceError::Io {
                path: path.clone(),
                source,
            },
            other => SourceError::Decode {
                name: file.name.clone(),
                message: other.to_string(),
            },
        })?;
        log::debug!("📐 {} is {}x{}", file.name, width, height);
        checked(&file.name, width, height)
    }
}

/// Fixed sizes per file key, for headless use and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedImageSource {
    sizes: HashMap<FileKey, ImageSize>,
}

impl FixedImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, key: impl Into<String>, width: u32, height: u32) -> Self {
        self.sizes
            .insert(FileKey::new(key), ImageSize::new(width, height));
        self
    }
}

impl ImageSource for FixedImageSource {
    fn image_size(&self, file: &FileRef) -> Result<ImageSize, SourceError> {
        self.sizes
            .get(&file.key)
            .copied()
            .ok_or_else(|| SourceError::Unknown(file.key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_reads_png_header() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(7, 5)
            .save(dir.path().join("frame_000001.png"))
            .unwrap();

        let source = FileImageSource::new(dir.path());
        let size = source
            .image_size(&FileRef::named("frame_000001.png"))
            .unwrap();
        assert_eq!(size, ImageSize::new(7, 5));
        assert_eq!(size.as_size(), Size::new(7.0, 5.0));
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileImageSource::new(dir.path());
        let err = source.image_size(&FileRef::named("nope.png")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_file_source_garbage() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("junk.png"), b"definitely not a png").unwrap();
        let source = FileImageSource::new(dir.path());
        assert!(source.image_size(&FileRef::named("junk.png")).is_err());
    }

    #[test]
    fn test_probe_bytes() {
        let mut bytes = Vec::new();
        image::RgbImage::new(3, 9)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        assert_eq!(probe_bytes("mem.png", &bytes).unwrap(), ImageSize::new(3, 9));
        assert!(probe_bytes("empty", &[]).is_err());
    }

    #[test]
    fn test_fixed_source() {
        let source = FixedImageSource::new().with_image("a.png", 640, 480);
        assert_eq!(
            source.image_size(&FileRef::named("a.png")).unwrap(),
            ImageSize::new(640, 480)
        );
        assert!(matches!(
            source.image_size(&FileRef::named("b.png")),
            Err(SourceError::Unknown(_))
        ));
    }
}
