//! Folder of per-image JSON annotation documents.

use std::path::{Path, PathBuf};

use crate::format::error::FormatError;
use crate::format::grouped::ImageAnnotations;
use crate::format::sink::{PersistenceSink, document_stem};
use crate::model::{FileKey, Polygon};

/// Writes one `<stem>.json` per image into a folder.
#[derive(Debug, Clone)]
pub struct JsonFolderStore {
    folder: PathBuf,
}

impl JsonFolderStore {
    /// Open (and create if needed) the annotation folder.
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self, FormatError> {
        let folder = folder.into();
        std::fs::create_dir_all(&folder)?;
        if !folder.is_dir() {
            return Err(FormatError::FolderUnavailable { path: folder });
        }
        Ok(Self { folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Document path for an image.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.folder
            .join(format!("{}.json", document_stem(file_name)))
    }

    /// Write a document to its path.
    pub fn write_document(&self, document: &ImageAnnotations) -> Result<PathBuf, FormatError> {
        let path = self.path_for(&document.image_name);
        std::fs::write(&path, document.to_json()?)?;
        Ok(path)
    }

    /// Read the document stored at `path`.
    pub fn read_document(path: &Path) -> Result<ImageAnnotations, FormatError> {
        let json = std::fs::read_to_string(path)?;
        ImageAnnotations::from_json(&json)
    }

    /// All `.json` documents in the folder, sorted by path.
    pub fn list(&self) -> Result<Vec<PathBuf>, FormatError> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&self.folder)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl PersistenceSink for JsonFolderStore {
    fn save(
        &mut self,
        file_key: &FileKey,
        file_name: &str,
        polygons: &[Polygon],
    ) -> Result<(), FormatError> {
        let document = ImageAnnotations::from_polygons(file_name, polygons);
        let path = self.write_document(&document)?;
        log::info!(
            "Saved {} polygons for {} to {:?}",
            document.instance_count(),
            file_key,
            path
        );
        Ok(())
    }

    fn load(&mut self, file_name: &str) -> Result<Option<ImageAnnotations>, FormatError> {
        let path = self.path_for(file_name);
        if !path.exists() {
            log::debug!("No saved annotations at {:?}", path);
            return Ok(None);
        }
        let document = Self::read_document(&path)?;
        log::info!(
            "Loaded {} instances from {:?}",
            document.instance_count(),
            path
        );
        Ok(Some(document))
    }
}
