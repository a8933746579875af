//! Persistence sink contract.

use std::collections::HashMap;
use std::path::Path;

use crate::format::error::FormatError;
use crate::format::grouped::ImageAnnotations;
use crate::model::{FileKey, Polygon};

/// Where the editor sends a file's polygons after edits, and where it looks
/// for previously saved annotations when a file is opened.
pub trait PersistenceSink {
    /// Store the current polygons of one image.
    fn save(
        &mut self,
        file_key: &FileKey,
        file_name: &str,
        polygons: &[Polygon],
    ) -> Result<(), FormatError>;

    /// Fetch the saved document for an image, if there is one.
    fn load(&mut self, file_name: &str) -> Result<Option<ImageAnnotations>, FormatError>;
}

/// Document name for an image: the file name without its extension.
pub fn document_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Sink that keeps documents in memory. Records every save.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: HashMap<String, ImageAnnotations>,
    saves: Vec<FileKey>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: pre-populate a document.
    pub fn with_document(mut self, document: ImageAnnotations) -> Self {
        self.documents
            .insert(document_stem(&document.image_name).to_string(), document);
        self
    }

    /// Keys passed to [`PersistenceSink::save`], in call order.
    pub fn saves(&self) -> &[FileKey] {
        &self.saves
    }

    pub fn save_count(&self) -> usize {
        self.saves.len()
    }

    pub fn document(&self, file_name: &str) -> Option<&ImageAnnotations> {
        self.documents.get(document_stem(file_name))
    }
}

impl PersistenceSink for MemorySink {
    fn save(
        &mut self,
        file_key: &FileKey,
        file_name: &str,
        polygons: &[Polygon],
    ) -> Result<(), FormatError> {
        let document = ImageAnnotations::from_polygons(file_name, polygons);
        self.documents
            .insert(document_stem(file_name).to_string(), document);
        self.saves.push(file_key.clone());
        Ok(())
    }

    fn load(&mut self, file_name: &str) -> Result<Option<ImageAnnotations>, FormatError> {
        Ok(self.documents.get(document_stem(file_name)).cloned())
    }
}

// Shared sinks: the caller keeps a handle to inspect what was saved.
impl<S: PersistenceSink> PersistenceSink for std::rc::Rc<std::cell::RefCell<S>> {
    fn save(
        &mut self,
        file_key: &FileKey,
        file_name: &str,
        polygons: &[Polygon],
    ) -> Result<(), FormatError> {
        self.borrow_mut().save(file_key, file_name, polygons)
    }

    fn load(&mut self, file_name: &str) -> Result<Option<ImageAnnotations>, FormatError> {
        self.borrow_mut().load(file_name)
    }
}
