//! polyseg - interactive polygon segmentation editor
//!
//! Draw, select, drag, resample and erase polygon vertices over a zoomable,
//! pannable image, and export them as grouped per-object annotations.
//!
//! The [`Editor`] is headless: it takes pointer events in surface pixels and
//! produces a [`Frame`] display list. Images, persistence and the
//! segmentation model are reached through the [`ImageSource`],
//! [`PersistenceSink`] and [`AnnotationProducer`] traits.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod format;
pub mod geometry;
pub mod model;
pub mod producer;
pub mod render;
pub mod source;
pub mod store;
pub mod view;

pub use config::{ConfigError, EditorConfig, LogLevel, MoveRelease};
pub use editor::{Cursor, Editor, PointerButton, PointerEvent, PointerOutcome, Tool};
pub use error::EditError;
pub use format::{
    AutoSaveManager, FormatError, ImageAnnotations, JsonFolderStore, MemorySink, PersistenceSink,
};
pub use geometry::{Offset, Point};
pub use model::{FileKey, FileRef, Group, Polygon, PolygonId, PolygonSeed, ShapeName};
pub use producer::{
    AnnotationProducer, ProcessConfig, ProcessProducer, ProducerError, ProducerResult,
};
pub use render::{DisplayMode, DrawCommand, Frame, build_frame};
pub use source::{FileImageSource, FixedImageSource, ImageSize, ImageSource, SourceError};
pub use store::PolygonStore;
pub use view::{Size, ViewTransform};
