//! Annotation documents and persistence.
//!
//! The editor's only persisted artifact is a per-image grouped document
//! (see [`ImageAnnotations`]). Saving goes through the [`PersistenceSink`]
//! trait so the editor never touches the file system directly.
//!
//! ## Sinks
//!
//! - [`JsonFolderStore`]: one pretty-printed `<stem>.json` per image in a folder
//! - [`MemorySink`]: in-memory documents, used by tests and embedders
//!
//! ## Usage
//!
//! ```rust,ignore
//! use polyseg::format::{ImageAnnotations, JsonFolderStore, PersistenceSink};
//!
//! let mut store = JsonFolderStore::new("annotations")?;
//! if let Some(document) = store.load("frame_000002.jpg")? {
//!     print!("{}", document.to_text());
//! }
//! ```

mod auto_save;
mod error;
mod grouped;
mod json_store;
mod sink;


pub use auto_save::AutoSaveManager;
pub use error::FormatError;
pub use grouped::{ClassEntry, ImageAnnotations, InstanceEntry};
pub use json_store::JsonFolderStore;
pub use sink::{MemorySink, PersistenceSink, document_stem};
