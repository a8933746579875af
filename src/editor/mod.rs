//! Interactive polygon editor.
//!
//! The [`Editor`] owns the polygon store for every file it has seen and
//! routes pointer events through the active [`Tool`]. All edits go through
//! the store's operations. Persistence, image probing and the model runner
//! are reached only through their traits, so the editor runs headless.
//!
//! Lifecycle of an edit: pointer event → tool dispatch → store mutation →
//! auto-save marked dirty → [`Editor::tick`] hands the file to the sink once
//! the debounce has passed.

mod draft;
mod input;
mod interaction;
mod pointer;
mod tool;


pub use draft::Draft;
pub use input::{PointerButton, PointerEvent, PointerOutcome};
pub use interaction::{Cursor, DragState, InteractionState};
pub use tool::Tool;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::EditorConfig;
use crate::constants::{MIN_POINT_DENSITY, MIN_POLYGON_VERTICES};
use crate::error::EditError;
use crate::format::{AutoSaveManager, FormatError, PersistenceSink};
use crate::geometry::reorder_points;
use crate::model::{FileKey, FileRef, Group, Polygon, PolygonId, ShapeName};
use crate::producer::{AnnotationProducer, MIN_FRAME, ProducerError, frame_number};
use crate::render::{DisplayMode, Frame, FrameInput, RenderStyle, build_frame};
use crate::source::{ImageSize, ImageSource, SourceError};
use crate::store::PolygonStore;
use crate::view::{Size, ViewTransform};

/// One editing session over a set of images.
pub struct Editor {
    config: EditorConfig,
    store: PolygonStore,
    state: InteractionState,
    draft: Draft,
    surface: Size,
    /// `None` while no image is loaded.
    view: Option<ViewTransform>,
    file: Option<FileRef>,
    /// Names of every file with polygons in the store, for saving files
    /// that are no longer active.
    file_names: BTreeMap<FileKey, String>,
    /// Files whose polygons the store already holds, loaded or produced.
    /// Saved documents are read only once per file.
    seen_files: BTreeSet<FileKey>,
    style: RenderStyle,
    point_density: usize,
    sink: Box<dyn PersistenceSink>,
    auto_save: AutoSaveManager,
    producer: Option<Box<dyn AnnotationProducer>>,
    status: Option<String>,
}

impl Editor {
    /// Create an editor drawing onto a surface of `surface` pixels.
    pub fn new(config: EditorConfig, sink: impl PersistenceSink + 'static, surface: Size) -> Self {
        let config = config.sanitized();
        log::debug!(
            "🧭 Editor created ({}x{} surface, auto-save {})",
            surface.width,
            surface.height,
            if config.auto_save { "on" } else { "off" }
        );
        Self {
            store: PolygonStore::new().with_max_density(config.max_point_density),
            state: InteractionState::new(Tool::default()),
            draft: Draft::new(),
            surface,
            view: None,
            file: None,
            file_names: BTreeMap::new(),
            seen_files: BTreeSet::new(),
            style: RenderStyle::new(config.display_mode, config.vertex_radius),
            point_density: config.default_point_density,
            sink: Box::new(sink),
            auto_save: AutoSaveManager::from_config(&config),
            producer: None,
            status: None,
            config,
        }
    }

    /// Builder: attach a model runner.
    pub fn with_producer(mut self, producer: impl AnnotationProducer + 'static) -> Self {
        self.producer = Some(Box::new(producer));
        self
    }

    // ---- accessors ----

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &PolygonStore {
        &self.store
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn tool(&self) -> Tool {
        self.state.tool
    }

    pub fn selected_polygon(&self) -> Option<PolygonId> {
        self.state.selected_polygon
    }

    pub fn cursor(&self) -> Cursor {
        self.state.cursor
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn view(&self) -> Option<&ViewTransform> {
        self.view.as_ref()
    }

    pub fn surface_size(&self) -> Size {
        self.surface
    }

    pub fn active_file(&self) -> Option<&FileRef> {
        self.file.as_ref()
    }

    /// Polygons of the active file, in store order.
    pub fn polygons(&self) -> &[Polygon] {
        match &self.file {
            Some(file) => self.store.polygons(&file.key),
            None => &[],
        }
    }

    pub fn style(&self) -> RenderStyle {
        self.style
    }

    pub fn point_density(&self) -> usize {
        self.point_density
    }

    /// Last diagnostic message, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.auto_save.is_dirty()
    }

    // ---- files ----

    /// Make `file` the active file.
    ///
    /// The outgoing file is saved first when it holds polygons or has an
    /// unsaved edit. Selection, drag and draft are dropped. Saved
    /// annotations are loaded the first time a file is opened. If the image cannot be
    /// probed the file still becomes active, in the no-image state, and the
    /// error is returned.
    pub fn switch_file(
        &mut self,
        file: FileRef,
        source: &dyn ImageSource,
    ) -> Result<ImageSize, SourceError> {
        self.flush_outgoing();
        self.state.reset();
        let discarded = self.draft.take().len();
        if discarded > 0 {
            log::debug!("🗑️ Draft discarded on file switch ({} points)", discarded);
        }
        self.point_density = self.config.default_point_density;
        self.status = None;

        log::info!("📂 Opening {}", file.name);
        self.file_names.insert(file.key.clone(), file.name.clone());
        if self.seen_files.insert(file.key.clone()) {
            self.load_saved(&file);
        }

        let probed = source.image_size(&file);
        self.view = match &probed {
            Ok(size) => Some(ViewTransform::with_limits(
                size.as_size(),
                self.surface,
                self.config.zoom_limits(),
            )),
            Err(e) => {
                log::warn!("⚠️ No image for {}: {}", file.name, e);
                self.status = Some(e.to_string());
                None
            }
        };
        self.file = Some(file);
        probed
    }

    fn flush_outgoing(&mut self) {
        let Some(outgoing) = self.file.take() else {
            return;
        };
        self.state.cancel_drag();
        let pending = self.auto_save.pending() == Some(&outgoing.key);
        if !pending && self.store.len(&outgoing.key) == 0 {
            return;
        }
        let saved = self.save_file(&outgoing.key, &outgoing.name);
        if pending {
            if saved {
                self.auto_save.mark_saved();
            } else {
                self.auto_save.mark_save_failed();
            }
        }
    }

    fn load_saved(&mut self, file: &FileRef) {
        if self.store.len(&file.key) > 0 {
            return;
        }
        match self.sink.load(&file.name) {
            Ok(Some(document)) => {
                let count = self.store.replace_file(&file.key, document.to_seeds());
                log::info!("📂 Loaded {} polygons for {}", count, file.name);
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("⚠️ Could not load annotations for {}: {}", file.name, e);
                self.status = Some(e.to_string());
            }
        }
    }

    /// Hand one file's polygons to the sink. Returns whether it succeeded.
    fn save_file(&mut self, key: &FileKey, name: &str) -> bool {
        let polygons = self.store.polygons(key);
        match self.sink.save(key, name, polygons) {
            Ok(()) => {
                log::info!("💾 Saved {} polygons for {}", polygons.len(), name);
                true
            }
            Err(e) => {
                log::warn!("⚠️ Saving {} failed: {}", name, e);
                self.status = Some(e.to_string());
                false
            }
        }
    }

    /// Save whatever auto-save has pending. Returns whether a save happened.
    fn save_pending(&mut self) -> bool {
        let Some(key) = self.auto_save.pending().cloned() else {
            return false;
        };
        let Some(name) = self.file_names.get(&key).cloned() else {
            log::warn!("⚠️ Dropping pending save for unnamed file {}", key);
            self.auto_save.reset();
            return false;
        };
        if self.save_file(&key, &name) {
            self.auto_save.mark_saved();
            true
        } else {
            self.auto_save.mark_save_failed();
            false
        }
    }

    /// Note an edit to `key`. Edits pending on another file are saved first.
    fn mark_dirty(&mut self, key: &FileKey) {
        let other_pending = self.auto_save.pending().is_some_and(|p| p != key);
        if other_pending {
            self.save_pending();
        }
        self.auto_save.mark_dirty(key);
    }

    /// Save the active file now, regardless of auto-save timing.
    pub fn save_now(&mut self) -> Result<(), FormatError> {
        let Some(file) = self.file.clone() else {
            return Ok(());
        };
        let result = self
            .sink
            .save(&file.key, &file.name, self.store.polygons(&file.key));
        match &result {
            Ok(()) => {
                log::info!("💾 Saved {}", file.name);
                if self.auto_save.pending() == Some(&file.key) {
                    self.auto_save.mark_saved();
                }
            }
            Err(e) => {
                log::warn!("⚠️ Saving {} failed: {}", file.name, e);
                self.status = Some(e.to_string());
            }
        }
        result
    }

    /// Periodic housekeeping: merge model results and run a due auto-save.
    /// Returns whether a save happened.
    pub fn tick(&mut self) -> bool {
        self.apply_producer_results();
        if !self.auto_save.should_save() {
            return false;
        }
        log::trace!("Auto-save due");
        self.save_pending()
    }

    // ---- tools and drafting ----

    /// Switch tools. Any drag is dropped; the draft is kept.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.state.tool == tool {
            return;
        }
        self.state.cancel_drag();
        self.state.tool = tool;
        self.state.hovered_polygon = None;
        self.state.cursor = InteractionState::idle_cursor(tool);
        log::debug!("🖌️ Tool: {}", tool.name());
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    /// Turn the draft into a polygon of the active file and select it.
    ///
    /// The draft is kept when the commit is refused.
    pub fn commit_draft(
        &mut self,
        name: impl Into<ShapeName>,
        group: impl Into<Group>,
    ) -> Result<PolygonId, EditError> {
        let key = self.active_key("commit")?;
        if !self.draft.can_commit() {
            return self.refuse("commit", EditError::too_few_points(self.draft.len()));
        }

        let points = reorder_points(self.draft.points());
        let id = match self
            .store
            .create_polygon(&key, points, name.into(), group.into())
        {
            Ok(id) => id,
            Err(e) => return self.rejected(e),
        };

        self.draft.clear();
        self.state.select(id, None);
        self.suggest_density(&key, id);
        self.mark_dirty(&key);
        log::debug!("✅ Committed polygon {}", id);
        Ok(id)
    }

    /// Throw the draft away. Returns how many points it had.
    pub fn cancel_draft(&mut self) -> usize {
        let discarded = self.draft.take().len();
        if discarded > 0 {
            log::debug!("🗑️ Draft discarded ({} points)", discarded);
        }
        discarded
    }

    /// Replace the selected polygon's outline and anchor with the draft.
    pub fn redraw_selected(&mut self) -> Result<(), EditError> {
        let (key, id) = self.selection("redraw")?;
        if !self.draft.can_commit() {
            return self.refuse("redraw", EditError::too_few_points(self.draft.len()));
        }
        let points = reorder_points(self.draft.points());
        if let Err(e) = self.store.redraw_polygon(&key, id, points) {
            return self.rejected(e);
        }
        self.draft.clear();
        self.state.selected_point = None;
        self.mark_dirty(&key);
        log::debug!("✏️ Redrew polygon {}", id);
        Ok(())
    }

    // ---- selected polygon ----

    /// Set the point density slider.
    ///
    /// With a polygon selected it is resampled to half the density in
    /// vertices. Returns the new vertex count, or `None` without a selection.
    pub fn set_point_density(&mut self, density: usize) -> Result<Option<usize>, EditError> {
        self.point_density = density
            .max(MIN_POINT_DENSITY)
            .min(self.config.max_point_density);
        if self.state.selected_polygon.is_none() {
            return Ok(None);
        }
        let target = (self.point_density / 2).max(MIN_POLYGON_VERTICES);
        self.resample_selected(target).map(Some)
    }

    /// Resample the selected polygon to `target` vertices from its anchor.
    pub fn resample_selected(&mut self, target: usize) -> Result<usize, EditError> {
        let (key, id) = self.selection("resample")?;
        match self.store.resample_polygon(&key, id, target) {
            Ok(count) => {
                self.state.selected_point = None;
                self.mark_dirty(&key);
                Ok(count)
            }
            Err(e) => self.rejected(e),
        }
    }

    /// Select a polygon of the active file by id, as a list view does.
    pub fn select_polygon(&mut self, id: PolygonId) -> Result<(), EditError> {
        let key = self.active_key("select")?;
        if self.store.get(&key, id).is_none() {
            return self.refuse("select", EditError::unknown_polygon(&key, id));
        }
        self.state.cancel_drag();
        self.state.select(id, None);
        self.suggest_density(&key, id);
        log::debug!("🔍 Selected polygon {} from list", id);
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<Polygon, EditError> {
        let (key, id) = self.selection("delete")?;
        match self.store.delete_polygon(&key, id) {
            Ok(polygon) => {
                self.state.forget_polygon(id);
                self.mark_dirty(&key);
                log::debug!("🗑️ Deleted polygon {}", id);
                Ok(polygon)
            }
            Err(e) => self.rejected(e),
        }
    }

    pub fn rename_selected(
        &mut self,
        name: impl Into<ShapeName>,
        group: impl Into<Group>,
    ) -> Result<(), EditError> {
        let (key, id) = self.selection("rename")?;
        match self.store.rename(&key, id, name.into(), group.into()) {
            Ok(()) => {
                self.mark_dirty(&key);
                Ok(())
            }
            Err(e) => self.rejected(e),
        }
    }

    /// Suggest a density matching the polygon's current vertex count.
    fn suggest_density(&mut self, key: &FileKey, id: PolygonId) {
        if let Some(polygon) = self.store.get(key, id) {
            self.point_density = (polygon.vertex_count() * 2)
                .max(MIN_POINT_DENSITY)
                .min(self.config.max_point_density);
        }
    }

    fn active_key(&mut self, op: &str) -> Result<FileKey, EditError> {
        match &self.file {
            Some(file) => Ok(file.key.clone()),
            None => self.refuse(op, EditError::NoActiveFile),
        }
    }

    fn selection(&mut self, op: &str) -> Result<(FileKey, PolygonId), EditError> {
        let key = self.active_key(op)?;
        match self.state.selected_polygon {
            Some(id) => Ok((key, id)),
            None => self.refuse(op, EditError::NoSelection),
        }
    }

    /// Refuse an operation the store never saw.
    fn refuse<T>(&mut self, op: &str, err: EditError) -> Result<T, EditError> {
        log::warn!("⚠️ {} rejected: {}", op, err);
        self.rejected(err)
    }

    /// Record a refusal the store already logged.
    fn rejected<T>(&mut self, err: EditError) -> Result<T, EditError> {
        self.status = Some(err.to_string());
        Err(err)
    }

    // ---- view ----

    /// Resize the drawing surface. Zoom and pan are kept.
    pub fn set_surface_size(&mut self, surface: Size) {
        self.surface = surface;
        if let Some(view) = &mut self.view {
            view.refit(surface);
        }
    }

    pub fn zoom_in(&mut self) {
        if let Some(view) = &mut self.view {
            view.zoom_in();
            log::debug!("🔍 Zoom in: {:.2}x", view.zoom());
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(view) = &mut self.view {
            view.zoom_out();
            log::debug!("🔍 Zoom out: {:.2}x", view.zoom());
        }
    }

    pub fn reset_view(&mut self) {
        if let Some(view) = &mut self.view {
            view.reset();
            log::debug!("🔄 View reset");
        }
    }

    /// Pan by a surface-pixel delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        if let Some(view) = &mut self.view {
            view.pan_by(dx, dy);
            let (x, y) = view.pan();
            log::debug!("✋ Pan: ({:.0}, {:.0})", x, y);
        }
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.style.display_mode = self.style.display_mode.toggled();
        log::debug!("🎭 Display mode: {}", self.style.display_mode.name());
        self.style.display_mode
    }

    /// Set the vertex marker radius, clamped to its valid range.
    pub fn set_vertex_radius(&mut self, radius: f32) {
        self.style = RenderStyle::new(self.style.display_mode, radius);
    }

    /// Build the display list for the current state.
    pub fn frame(&self) -> Frame {
        build_frame(FrameInput {
            surface: self.surface,
            view: self.view.as_ref(),
            file: self.file.as_ref().map(|f| &f.key),
            polygons: self.polygons(),
            selected: self.state.selected_polygon,
            draft: self.draft.points(),
            style: self.style,
        })
    }

    // ---- model runner ----

    /// Ask the model runner to segment the active frame. Returns the frame
    /// number that was requested.
    pub fn request_model(&mut self) -> Result<u32, ProducerError> {
        let result = self.try_request_model();
        if let Err(e) = &result {
            log::warn!("⚠️ Model request rejected: {}", e);
            self.status = Some(e.to_string());
        }
        result
    }

    fn try_request_model(&mut self) -> Result<u32, ProducerError> {
        let file = self.file.as_ref().ok_or(ProducerError::NoActiveFile)?;
        let frame =
            frame_number(&file.name).ok_or_else(|| ProducerError::NotAFrame(file.name.clone()))?;
        if frame < MIN_FRAME {
            return Err(ProducerError::InvalidFrame(frame));
        }
        let producer = self
            .producer
            .as_mut()
            .ok_or(ProducerError::NotConfigured)?;
        producer.request(file, frame)?;
        log::info!("🤖 Requested model for frame {}", frame);
        Ok(frame)
    }

    /// Requests still running in the model runner.
    pub fn pending_model_requests(&self) -> usize {
        self.producer.as_ref().map_or(0, |p| p.pending_count())
    }

    /// Merge finished model results into the store, exactly like an edit.
    /// Returns how many documents were applied.
    pub fn apply_producer_results(&mut self) -> usize {
        let Some(producer) = self.producer.as_mut() else {
            return 0;
        };
        let results = producer.take_results();

        let mut applied = 0;
        for result in results {
            let document = match result.outcome {
                Ok(document) => document,
                Err(e) => {
                    log::warn!("⚠️ Model failed for {}: {}", result.file.name, e);
                    self.status = Some(e.to_string());
                    continue;
                }
            };

            let key = result.file.key.clone();
            let count = self.store.replace_file(&key, document.to_seeds());
            self.file_names.insert(key.clone(), result.file.name.clone());
            self.seen_files.insert(key.clone());
            if self.file.as_ref().is_some_and(|f| f.key == key) {
                // Every polygon id of the file changed.
                self.state.reset();
            }
            self.mark_dirty(&key);
            log::info!(
                "🤖 Frame {}: {} polygons from model",
                result.frame,
                count
            );
            self.status = Some(format!("Frame {}: {} polygons", result.frame, count));
            applied += 1;
        }
        applied
    }
}
