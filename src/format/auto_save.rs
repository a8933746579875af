//! Auto-save scheduling with debouncing.
//!
//! Tracks which file has unsaved edits and decides when the editor should
//! hand it to the persistence sink.

use std::time::Duration;
use web_time::Instant;

use crate::config::EditorConfig;
use crate::model::FileKey;

/// Decides when edited polygons are written out.
///
/// Two timers keep saves from piling up:
/// 1. **Debounce delay**: wait this long after the last edit so a drag
///    produces one save, not one per pointer move.
/// 2. **Minimum interval**: never save the same session more often than this.
#[derive(Debug)]
pub struct AutoSaveManager {
    save_interval: Duration,
    debounce_delay: Duration,
    last_save: Option<Instant>,
    last_change: Option<Instant>,
    enabled: bool,
    /// File with edits not yet handed to the sink.
    pending: Option<FileKey>,
}

impl AutoSaveManager {
    /// Default minimum interval between saves.
    pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(5);

    /// Default debounce delay.
    pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self {
            save_interval: Self::DEFAULT_SAVE_INTERVAL,
            debounce_delay: Self::DEFAULT_DEBOUNCE_DELAY,
            last_save: None,
            last_change: None,
            enabled: true,
            pending: None,
        }
    }

    /// Timing and on/off switch taken from the editor configuration.
    pub fn from_config(config: &EditorConfig) -> Self {
        let mut manager = Self::new()
            .with_debounce_delay(config.auto_save_debounce())
            .with_save_interval(config.auto_save_interval());
        manager.enabled = config.auto_save;
        manager
    }

    /// Create a disabled auto-save manager.
    pub fn disabled() -> Self {
        let mut manager = Self::new();
        manager.enabled = false;
        manager
    }

    pub fn with_save_interval(mut self, interval: Duration) -> Self {
        self.save_interval = interval;
        self
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Record an edit to `file`.
    pub fn mark_dirty(&mut self, file: &FileKey) {
        if self.pending.as_ref() != Some(file) {
            log::trace!("Auto-save: {} has unsaved edits", file);
        }
        self.pending = Some(file.clone());
        self.last_change = Some(Instant::now());
    }

    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// File waiting to be saved, if any.
    pub fn pending(&self) -> Option<&FileKey> {
        self.pending.as_ref()
    }

    /// Whether the pending file is due.
    ///
    /// True once the debounce delay has passed since the last edit and the
    /// minimum interval has passed since the last save.
    pub fn should_save(&self) -> bool {
        if !self.enabled || self.pending.is_none() {
            return false;
        }

        let Some(last_change) = self.last_change else {
            return false;
        };

        if last_change.elapsed() < self.debounce_delay {
            return false;
        }

        if let Some(last_save) = self.last_save
            && last_save.elapsed() < self.save_interval
        {
            return false;
        }

        true
    }

    /// Record a successful save.
    pub fn mark_saved(&mut self) {
        self.last_save = Some(Instant::now());
        self.pending = None;
        self.last_change = None;
        log::trace!("Auto-save: marked saved");
    }

    /// Record a failed save. The edits stay pending and are retried after
    /// the minimum interval.
    pub fn mark_save_failed(&mut self) {
        self.last_save = Some(Instant::now());
        log::trace!("Auto-save: marked save failed");
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        log::debug!("Auto-save: enabled = {}", enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Forget pending edits and timing, e.g. after an explicit flush.
    pub fn reset(&mut self) {
        self.last_save = None;
        self.last_change = None;
        self.pending = None;
    }
}

impl Default for AutoSaveManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> FileKey {
        FileKey::from("a.png")
    }

    #[test]
    fn test_initial_state() {
        let manager = AutoSaveManager::new();
        assert!(!manager.is_dirty());
        assert!(!manager.should_save());
        assert!(manager.is_enabled());
    }

    #[test]
    fn test_mark_dirty_tracks_file() {
        let mut manager = AutoSaveManager::new();
        manager.mark_dirty(&key());
        assert!(manager.is_dirty());
        assert_eq!(manager.pending(), Some(&key()));
    }

    #[test]
    fn test_mark_saved_clears_pending() {
        let mut manager = AutoSaveManager::new();
        manager.mark_dirty(&key());
        manager.mark_saved();
        assert!(!manager.is_dirty());
        assert!(manager.pending().is_none());
    }

    #[test]
    fn test_disabled() {
        let mut manager = AutoSaveManager::disabled();
        manager.mark_dirty(&key());
        assert!(!manager.should_save());
    }

    #[test]
    fn test_debounce_prevents_immediate_save() {
        let mut manager = AutoSaveManager::new()
            .with_debounce_delay(Duration::from_secs(10))
            .with_save_interval(Duration::ZERO);
        manager.mark_dirty(&key());
        assert!(!manager.should_save());
    }

    #[test]
    fn test_zero_delays_save_immediately() {
        let mut manager = AutoSaveManager::new()
            .with_debounce_delay(Duration::ZERO)
            .with_save_interval(Duration::ZERO);
        manager.mark_dirty(&key());
        assert!(manager.should_save());
    }

    #[test]
    fn test_failed_save_stays_pending() {
        let mut manager = AutoSaveManager::new()
            .with_debounce_delay(Duration::ZERO)
            .with_save_interval(Duration::from_secs(60));
        manager.mark_dirty(&key());
        manager.mark_save_failed();
        assert!(manager.is_dirty());
        // Retry waits for the interval
        assert!(!manager.should_save());
    }

    #[test]
    fn test_from_config() {
        let config = EditorConfig::new().with_auto_save(false);
        assert!(!AutoSaveManager::from_config(&config).is_enabled());
    }
}
