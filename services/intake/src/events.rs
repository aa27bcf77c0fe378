//! Fire-and-forget intake events

use crate::models::{FileKind, PublishMode};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use uuid::Uuid;

/// Receiver of intake events. Calls must not block and their outcome is
/// never observed by the engine.
pub trait IntakeEvents: Send + Sync {
    fn file_selected(&self, selection_id: Uuid, kind: FileKind);
    fn publish_mode_changed(&self, mode: PublishMode);
}

/// Writes events to the `analytics` tracing target while enabled
#[derive(Debug)]
pub struct TracingEvents {
    enabled: AtomicBool,
}

impl TracingEvents {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn toggle(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl IntakeEvents for TracingEvents {
    fn file_selected(&self, selection_id: Uuid, kind: FileKind) {
        if self.is_enabled() {
            info!(target: "analytics", %selection_id, ?kind, at = %Utc::now().to_rfc3339(), "file_selected");
        }
    }

    fn publish_mode_changed(&self, mode: PublishMode) {
        if self.is_enabled() {
            info!(target: "analytics", ?mode, at = %Utc::now().to_rfc3339(), "publish_mode_changed");
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEvents;

impl IntakeEvents for NoOpEvents {
    fn file_selected(&self, _selection_id: Uuid, _kind: FileKind) {}
    fn publish_mode_changed(&self, _mode: PublishMode) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let events = TracingEvents::new(true);
        assert!(events.is_enabled());
        events.toggle(false);
        assert!(!events.is_enabled());
        // Disabled calls are silently dropped
        events.file_selected(Uuid::new_v4(), FileKind::Video);
        events.publish_mode_changed(PublishMode::Post);
    }
}
