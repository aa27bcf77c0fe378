//! Publish intake orchestration
//!
//! Turns file selections into publish form patches. Duration probes and
//! text decodes run as background tasks tagged with the selection's
//! generation; a result whose generation is no longer current is dropped.

use crate::classifier::classify;
use crate::error::DecodeResult;
use crate::events::IntakeEvents;
use crate::models::{
    Classification, FileIdentity, FileKind, FilePathValue, PublishFormPatch, PublishMode,
    SelectedFile,
};
use crate::name::NameSanitizer;
use crate::state::{DerivedState, IntakeInputs, derive};
use crate::video_probe::{MediaProbe, ProbeOutcome, probe_duration};
use common::error::PreferenceResult;
use common::preferences::{PreferenceStore, USER_OPTIMIZE_KEY, get_or};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where the engine writes its output. The engine never reads back the
/// merged form.
pub trait PublishFormSink: Send + Sync {
    /// Merge a sparse patch into the form
    fn update_publish_form(&self, patch: PublishFormPatch);

    /// Request a switch of the editing surface
    fn set_publish_mode(&self, mode: PublishMode);

    /// A text post is decoding. The mode stays unset until it finishes,
    /// then arrives through [`set_publish_mode`](Self::set_publish_mode).
    /// After a failed decode it stays pending until the next selection.
    fn mode_pending(&self) {}
}

/// Collaborators injected by the host
#[derive(Clone)]
pub struct IntakeServices {
    pub sink: Arc<dyn PublishFormSink>,
    pub probe: Arc<dyn MediaProbe>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub events: Arc<dyn IntakeEvents>,
    pub sanitizer: NameSanitizer,
}

/// Initial form state supplied by the host
#[derive(Debug, Clone, Default)]
pub struct IntakeOptions {
    /// Editing an existing claim: names are never auto-derived
    pub is_still_editing: bool,
    /// Name the user already typed, if any
    pub name: Option<String>,
    /// Mode to resume in
    pub mode: Option<PublishMode>,
    pub ffmpeg_available: bool,
}

/// Handle on one file selection
#[derive(Debug)]
pub struct Selection {
    pub selection_id: Uuid,
    pub generation: u64,
    /// `None` when the selection cleared the file
    pub classification: Option<Classification>,
    /// The one patch this selection produced
    pub patch: PublishFormPatch,
    pending: Vec<JoinHandle<()>>,
}

impl Selection {
    /// Whether a probe or decode was started for this selection
    pub fn has_pending_work(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Wait until the probe and decode started for this selection finish
    pub async fn settled(self) {
        for handle in self.pending {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Selection task failed: {}", e);
                }
            }
        }
    }
}

/// Values of the reactive form fields as last sent to the sink. Starts at
/// the empty form.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct EmittedFields {
    duration_seconds: f64,
    size_bytes: u64,
    is_video: bool,
    optimize: bool,
}

#[derive(Debug, Default)]
struct IntakeState {
    generation: u64,
    torn_down: bool,
    current_file: Option<SelectedFile>,
    current_is_text_post: bool,
    /// `None` while unset or while a text post is still decoding
    mode: Option<PublishMode>,
    is_still_editing: bool,
    user_name: Option<String>,
    size_bytes: u64,
    duration_seconds: f64,
    is_video: bool,
    ffmpeg_available: bool,
    user_optimize: bool,
    emitted: EmittedFields,
    pending: Vec<AbortHandle>,
}

impl IntakeState {
    fn inputs(&self) -> IntakeInputs {
        IntakeInputs {
            file_selected: self.current_file.is_some(),
            size_bytes: self.size_bytes,
            duration_seconds: self.duration_seconds,
            is_video: self.is_video,
            ffmpeg_available: self.ffmpeg_available,
            user_optimize: self.user_optimize,
            is_still_editing: self.is_still_editing,
            name: self.user_name.clone(),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        !self.torn_down && self.generation == generation
    }

    /// Add the file info and optimize fields that differ from what the
    /// sink last received.
    fn fold_changes(&mut self, patch: &mut PublishFormPatch) {
        let current = EmittedFields {
            duration_seconds: self.duration_seconds,
            size_bytes: self.size_bytes,
            is_video: self.is_video,
            optimize: derive(&self.inputs()).optimize_active(),
        };
        let emitted = self.emitted;

        if current.duration_seconds != emitted.duration_seconds {
            patch.file_dur = Some(current.duration_seconds);
        }
        if current.size_bytes != emitted.size_bytes {
            patch.file_size = Some(current.size_bytes);
        }
        if current.is_video != emitted.is_video {
            patch.file_vid = Some(current.is_video);
        }
        if current.optimize != emitted.optimize {
            patch.optimize = Some(current.optimize);
        }
        self.emitted = current;
    }
}

struct Inner {
    services: IntakeServices,
    state: Mutex<IntakeState>,
}

/// The publish intake engine
#[derive(Clone)]
pub struct PublishIntake {
    inner: Arc<Inner>,
}

impl PublishIntake {
    /// Create the engine, loading the persisted optimize preference
    pub async fn new(services: IntakeServices, options: IntakeOptions) -> PreferenceResult<Self> {
        let user_optimize = get_or(services.preferences.as_ref(), USER_OPTIMIZE_KEY, false).await?;

        let state = IntakeState {
            mode: options.mode,
            is_still_editing: options.is_still_editing,
            user_name: options.name.filter(|n| !n.is_empty()),
            ffmpeg_available: options.ffmpeg_available,
            user_optimize,
            ..Default::default()
        };

        info!(
            "Publish intake ready (editing: {}, ffmpeg: {}, optimize: {})",
            state.is_still_editing, state.ffmpeg_available, user_optimize
        );

        Ok(Self {
            inner: Arc::new(Inner {
                services,
                state: Mutex::new(state),
            }),
        })
    }

    /// Handle a file chosen in the selector; `None` clears the selection
    pub async fn select_file(&self, file: Option<SelectedFile>) -> Selection {
        self.select_file_with(file, true).await
    }

    /// Like [`select_file`](Self::select_file). A clear with `clear_name`
    /// unset keeps the name field.
    ///
    /// Each call sends exactly one patch to the sink and returns it. Once the
    /// engine is torn down, selections are ignored and return an empty patch.
    pub async fn select_file_with(&self, file: Option<SelectedFile>, clear_name: bool) -> Selection {
        let mut state = self.inner.state.lock().await;
        let selection_id = Uuid::new_v4();
        if state.torn_down {
            warn!(%selection_id, "Ignoring file selection after teardown");
            return Selection {
                selection_id,
                generation: state.generation,
                classification: None,
                patch: PublishFormPatch::default(),
                pending: Vec::new(),
            };
        }

        state.generation += 1;
        let generation = state.generation;

        let Some(file) = file else {
            let soft = state.is_still_editing || !clear_name;
            let patch = self.inner.clear_file(&mut state, soft);
            return Selection {
                selection_id,
                generation,
                classification: None,
                patch,
                pending: Vec::new(),
            };
        };

        let classification = classify(&file);
        let sink = &self.inner.services.sink;
        self.inner
            .services
            .events
            .file_selected(selection_id, classification.kind);

        info!(
            %selection_id,
            "Selected {} ({} bytes, {:?})",
            file.name_with_extension, file.size_bytes, classification.kind
        );

        state.size_bytes = file.size_bytes;
        state.duration_seconds = 0.0;
        state.is_video = classification.is_video();

        let is_text_post = classification.kind == FileKind::TextPost;
        state.current_is_text_post = is_text_post;
        if is_text_post {
            state.mode = None;
            sink.mode_pending();
        } else {
            self.inner.change_mode(&mut state, PublishMode::File);
        }

        let mut patch = PublishFormPatch {
            file_path: Some(FilePathValue::Selected(file.identity.clone())),
            ..Default::default()
        };
        if !state.is_still_editing {
            let candidate = state
                .user_name
                .clone()
                .unwrap_or_else(|| file.base_name().to_string());
            patch.name = Some(self.inner.services.sanitizer.sanitize(&candidate));
        }

        state.current_file = Some(file.clone());
        state.fold_changes(&mut patch);
        sink.update_publish_form(patch.clone());

        let mut pending = Vec::new();
        if classification.wants_duration_probe() {
            let inner = self.inner.clone();
            let file = file.clone();
            pending.push(tokio::spawn(async move {
                let outcome = probe_duration(inner.services.probe.as_ref(), &file).await;
                inner.finish_probe(generation, &file, outcome).await;
            }));
        }
        if is_text_post {
            let inner = self.inner.clone();
            pending.push(tokio::spawn(async move {
                let decoded = read_text(&file).await;
                inner.finish_decode(generation, &file, decoded).await;
            }));
        }

        state.pending.retain(|handle| !handle.is_finished());
        state
            .pending
            .extend(pending.iter().map(|handle| handle.abort_handle()));

        Selection {
            selection_id,
            generation,
            classification: Some(classification),
            patch,
            pending,
        }
    }

    /// The user switched the editing surface
    pub async fn set_publish_mode(&self, mode: PublishMode) {
        let mut state = self.inner.state.lock().await;
        state.mode = Some(mode);
        self.inner.services.events.publish_mode_changed(mode);

        // Only a text post can back a post; any other file path is reset,
        // including an already empty one
        if mode == PublishMode::Post && !state.current_is_text_post && !state.is_still_editing {
            debug!("Post mode selected without a text file, clearing file path");
            state.generation += 1;
            self.inner.clear_file(&mut state, true);
        }
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        let _state = self.inner.state.lock().await;
        self.inner.services.sink.update_publish_form(PublishFormPatch {
            title: Some(title.into()),
            ..Default::default()
        });
    }

    /// Record the name the user typed; it takes precedence over file names
    pub async fn set_name(&self, name: Option<String>) {
        let mut state = self.inner.state.lock().await;
        state.user_name = name.filter(|n| !n.is_empty());
    }

    pub async fn set_still_editing(&self, is_still_editing: bool) {
        let mut state = self.inner.state.lock().await;
        state.is_still_editing = is_still_editing;
    }

    pub async fn set_ffmpeg_available(&self, available: bool) {
        let mut state = self.inner.state.lock().await;
        state.ffmpeg_available = available;
        self.inner.emit_changes(&mut state);
    }

    /// Toggle the optimize checkbox. The new value takes effect even when
    /// persisting it fails; the error is returned for the host to report.
    pub async fn set_user_optimize(&self, enabled: bool) -> PreferenceResult<()> {
        {
            let mut state = self.inner.state.lock().await;
            state.user_optimize = enabled;
            self.inner.emit_changes(&mut state);
        }

        let result = self
            .inner
            .services
            .preferences
            .set_bool(USER_OPTIMIZE_KEY, enabled)
            .await;
        if let Err(e) = &result {
            warn!("Failed to persist optimize preference: {}", e);
        }
        result
    }

    /// Current derived state
    pub async fn derived(&self) -> DerivedState {
        derive(&self.inner.state.lock().await.inputs())
    }

    /// Current mode; `None` while unset or while a text post decodes
    pub async fn mode(&self) -> Option<PublishMode> {
        self.inner.state.lock().await.mode
    }

    pub async fn current_file(&self) -> Option<SelectedFile> {
        self.inner.state.lock().await.current_file.clone()
    }

    /// Stop the engine: pending probes and decodes are aborted and any
    /// result that still arrives is ignored. The engine is single-use;
    /// later selections are ignored.
    pub async fn teardown(&self) {
        let mut state = self.inner.state.lock().await;
        state.torn_down = true;
        state.generation += 1;
        for handle in state.pending.drain(..) {
            handle.abort();
        }
        info!("Publish intake torn down");
    }
}

impl Inner {
    /// Reset the selection. A soft clear keeps the name field.
    fn clear_file(&self, state: &mut IntakeState, soft: bool) -> PublishFormPatch {
        let sink = &self.services.sink;

        let mut patch = PublishFormPatch {
            file_path: Some(FilePathValue::Cleared),
            ..Default::default()
        };
        if !soft {
            patch.name = Some(String::new());
            state.user_name = None;
        }

        state.current_file = None;
        state.current_is_text_post = false;
        state.size_bytes = 0;
        state.duration_seconds = 0.0;
        state.is_video = false;
        state.fold_changes(&mut patch);
        sink.update_publish_form(patch.clone());

        info!("Cleared selected file (soft: {})", soft);
        patch
    }

    fn change_mode(&self, state: &mut IntakeState, mode: PublishMode) {
        state.mode = Some(mode);
        self.services.sink.set_publish_mode(mode);
        self.services.events.publish_mode_changed(mode);
    }

    /// Send the reactive fields that changed, if any
    fn emit_changes(&self, state: &mut IntakeState) {
        let mut patch = PublishFormPatch::default();
        state.fold_changes(&mut patch);
        if !patch.is_empty() {
            self.services.sink.update_publish_form(patch);
        }
    }

    async fn finish_probe(&self, generation: u64, file: &SelectedFile, outcome: ProbeOutcome) {
        let mut state = self.state.lock().await;
        if !state.is_current(generation) {
            debug!(
                "Discarding stale duration for {} (generation {})",
                file.name_with_extension, generation
            );
            return;
        }

        state.duration_seconds = outcome.duration_seconds;
        self.emit_changes(&mut state);
    }

    async fn finish_decode(&self, generation: u64, file: &SelectedFile, decoded: DecodeResult<String>) {
        let text = match decoded {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Could not read {} as a post, leaving mode unset: {}",
                    file.name_with_extension, e
                );
                return;
            }
        };

        let mut state = self.state.lock().await;
        if !state.is_current(generation) {
            debug!(
                "Discarding stale text for {} (generation {})",
                file.name_with_extension, generation
            );
            return;
        }

        self.services.sink.update_publish_form(PublishFormPatch {
            file_text: Some(text),
            ..Default::default()
        });
        self.change_mode(&mut state, PublishMode::Post);
    }
}

async fn read_text(file: &SelectedFile) -> DecodeResult<String> {
    let bytes = match &file.identity {
        FileIdentity::Path(path) => tokio::fs::read(path).await?,
        FileIdentity::Memory { bytes, .. } => bytes.to_vec(),
    };
    Ok(String::from_utf8(bytes)?)
}
