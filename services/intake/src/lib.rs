//! Publish intake engine
//!
//! Classifies a file chosen for publishing, probes videos for their
//! duration, advises on transcoding and derives the publish form fields.

pub mod capability;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod events;
pub mod guidance;
pub mod models;
pub mod name;
pub mod picker;
pub mod state;
pub mod transcode;
pub mod video_probe;

pub use capability::FfmpegStatus;
pub use engine::{IntakeOptions, IntakeServices, PublishFormSink, PublishIntake, Selection};
pub use models::{FileKind, PublishFormPatch, PublishMode, SelectedFile};
pub use name::NameSanitizer;
pub use video_probe::{FfprobeProbe, MediaProbe};
