use anyhow::{Context, Result};
use clap::Parser;
use common::config::IntakeConfig;
use common::preferences::FilePreferenceStore;
use intake::events::TracingEvents;
use intake::{
    FfmpegStatus, FfprobeProbe, IntakeOptions, IntakeServices, NameSanitizer, PublishFormPatch,
    PublishFormSink, PublishIntake, PublishMode, picker,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Prints every patch and mode request as one JSON line
struct StdoutSink;

impl PublishFormSink for StdoutSink {
    fn update_publish_form(&self, patch: PublishFormPatch) {
        match serde_json::to_string(&patch) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("Failed to encode patch: {}", e),
        }
    }

    fn set_publish_mode(&self, mode: PublishMode) {
        println!("{}", serde_json::json!({ "mode": mode }));
    }

    fn mode_pending(&self) {
        println!("{}", serde_json::json!({ "mode": null }));
    }
}

/// Run files through the publish intake and print the resulting form patches
#[derive(Debug, Parser)]
#[command(name = "publish-intake", version)]
struct Cli {
    /// Treat the files as replacements for an already published claim
    #[arg(long)]
    edit: bool,

    /// Remember that videos should be optimized before upload
    #[arg(long, conflicts_with = "no_optimize")]
    optimize: bool,

    /// Remember that videos should be uploaded as they are
    #[arg(long)]
    no_optimize: bool,

    /// Files to select, one after another
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

impl Cli {
    /// The optimize preference to persist, if either flag was given
    fn optimize_choice(&self) -> Option<bool> {
        match (self.optimize, self.no_optimize) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    info!("Starting publish intake");

    let config = IntakeConfig::from_env().context("Failed to load configuration")?;
    let ffmpeg = FfmpegStatus::detect(&config.ffmpeg_path).await;
    let sanitizer = NameSanitizer::new(&config.invalid_uri_pattern)
        .context("Invalid URI character pattern")?;

    let services = IntakeServices {
        sink: Arc::new(StdoutSink),
        probe: Arc::new(FfprobeProbe::new(config.ffprobe_path.clone())),
        preferences: Arc::new(FilePreferenceStore::new(&config.preferences_path)),
        events: Arc::new(TracingEvents::new(config.analytics_enabled)),
        sanitizer,
    };

    let engine = PublishIntake::new(
        services,
        IntakeOptions {
            is_still_editing: config.still_editing || args.edit,
            ffmpeg_available: ffmpeg.available,
            ..Default::default()
        },
    )
    .await
    .context("Failed to read preferences")?;

    if let Some(optimize) = args.optimize_choice() {
        engine.set_user_optimize(optimize).await?;
    }

    for path in &args.files {
        let file = match picker::open_path(path).await {
            Ok(file) => file,
            Err(e) => {
                error!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        engine.select_file(Some(file)).await.settled().await;

        let derived = engine.derived().await;
        if let Some(advice) = &derived.upload_advice {
            println!("{}", serde_json::json!({ "advice": advice, "message": advice.message() }));
        }
        if let Some(message) = derived.estimate_message() {
            println!("{}", serde_json::json!({ "estimate": message }));
        }
    }

    engine.teardown().await;
    info!("Publish intake finished");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_reads_flags_and_files() {
        let cli = Cli::try_parse_from(["publish-intake", "--edit", "--optimize", "clip.mp4", "notes.md"])
            .unwrap();
        assert!(cli.edit);
        assert_eq!(cli.optimize_choice(), Some(true));
        assert_eq!(cli.files, vec![PathBuf::from("clip.mp4"), PathBuf::from("notes.md")]);

        let cli = Cli::try_parse_from(["publish-intake", "--no-optimize", "clip.mp4"]).unwrap();
        assert!(!cli.edit);
        assert_eq!(cli.optimize_choice(), Some(false));

        let cli = Cli::try_parse_from(["publish-intake", "clip.mp4"]).unwrap();
        assert_eq!(cli.optimize_choice(), None);
    }

    #[test]
    fn test_cli_accepts_files_after_separator() {
        let cli = Cli::try_parse_from(["publish-intake", "--", "--odd name.mp4"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("--odd name.mp4")]);
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(Cli::try_parse_from(["publish-intake"]).is_err());
        assert!(Cli::try_parse_from(["publish-intake", "--optimize", "--no-optimize", "clip.mp4"]).is_err());
        assert!(Cli::try_parse_from(["publish-intake", "--unknown", "clip.mp4"]).is_err());
    }
}
