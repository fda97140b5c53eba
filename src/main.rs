use std::path::{Path, PathBuf};

use agamotto::assets::{self, DirectoryResolver};
use agamotto::config::Configuration;
use agamotto::controller::{InteractionState, SliderInput};
use agamotto::error::Error;
use agamotto::events::{Key, Milestone, ResizeRequest};
use agamotto::resize::Size;
use agamotto::tasks;
use agamotto::widget::{Agamotto, Host, WidgetState};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "agamotto",
    version,
    about = "headless driver for the agamotto image slider"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Directory holding `content/<id>/...` assets
    #[arg(long = "content-dir", value_name = "DIR", default_value = ".")]
    content_dir: PathBuf,
    /// Numeric content id used to resolve asset references
    #[arg(long = "content-id", value_name = "ID", default_value_t = 0)]
    content_id: u64,
    /// YAML list of inputs to replay once the slider is ready
    #[arg(long = "script", value_name = "FILE")]
    script: Option<PathBuf>,
    /// Slider track width in pixels
    #[arg(long = "track-width", value_name = "PX", default_value_t = 600.0)]
    track_width: f64,
    /// Page x of the track's left edge
    #[arg(long = "track-origin", value_name = "PX", default_value_t = 0.0)]
    track_origin: f64,
    /// Maximum number of assets loaded concurrently
    #[arg(long = "max-in-flight", value_name = "N", default_value_t = 4)]
    max_in_flight: usize,
    /// Enable the slider without loading any asset
    #[arg(long = "skip-assets")]
    skip_assets: bool,
}

/// One scripted step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum Step {
    PointerDown(f64),
    PointerMove(f64),
    PointerUp,
    TouchStart(f64),
    TouchMove(f64),
    TouchEnd,
    KeyDown(Key),
    KeyUp(Key),
    Tick(usize),
    Link,
    /// New track width.
    Resize(f64),
    /// Image area measured after a layout pass.
    Measure(Size),
    Mute,
    Unmute,
    Visibility(f64),
    Fullscreen(Option<bool>),
}

/// Host hooks that only log.
#[derive(Debug, Default)]
struct LogHost {
    resizes: usize,
}

impl Host for LogHost {
    fn trigger_xapi(&mut self, milestone: Milestone) {
        tracing::info!(verb = milestone.verb(), "xAPI statement");
    }

    fn read(&mut self, text: &str) {
        tracing::info!("read aloud: {text}");
    }

    fn notify_resize(&mut self) {
        self.resizes += 1;
        tracing::debug!(count = self.resizes, "resize requested");
    }

    fn enter_fullscreen(&mut self) {
        tracing::info!("entering fullscreen");
    }

    fn exit_fullscreen(&mut self) {
        tracing::info!("exiting fullscreen");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // init tracing (RUST_LOG controls level, default = info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let Args {
        config,
        content_dir,
        content_id,
        script,
        track_width,
        track_origin,
        max_in_flight,
        skip_assets,
    } = Args::parse();

    let raw = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?;
    let cfg = match raw.clone().validated() {
        Ok(cfg) => cfg,
        Err(err) if matches!(err.downcast_ref::<Error>(), Some(Error::TooFewItems { .. })) => {
            // Same path the host takes: the widget renders its notice and stops.
            let mut widget = Agamotto::new(raw, content_id, LogHost::default());
            widget.subscribe(|event| tracing::warn!(?event, "widget"));
            widget.mount();
            return Ok(());
        }
        Err(err) => return Err(err.context("invalid configuration values")),
    };
    tracing::info!(
        "Loaded configuration from {}:\n{:#?}",
        config.display(),
        cfg
    );

    let steps = match &script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    let mut widget = Agamotto::new(cfg.clone(), content_id, LogHost::default());
    widget.subscribe(|event| tracing::info!(?event, "widget"));
    widget.mount();
    widget
        .layout(track_origin, track_width)
        .context("initial slider layout failed")?;

    let loaded = if skip_assets {
        Some(Default::default())
    } else {
        let resolver = DirectoryResolver::new(&content_dir);
        let requests = assets::requests(&cfg, &resolver, content_id);
        tracing::info!(count = requests.len(), "preloading assets");
        match tasks::loader::preload(requests, cfg.items.len(), max_in_flight, cancel.clone())
            .await
        {
            Ok(loaded) => loaded,
            Err(err) => {
                widget.assets_failed(&err);
                return Err(err).context("asset preload failed");
            }
        }
    };
    let Some(loaded) = loaded else {
        return Ok(());
    };
    widget.assets_loaded(&loaded);

    // Layout passes feed the debounced convergence check.
    let (measure_tx, measure_rx) = mpsc::channel::<Size>(16);
    let (resize_tx, mut resize_rx) = mpsc::channel::<ResizeRequest>(16);
    tracing::debug!(
        cooling = %humantime::format_duration(cfg.resize.cooling_period),
        "starting resize monitor"
    );
    let resize_task = tokio::spawn(tasks::resize::run(
        measure_rx,
        resize_tx,
        cfg.resize,
        cancel.clone(),
    ));

    for step in steps {
        if cancel.is_cancelled() {
            break;
        }
        tracing::debug!(?step, "replaying");
        match step {
            Step::PointerDown(x) => widget.input(SliderInput::PointerDown { x }),
            Step::PointerMove(x) => widget.input(SliderInput::PointerMove { x }),
            Step::PointerUp => widget.input(SliderInput::PointerUp),
            Step::TouchStart(x) => widget.input(SliderInput::TouchStart { x }),
            Step::TouchMove(x) => widget.input(SliderInput::TouchMove { x }),
            Step::TouchEnd => widget.input(SliderInput::TouchEnd),
            Step::KeyDown(key) => widget.input(SliderInput::KeyDown(key)),
            Step::KeyUp(key) => widget.input(SliderInput::KeyUp(key)),
            Step::Tick(index) => widget.input(SliderInput::TickClicked(index)),
            Step::Link => widget.input(SliderInput::LinkActivated),
            Step::Resize(width) => {
                widget
                    .layout(track_origin, width)
                    .with_context(|| format!("cannot lay out track at {width}px"))?;
            }
            Step::Measure(size) => {
                measure_tx
                    .send(size)
                    .await
                    .context("resize monitor stopped")?;
            }
            Step::Mute => widget.mute(),
            Step::Unmute => widget.unmute(),
            Step::Visibility(ratio) => widget.visibility(ratio),
            Step::Fullscreen(enter) => widget.set_fullscreen(enter),
        }

        // Nothing animates here, so a snap lands immediately.
        if widget
            .controller()
            .is_some_and(|controller| controller.state() == InteractionState::Snapping)
        {
            widget.snap_finished();
        }

        while let Ok(ResizeRequest) = resize_rx.try_recv() {
            widget.host_mut().notify_resize();
        }
    }

    drop(measure_tx);
    resize_task
        .await
        .context("resize task panicked")?
        .context("resize task failed")?;
    // Passes still owed when the script ran out.
    while let Ok(ResizeRequest) = resize_rx.try_recv() {
        widget.host_mut().notify_resize();
    }

    if widget.state() == WidgetState::Ready {
        let context = widget.context();
        tracing::info!(
            title = widget.title(),
            image = context.value,
            completed = widget
                .controller()
                .is_some_and(|controller| controller.is_completed()),
            "session finished"
        );
    }
    Ok(())
}

fn load_script(path: &Path) -> Result<Vec<Step>> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    serde_yaml::from_str(&s).with_context(|| format!("failed to parse script {}", path.display()))
}
