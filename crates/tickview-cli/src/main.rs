//! tickview CLI - run animators on a virtual clock and print their frames.

#![allow(clippy::print_stdout, clippy::print_stderr, clippy::needless_pass_by_value)]

use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tickview_core::{config, logging, Animated, ConfigError, ManualScheduler, RecordingHost};
use tickview_widgets::{CaptionConfig, CaptionFader, PieConfig, PieProgress};
use tracing::info;

#[derive(Parser)]
#[command(name = "tickview")]
#[command(about = "Headless simulator for tickview animators")]
#[command(version)]
struct Cli {
    /// Log warnings only unless RUST_LOG says otherwise
    #[arg(long, global = true)]
    release: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a pie progress animator
    Pie(RunArgs),

    /// Simulate a caption cross-fader
    Caption(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// YAML config file (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Virtual time to simulate
    #[arg(short, long, default_value = "2500")]
    duration_ms: u64,

    /// Print one JSON object per frame
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PieFrame {
    at_ms: u64,
    progress: u32,
    max: u32,
    sweep_degrees: f32,
    running: bool,
}

impl fmt::Display for PieFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>7}ms  {:>4}/{:<4} sweep {:>6.1}deg{}",
            self.at_ms,
            self.progress,
            self.max,
            self.sweep_degrees,
            if self.running { "" } else { "  (stopped)" }
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaptionFrame {
    at_ms: u64,
    phase: String,
    a: (usize, u8),
    b: (usize, u8),
    shown: String,
}

impl fmt::Display for CaptionFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>7}ms  {:<7} a[{}]={:>3} b[{}]={:>3}  {}",
            self.at_ms, self.phase, self.a.0, self.a.1, self.b.0, self.b.1, self.shown
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.release);

    let result = match cli.command {
        Commands::Pie(args) => run_pie(&args),
        Commands::Caption(args) => run_caption(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tickview: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, ConfigError> {
    path.map_or_else(|| Ok(T::default()), |path| config::from_yaml_file(path))
}

fn run_pie(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config: PieConfig = load(args.config.as_deref())?;
    let mut pie = PieProgress::from_config(&config, ManualScheduler::new(), RecordingHost::new())?;
    pie.start();
    let lines = pie_frames(&mut pie, args.duration_ms)
        .iter()
        .map(|frame| render(frame, args.json))
        .collect::<Result<Vec<_>, _>>()?;
    for line in &lines {
        println!("{line}");
    }
    info!(frames = lines.len(), progress = pie.progress(), "pie simulation done");
    Ok(())
}

fn run_caption(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config: CaptionConfig = load(args.config.as_deref())?;
    let mut fader =
        CaptionFader::from_config(&config, ManualScheduler::new(), RecordingHost::new())?;
    fader.start(true);
    let lines = caption_frames(&mut fader, args.duration_ms)
        .iter()
        .map(|frame| render(frame, args.json))
        .collect::<Result<Vec<_>, _>>()?;
    for line in &lines {
        println!("{line}");
    }
    info!(
        frames = lines.len(),
        swaps = fader.host().remeasures,
        "caption simulation done"
    );
    Ok(())
}

fn render<T: Serialize + fmt::Display>(frame: &T, json: bool) -> Result<String, serde_json::Error> {
    if json {
        serde_json::to_string(frame)
    } else {
        Ok(frame.to_string())
    }
}

/// Dispatch every tick due within `duration_ms`, collecting a frame each
/// time the target asks for a redraw.
fn simulate<A, T>(
    target: &mut A,
    duration_ms: u64,
    redraws: fn(&A) -> usize,
    mut frame: impl FnMut(&A, u64) -> T,
) -> Vec<T>
where
    A: Animated<Scheduler = ManualScheduler>,
{
    let deadline = target.scheduler().now_ms().saturating_add(duration_ms);
    let mut frames = Vec::new();
    while let Some(due) = target.scheduler_mut().pop_due(deadline) {
        let before = redraws(target);
        target.handle_tick(due.tag);
        if redraws(target) > before {
            frames.push(frame(target, due.at_ms));
        }
    }
    frames
}

fn pie_frames(pie: &mut PieProgress<ManualScheduler, RecordingHost>, duration_ms: u64) -> Vec<PieFrame> {
    simulate(pie, duration_ms, |p| p.host().redraws, |p, at_ms| PieFrame {
        at_ms,
        progress: p.progress(),
        max: p.max(),
        sweep_degrees: p.sweep_degrees(),
        running: p.is_running(),
    })
}

fn caption_frames(
    fader: &mut CaptionFader<ManualScheduler, RecordingHost>,
    duration_ms: u64,
) -> Vec<CaptionFrame> {
    simulate(fader, duration_ms, |f| f.host().redraws, |f, at_ms| {
        let (a, b) = (f.slot_a(), f.slot_b());
        CaptionFrame {
            at_ms,
            phase: format!("{:?}", f.phase()),
            a: (a.index, a.alpha),
            b: (b.index, b.alpha),
            shown: f.captions()[f.current_index()].clone(),
        }
    })
}
