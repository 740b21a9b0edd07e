//! vitrine Replay Demo
//!
//! Feeds skeleton frames through the gesture engine and logs every event:
//! - Recorded frames from a JSON-lines file (one `[Skeleton, ...]` array per line)
//! - Or the built-in scripted session when no file is given
//!
//! Usage:
//!   vitrine-replay [--config engine.json] [--frames session.jsonl]
//!                  [--dt 0.0333] [--json-logs] [--snapshots]

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use tracing::{info, warn};
use vitrine_core::Skeleton;
use vitrine_runtime::{init_tracing, Engine, EngineConfig, EngineSnapshot, TelemetryConfig};
use vitrine_test::{integration::demo_session, FRAME_DT};

#[derive(Debug, Default)]
struct Args {
    config: Option<String>,
    frames: Option<String>,
    dt: Option<f32>,
    json_logs: bool,
    snapshots: bool,
}

fn parse_args() -> Result<Args, Box<dyn std::error::Error>> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next().ok_or("--config needs a path")?),
            "--frames" => args.frames = Some(iter.next().ok_or("--frames needs a path")?),
            "--dt" => {
                let value = iter.next().ok_or("--dt needs a value")?;
                args.dt = Some(parse_dt(&value)?);
            }
            "--json-logs" => args.json_logs = true,
            "--snapshots" => args.snapshots = true,
            other => return Err(format!("unknown argument: {}", other).into()),
        }
    }
    Ok(args)
}

/// Frame step in seconds; must be finite and positive
fn parse_dt(value: &str) -> Result<f32, Box<dyn std::error::Error>> {
    let dt: f32 = value.parse()?;
    if !(dt.is_finite() && dt > 0.0) {
        return Err(format!("--dt must be a positive number of seconds, got {}", value).into());
    }
    Ok(dt)
}

/// Expand the scripted session into one entry per frame
fn scripted_frames(dt: f32) -> Vec<Vec<Skeleton>> {
    let mut frames = Vec::new();
    for (bodies, seconds) in demo_session() {
        let count = (seconds / dt).round() as usize;
        frames.extend(std::iter::repeat(bodies).take(count));
    }
    frames
}

fn recorded_frames(path: &str) -> Result<Vec<Vec<Skeleton>>, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Vec<Skeleton>>(&line) {
            Ok(bodies) => frames.push(bodies),
            Err(e) => warn!(line = number + 1, error = %e, "skipping malformed frame"),
        }
    }
    Ok(frames)
}

fn log_events(snapshot: &EngineSnapshot) {
    let frame = snapshot.frame;
    if let Some(active) = snapshot.power_pose_changed {
        info!(frame, active, subject = ?snapshot.subject_id, "power pose");
    }
    if snapshot.trunk_kick_triggered {
        info!(frame, "trunk kick");
    }
    if let Some(open) = snapshot.trunk_changed {
        info!(frame, open, "trunk");
    }
    if let Some(index) = snapshot.color_step {
        info!(frame, index, "color step");
    }
    if let Some(on) = snapshot.headlights_changed {
        info!(frame, on, "headlights");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args()?;

    init_tracing(&TelemetryConfig {
        json: args.json_logs,
        ..TelemetryConfig::default()
    })?;

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let mut engine = Engine::new(config)?;
    let dt = args.dt.unwrap_or(FRAME_DT);

    let frames = match &args.frames {
        Some(path) => recorded_frames(path)?,
        None => scripted_frames(dt),
    };
    info!(frames = frames.len(), dt, "replay starting");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut last_phase = None;

    for bodies in &frames {
        let snapshot = engine.tick(bodies, dt);
        log_events(snapshot);

        if last_phase != Some(snapshot.zoom_phase) {
            info!(frame = snapshot.frame, phase = ?snapshot.zoom_phase, value = snapshot.zoom_value, "zoom");
            last_phase = Some(snapshot.zoom_phase);
        }

        if args.snapshots {
            serde_json::to_writer(&mut out, snapshot)?;
            writeln!(out)?;
        }
    }

    let stats = engine.stats();
    let snapshot = engine.snapshot();
    info!(
        ticks = stats.ticks,
        subject_frames = stats.subject_frames,
        trunk_kicks = stats.trunk_kicks,
        color_steps = stats.color_steps,
        rejected_deltas = stats.rejected_deltas,
        yaw = snapshot.rotation.yaw,
        zoom = snapshot.zoom_value,
        "replay finished"
    );
    Ok(())
}
