/// Deterministic replay of a recorded verdict trace
use super::helpers::ConfigArgs;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use eyebreak_core::{
    config::seconds_to_duration, frame_source::parse_verdict, EyeMonitor, ManualClock, MemorySink,
    ScriptedFrameSource,
};
use std::{fs, path::Path};

/// Offsets are limited to a century either side of the trace start
const MAX_TRACE_OFFSET_SECS: f64 = 100.0 * 365.0 * 86_400.0;

/// One sampled frame: seconds since the start of the trace and the verdict
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceFrame {
    pub offset_secs: f64,
    pub eyes_in_frame: bool,
}

/// Parse a trace of `<seconds> <verdict>` lines. Blank lines and lines
/// starting with `#` are skipped.
pub fn parse_trace(raw: &str) -> Result<Vec<TraceFrame>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| parse_trace_line(line).with_context(|| format!("line {}", idx + 1)))
        .collect()
}

fn parse_trace_line(line: &str) -> Result<TraceFrame> {
    let mut parts = line.split_whitespace();
    let offset = parts
        .next()
        .ok_or_else(|| anyhow!("missing timestamp"))?;
    let verdict = parts.next().ok_or_else(|| anyhow!("missing verdict"))?;
    if parts.next().is_some() {
        anyhow::bail!("expected `<seconds> <verdict>`, got {line:?}");
    }

    let offset_secs: f64 = offset
        .parse()
        .with_context(|| format!("invalid timestamp {offset:?}"))?;
    if !offset_secs.is_finite() || offset_secs.abs() > MAX_TRACE_OFFSET_SECS {
        anyhow::bail!("invalid timestamp {offset:?}");
    }

    Ok(TraceFrame {
        offset_secs,
        eyes_in_frame: parse_verdict(verdict)?,
    })
}

/// Absolute time of a frame `offset_secs` after `start`
fn frame_time(start: DateTime<Utc>, offset_secs: f64) -> Result<DateTime<Utc>> {
    start
        .checked_add_signed(seconds_to_duration(offset_secs))
        .ok_or_else(|| anyhow!("timestamp {offset_secs}s is out of range"))
}

/// Run every frame through the monitor and collect `(offset, message)` pairs
pub fn replay_frames(
    args: &ConfigArgs,
    frames: &[TraceFrame],
) -> Result<(Vec<(f64, String)>, EyeMonitor<MemorySink>)> {
    let config = args.resolve()?;
    let start = DateTime::<Utc>::default();

    let mut monitor = EyeMonitor::from_config(
        &config,
        Box::new(ManualClock::new(start)),
        Box::new(ScriptedFrameSource::default()),
        MemorySink::new(),
    )?;

    let mut lines = Vec::new();
    for (idx, frame) in frames.iter().enumerate() {
        let now = frame_time(start, frame.offset_secs)
            .with_context(|| format!("frame {}", idx + 1))?;
        monitor.process(frame.eyes_in_frame, now);
        for message in monitor.events_mut().sink_mut().drain() {
            lines.push((frame.offset_secs, message));
        }
    }
    Ok((lines, monitor))
}

pub fn replay_command(path: &Path, args: &ConfigArgs) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace {}", path.display()))?;
    let frames = parse_trace(&raw)?;
    log::info!("Replaying {} frames from {}", frames.len(), path.display());

    let (lines, monitor) = replay_frames(args, &frames)?;
    for (offset, message) in lines {
        println!("[{offset:>9.3}s] {message}");
    }

    let end = frames.last().map_or(0.0, |f| f.offset_secs);
    let status = monitor.status(frame_time(DateTime::<Utc>::default(), end)?);
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
