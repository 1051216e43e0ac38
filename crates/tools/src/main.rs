use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::{Timelike, Utc};
use clap::Parser;
use foundation::{FixedClock, parse_iso8601};
use map_state::{DisplayCall, MapConfig, RecordingDisplay, StateReconciler};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replay serialized map states against an in-memory display and print the
/// resulting display calls as JSON lines.
///
/// Input is one query string per line; blank lines and lines starting with
/// `#` are skipped.
#[derive(Debug, Parser)]
#[command(name = "atlas-state")]
struct Args {
    /// Map config JSON (`defaultProjection`, `projections`).
    #[arg(long)]
    config: PathBuf,

    /// Read states from this file instead of stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Pin "now" (ISO-8601). Defaults to the wall clock at startup.
    #[arg(long)]
    now: Option<String>,

    /// Override the UTC hour used for the leading-edge view.
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
    hour_utc: Option<u32>,
}

#[derive(Serialize)]
struct Emitted<'a> {
    /// 0 for calls made during init.
    line: usize,
    #[serde(flatten)]
    call: &'a DisplayCall,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();

    let config = MapConfig::load(&args.config).map_err(|e| e.to_string())?;
    let clock = pinned_clock(args.now.as_deref(), args.hour_utc)?;

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("open {path:?}: {e}"))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let mut out = io::stdout().lock();
    let mut reconciler = StateReconciler::new(RecordingDisplay::new(config)).with_clock(clock);

    if let Some(extent) = reconciler.init() {
        info!("leading edge view: {:?}", extent.to_array());
    }
    emit(&mut out, 0, &reconciler.display_mut().drain())?;

    for (idx, line) in input.lines().enumerate() {
        let line = line.map_err(|e| format!("read input: {e}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let outcome = reconciler.reconcile(line);
        info!(line = idx + 1, ?outcome, "reconciled");
        emit(&mut out, idx + 1, &reconciler.display_mut().drain())?;
    }

    Ok(())
}

fn pinned_clock(now: Option<&str>, hour_utc: Option<u32>) -> Result<FixedClock, String> {
    let mut t = match now {
        Some(raw) => parse_iso8601(raw).map_err(|e| format!("--now: {e}"))?,
        None => Utc::now(),
    };
    if let Some(h) = hour_utc {
        t = t
            .with_hour(h)
            .ok_or_else(|| format!("--hour-utc: invalid hour {h}"))?;
    }
    Ok(FixedClock::new(t))
}

fn emit(out: &mut impl Write, line: usize, calls: &[DisplayCall]) -> Result<(), String> {
    for call in calls {
        let payload =
            serde_json::to_string(&Emitted { line, call }).map_err(|e| format!("json: {e}"))?;
        writeln!(out, "{payload}").map_err(|e| format!("write: {e}"))?;
    }
    Ok(())
}
