//! Cycle execution: backend assembly, the run loop, and latency stats.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use charger_config::{Config, FrameRow};
use charger_core::util::{is_late, late_after};
use charger_core::{CycleReport, CycleRunner, RunSummary};
use charger_hardware::{ReplayCellTaps, SimulatedCellTaps};
use charger_traits::CellSampler;
use serde_json::json;

/// Simulated healthy cell (about 4.1 V) and damaged-band cell codes.
const SIM_HEALTHY_CODE: u16 = 0x800;
const SIM_DAMAGED_CODE: u16 = 0x600;
const SIM_DEFAULT_CELLS: usize = 4;

/// Ingestion backend plus the number of cycles it can deliver, if finite.
pub struct Backend {
    pub sampler: Box<dyn CellSampler>,
    pub replay_len: Option<usize>,
}

fn env_number<T: std::str::FromStr>(name: &str) -> eyre::Result<Option<T>> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| eyre::eyre!("{name} must be a non-negative integer, got {v:?}")),
        Err(_) => Ok(None),
    }
}

/// Replay `frames` when given, otherwise a simulated pack shaped by env knobs.
pub fn make_backend(cfg: &Config, frames: Option<&Path>, looping: bool) -> eyre::Result<Backend> {
    if let Some(path) = frames {
        let rows = charger_config::load_frames_csv(path)?;
        let replay =
            ReplayCellTaps::new(rows.iter().map(FrameRow::to_sequence).collect()).looping(looping);
        let replay_len = (!looping).then(|| replay.remaining());
        tracing::info!(
            path = %path.display(),
            frames = rows.len(),
            looping,
            "replaying frame recording"
        );
        return Ok(Backend {
            sampler: Box::new(replay),
            replay_len,
        });
    }

    let cells = env_number::<usize>("CHARGER_SIM_CELLS")?.unwrap_or(SIM_DEFAULT_CELLS);
    let mut sim = SimulatedCellTaps::with_pack(cells, SIM_HEALTHY_CODE);
    if let Some(tap) = env_number::<usize>("CHARGER_SIM_DAMAGED")? {
        sim = sim.with_cell(tap, SIM_DAMAGED_CODE);
    }
    let force_timeout = env_number::<u8>("CHARGER_SIM_TIMEOUT")? == Some(1);
    let conversion = if force_timeout {
        Duration::from_millis(cfg.timeouts.sample_ms.saturating_mul(4))
    } else {
        Duration::from_millis(cfg.hardware.conversion_time_ms)
    };
    tracing::info!(
        cells,
        conversion_ms = u64::try_from(conversion.as_millis()).unwrap_or(u64::MAX),
        "using simulated pack"
    );
    Ok(Backend {
        sampler: Box::new(sim.with_conversion_time(conversion)),
        replay_len: None,
    })
}

fn build_runner(cfg: &Config, sampler: Box<dyn CellSampler>) -> eyre::Result<CycleRunner> {
    CycleRunner::builder()
        .with_sampler(sampler)
        .apply_config(cfg)?
        .build()
}

fn hex_list(values: &[u16]) -> String {
    values
        .iter()
        .map(|v| format!("{v:#05x}"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn report_json(r: &CycleReport) -> serde_json::Value {
    let (lowest, highest) = r.ranked.extremes().unzip();
    json!({
        "cycle": r.cycle,
        "cell_count": r.classification.cell_count,
        "fault": r.classification.fault,
        "usable": r.classification.is_usable(),
        "ranked": r.ranked.as_slice(),
        "lowest": lowest,
        "highest": highest,
        "pack_current": r.frame.pack_current.code(),
    })
}

fn print_report(r: &CycleReport, json: bool) {
    if json {
        println!("{}", report_json(r));
    } else {
        println!(
            "cycle={} cells={} fault={} ranked={}",
            r.cycle,
            r.classification.cell_count,
            r.classification.fault,
            hex_list(r.ranked.as_slice())
        );
    }
}

/// Run the cycle loop until the cycle budget is spent or `shutdown` is set.
pub fn run_cycles(
    cfg: &Config,
    frames: Option<&Path>,
    cycles_override: Option<u64>,
    stats: bool,
    looping: bool,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<RunSummary> {
    let backend = make_backend(cfg, frames, looping)?;
    let mut max_cycles = cycles_override.unwrap_or(cfg.sampling.max_cycles);
    if max_cycles == 0
        && let Some(n) = backend.replay_len
    {
        max_cycles = u64::try_from(n).unwrap_or(u64::MAX);
    }
    let mut runner = build_runner(cfg, backend.sampler)?;

    let period = runner.period();
    let mut intervals: Vec<Duration> = Vec::new();
    let mut prev: Option<Instant> = None;
    let summary = runner.run(max_cycles, &shutdown, |report| {
        if stats {
            let now = Instant::now();
            if let Some(p) = prev {
                intervals.push(now.duration_since(p));
            }
            prev = Some(now);
        }
        print_report(report, json);
    })?;

    if json {
        println!(
            "{}",
            json!({ "summary": { "cycles": summary.cycles, "faulted_cycles": summary.faulted_cycles } })
        );
    } else {
        println!(
            "cycles={} faulted={}",
            summary.cycles, summary.faulted_cycles
        );
    }
    if stats {
        print_stats(&intervals, summary.cycles, period);
    }
    Ok(summary)
}

/// One cycle through the configured backend.
pub fn self_check(cfg: &Config, frames: Option<&Path>) -> eyre::Result<CycleReport> {
    let backend = make_backend(cfg, frames, false)?;
    let mut runner = build_runner(cfg, backend.sampler)?;
    runner.step()
}

/// Print cycle interval stats to stderr.
fn print_stats(intervals: &[Duration], cycles: u64, period: Duration) {
    let late = intervals.iter().filter(|&&d| is_late(d, period)).count();
    let us: Vec<u64> = intervals.iter().map(|d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX)).collect();
    let min = us.iter().min().copied().unwrap_or(0);
    let max = us.iter().max().copied().unwrap_or(0);
    let avg = if us.is_empty() {
        0.0
    } else {
        us.iter().sum::<u64>() as f64 / us.len() as f64
    };
    eprintln!("\n--- Charger Stats ---");
    eprintln!("Cycles: {cycles}");
    eprintln!("Period (us): {}", period.as_micros());
    eprintln!("Interval min/avg/max (us): {min} / {avg:.1} / {max}");
    eprintln!(
        "Late cycles (> {} us): {late}",
        late_after(period).as_micros()
    );
    eprintln!("---------------------\n");
}
