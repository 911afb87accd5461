//! One-shot commands: classify, rank, health.

use charger_config::Config;
use charger_core::error::{ChargerError, SampleError};
use charger_core::{CELL_COUNT, RANK_DIRECTION, RawSample, VoltageThresholds, rank_descending};
use serde_json::json;

fn thresholds(cfg: &Config) -> Result<VoltageThresholds, ChargerError> {
    VoltageThresholds::try_from(&cfg.thresholds)
}

pub fn classify(cfg: &Config, codes: &[u16], as_json: bool) -> eyre::Result<()> {
    let taps: [u16; CELL_COUNT] = codes.try_into().map_err(|_| {
        ChargerError::Sample(SampleError::SequenceLength {
            expected: CELL_COUNT,
            actual: codes.len(),
        })
    })?;
    let samples = RawSample::array(taps).map_err(ChargerError::Sample)?;
    let t = thresholds(cfg)?;
    let result = t.classify(samples);
    tracing::debug!(?taps, cells = result.cell_count, fault = result.fault, "classified");

    if as_json {
        let bands: Vec<&str> = t.bands(samples).iter().map(|b| b.name()).collect();
        println!(
            "{}",
            json!({ "cell_count": result.cell_count, "fault": result.fault, "bands": bands })
        );
    } else {
        println!("cells={} fault={}", result.cell_count, result.fault);
    }
    Ok(())
}

pub fn rank(codes: &[u16], as_json: bool) -> eyre::Result<()> {
    let mut values = codes
        .iter()
        .map(|&c| RawSample::new(c).map(u16::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ChargerError::Sample)?;
    rank_descending(&mut values);

    if as_json {
        println!(
            "{}",
            json!({ "direction": RANK_DIRECTION.name(), "ranked": values })
        );
    } else {
        let line = values
            .iter()
            .map(|v| format!("{v:#05x}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{line}");
    }
    Ok(())
}

/// Always JSON; monitoring scrapes this.
pub fn health(cfg: &Config) -> eyre::Result<()> {
    let t = thresholds(cfg)?;
    println!(
        "{}",
        json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "thresholds": {
                "present_low": t.present_low(),
                "present_high": t.present_high(),
            },
            "cycle_rate_hz": cfg.sampling.cycle_rate_hz,
            "rank_direction": RANK_DIRECTION.name(),
        })
    );
    Ok(())
}
