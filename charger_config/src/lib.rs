#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and frame-recording parsing for the charger controller.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Frame recordings are CSV files with a strict header, one conversion
//!   sequence per row, replayed by the CLI in place of live hardware.
use serde::Deserialize;

pub use charger_traits::MAX_RAW_CODE;

/// Default lower presence threshold (about 2.0 V per cell).
pub const DEFAULT_PRESENT_LOW: u16 = 0x4D9;
/// Default healthy-cell threshold (about 3.0 V per cell).
pub const DEFAULT_PRESENT_HIGH: u16 = 0x745;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ThresholdsCfg {
    pub present_low: u16,
    pub present_high: u16,
}

impl Default for ThresholdsCfg {
    fn default() -> Self {
        Self {
            present_low: DEFAULT_PRESENT_LOW,
            present_high: DEFAULT_PRESENT_HIGH,
        }
    }
}

/// Which cell taps are handed to the ranker each cycle.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RankScope {
    /// Only the populated prefix reported by the classifier.
    #[default]
    Populated,
    /// All six taps regardless of population.
    All,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingCfg {
    pub cycle_rate_hz: u32,
    pub rank_scope: RankScope,
    /// Number of cycles per run; 0 runs until interrupted.
    pub max_cycles: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            cycle_rate_hz: 10,
            rank_scope: RankScope::Populated,
            max_cycles: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Max wait per conversion sequence (ms). Also accepts alias "sensor_ms".
    #[serde(alias = "sensor_ms")]
    pub sample_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sample_ms: 50 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Simulated sequencer latency before results are ready (ms).
    pub conversion_time_ms: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            conversion_time_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub thresholds: ThresholdsCfg,
    #[serde(default)]
    pub sampling: SamplingCfg,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Thresholds
        let t = &self.thresholds;
        if t.present_low > MAX_RAW_CODE || t.present_high > MAX_RAW_CODE {
            eyre::bail!("thresholds must be 12-bit codes (<= {MAX_RAW_CODE:#05x})");
        }
        if t.present_low >= t.present_high {
            eyre::bail!(
                "thresholds.present_low ({:#05x}) must be below thresholds.present_high ({:#05x})",
                t.present_low,
                t.present_high
            );
        }

        // Sampling
        if self.sampling.cycle_rate_hz == 0 {
            eyre::bail!("sampling.cycle_rate_hz must be > 0");
        }
        if self.sampling.cycle_rate_hz > 1000 {
            eyre::bail!("sampling.cycle_rate_hz is unreasonably high (>1000)");
        }

        // Timeouts
        if self.timeouts.sample_ms == 0 {
            eyre::bail!("timeouts.sample_ms must be >= 1");
        }

        // Hardware
        if self.hardware.conversion_time_ms >= self.timeouts.sample_ms {
            eyre::bail!(
                "hardware.conversion_time_ms ({}) must be below timeouts.sample_ms ({})",
                self.hardware.conversion_time_ms,
                self.timeouts.sample_ms
            );
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

/// One recorded conversion sequence.
///
/// Expected headers:
/// pack,cell0,cell1,cell2,cell3,cell4,cell5,current,thermo1,thermo2
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct FrameRow {
    pub pack: u16,
    pub cell0: u16,
    pub cell1: u16,
    pub cell2: u16,
    pub cell3: u16,
    pub cell4: u16,
    pub cell5: u16,
    pub current: u16,
    pub thermo1: u16,
    pub thermo2: u16,
}

pub const FRAME_HEADERS: [&str; 10] = [
    "pack", "cell0", "cell1", "cell2", "cell3", "cell4", "cell5", "current", "thermo1", "thermo2",
];

impl FrameRow {
    /// Slot order used by the converter's sequencer.
    pub fn to_sequence(&self) -> [u16; 10] {
        [
            self.pack,
            self.cell0,
            self.cell1,
            self.cell2,
            self.cell3,
            self.cell4,
            self.cell5,
            self.current,
            self.thermo1,
            self.thermo2,
        ]
    }
}

pub fn load_frames_csv(path: &std::path::Path) -> eyre::Result<Vec<FrameRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open frame CSV {:?}: {}", path, e))?;
    parse_frames(rdr, path)
}

fn parse_frames<R: std::io::Read>(
    mut rdr: csv::Reader<R>,
    path: &std::path::Path,
) -> eyre::Result<Vec<FrameRow>> {
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != FRAME_HEADERS {
        eyre::bail!(
            "frame CSV must have headers '{}', got: {}",
            FRAME_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| {
            let line = e.position().map_or(0, csv::Position::line);
            eyre::eyre!("invalid CSV row {line}: {e}")
        })?;
        // Physical line; blank lines are skipped by the reader but still counted here.
        let line = rec.position().map_or(0, csv::Position::line);
        let row: FrameRow = rec
            .deserialize(Some(&headers))
            .map_err(|e| eyre::eyre!("invalid CSV row {line}: {e}"))?;
        if let Some(code) = row.to_sequence().into_iter().find(|c| *c > MAX_RAW_CODE) {
            eyre::bail!("invalid CSV row {line}: code {code} exceeds 12-bit range");
        }
        rows.push(row);
    }

    if rows.is_empty() {
        eyre::bail!("frame CSV {:?} contains no frames", path);
    }
    Ok(rows)
}
