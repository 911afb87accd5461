//! Human-readable error descriptions and structured JSON error formatting.

use charger_core::error::{BuildError, ChargerError, SampleError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSampler => {
                "What happened: No cell sampler was provided to the cycle runner.\nLikely causes: The ingestion backend failed to initialize.\nHow to fix: Check --frames or the CHARGER_SIM_* settings and rerun with --log-level=debug.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<ChargerError>() {
        return match ce {
            ChargerError::Timeout => "What happened: Conversion sequence timed out.\nLikely causes: The sequencer never signalled completion, or timeouts.sample_ms is below the conversion time.\nHow to fix: Raise timeouts.sample_ms or lower hardware.conversion_time_ms in the config.".to_string(),
            ChargerError::Sample(SampleError::OutOfRange { code }) => format!(
                "What happened: Raw code {code:#06x} is outside the 12-bit converter range.\nLikely causes: A typo in the codes, or a corrupt frame recording.\nHow to fix: Pass codes between 0 and 0xFFF."
            ),
            ChargerError::Sample(SampleError::SequenceLength { expected, actual }) => format!(
                "What happened: Expected {expected} conversion slots but got {actual}.\nLikely causes: A truncated frame.\nHow to fix: Check the ingestion backend or the recording."
            ),
            ChargerError::HardwareFault(msg) if msg.contains("exhausted") => format!(
                "What happened: The frame recording ran out ({msg}).\nLikely causes: --cycles asks for more cycles than the CSV has rows.\nHow to fix: Lower --cycles or record more frames."
            ),
            ChargerError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from config or recordings
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("frame csv must have headers") {
        return "Invalid headers in frame CSV. Expected 'pack,cell0,cell1,cell2,cell3,cell4,cell5,current,thermo1,thermo2'.".to_string();
    }

    if lower.contains("csv") {
        return format!(
            "What happened: Could not load the frame recording.\nLikely causes: Missing file, malformed rows, or codes above 0xFFF.\nHow to fix: Fix the CSV and rerun. Detail: {msg}"
        );
    }

    if lower.contains("config") {
        let cause = err.source().map(|s| format!(" Cause: {s}")).unwrap_or_default();
        return format!(
            "What happened: Configuration could not be loaded ({msg}).{cause}\nHow to fix: Check the --config path and TOML syntax."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 ingestion timeout, 4 invalid sample, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<ChargerError>() {
        Some(ChargerError::Timeout) => 3,
        Some(ChargerError::Sample(_)) => 4,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<ChargerError>() {
        Some(ChargerError::Timeout) => "Timeout",
        Some(ChargerError::Sample(_)) => "InvalidSample",
        Some(ChargerError::Hardware(_)) => "Hardware",
        Some(ChargerError::HardwareFault(_)) => "HardwareFault",
        Some(ChargerError::Config(_)) => "Config",
        Some(ChargerError::Alarm(_)) => "Alarm",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_exit_code_three() {
        let err = eyre::Report::new(ChargerError::Timeout);
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("timed out"));
    }

    #[test]
    fn invalid_sample_maps_to_exit_code_four() {
        let err = eyre::Report::new(ChargerError::Sample(SampleError::OutOfRange { code: 0x1234 }));
        assert_eq!(exit_code_for_error(&err), 4);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "InvalidSample");
        assert_eq!(v["exit_code"], 4);
    }

    #[test]
    fn untyped_errors_are_generic() {
        let err = eyre::eyre!("disk on fire");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("disk on fire"));
    }
}
