use std::error::Error;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use charger_core::error::{ChargerError, SampleError};
use charger_core::{AlarmSink, CycleReport, CycleRunner};
use charger_hardware::{ReplayCellTaps, SimulatedCellTaps};
use charger_traits::CellSampler;
use charger_traits::clock::manual::ManualClock;

/// Returns one good frame, then fails with an untyped error.
struct FlakySampler {
    ok_sent: bool,
    message: &'static str,
}

impl CellSampler for FlakySampler {
    fn read_frame(&mut self, _timeout: Duration) -> Result<[u16; 10], Box<dyn Error + Send + Sync>> {
        if self.ok_sent {
            Err(self.message.into())
        } else {
            self.ok_sent = true;
            Ok([0; 10])
        }
    }
}

/// Hands back a code outside the 12-bit range.
struct OverrangeSampler;

impl CellSampler for OverrangeSampler {
    fn read_frame(&mut self, _timeout: Duration) -> Result<[u16; 10], Box<dyn Error + Send + Sync>> {
        let mut f = [0u16; 10];
        f[3] = 0x8000;
        Ok(f)
    }
}

struct RejectingAlarms;

impl AlarmSink for RejectingAlarms {
    fn evaluate(&mut self, _report: &CycleReport) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("thermal cutoff table missing".into())
    }
}

fn runner_with(sampler: impl CellSampler + 'static) -> CycleRunner {
    CycleRunner::builder()
        .with_sampler(sampler)
        .with_clock(ManualClock::new())
        .build()
        .unwrap()
}

#[test]
fn untyped_sampler_errors_map_to_hardware() {
    let mut runner = runner_with(FlakySampler {
        ok_sent: false,
        message: "spi bus fault",
    });
    runner.step().unwrap();
    let err = runner.step().expect_err("expected hardware error");
    match err.downcast_ref::<ChargerError>() {
        Some(ChargerError::Hardware(msg)) => assert_eq!(msg, "spi bus fault"),
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[test]
fn timeout_messages_map_to_timeout() {
    let mut runner = runner_with(FlakySampler {
        ok_sent: true,
        message: "sequence timeout",
    });
    let err = runner.step().expect_err("expected timeout");
    assert_eq!(err.downcast_ref::<ChargerError>(), Some(&ChargerError::Timeout));
}

#[test]
fn typed_conversion_timeout_maps_to_timeout() {
    let mut runner = CycleRunner::builder()
        .with_sampler(
            SimulatedCellTaps::with_pack(3, 0x800).with_conversion_time(Duration::from_millis(200)),
        )
        .with_sample_timeout(Duration::from_millis(2))
        .with_clock(ManualClock::new())
        .build()
        .unwrap();
    let err = runner.step().expect_err("expected timeout");
    assert_eq!(err.downcast_ref::<ChargerError>(), Some(&ChargerError::Timeout));
    assert_eq!(runner.cycles(), 0);
}

#[test]
fn exhausted_replay_ends_run_with_hardware_fault() {
    let mut runner = runner_with(ReplayCellTaps::new(vec![[0; 10]; 2]));
    let err = runner
        .run(0, &AtomicBool::new(false), |_| {})
        .expect_err("replay runs dry");
    assert!(matches!(
        err.downcast_ref::<ChargerError>(),
        Some(ChargerError::HardwareFault(_))
    ));
    assert_eq!(runner.cycles(), 2);
}

#[test]
fn overrange_codes_are_rejected_not_masked() {
    let mut runner = runner_with(OverrangeSampler);
    let err = runner.step().expect_err("overrange code");
    assert_eq!(
        err.downcast_ref::<ChargerError>(),
        Some(&ChargerError::Sample(SampleError::OutOfRange { code: 0x8000 }))
    );
}

#[test]
fn alarm_failures_surface_as_alarm_errors() {
    let mut runner = CycleRunner::builder()
        .with_sampler(SimulatedCellTaps::with_pack(2, 0x800))
        .with_alarms(RejectingAlarms)
        .with_clock(ManualClock::new())
        .build()
        .unwrap();
    let err = runner.step().expect_err("alarm failure");
    match err.downcast_ref::<ChargerError>() {
        Some(ChargerError::Alarm(msg)) => assert!(msg.contains("thermal cutoff")),
        other => panic!("unexpected error variant: {other:?}"),
    }
}
