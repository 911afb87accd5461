use charger_core::util::{cycle_period, is_late, late_after};
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[case(1, Duration::from_secs(1))]
#[case(4, Duration::from_millis(250))]
#[case(10, Duration::from_millis(100))]
#[case(3, Duration::from_micros(333_333))]
// hz=0 is treated as 1 Hz rather than dividing by zero
#[case(0, Duration::from_secs(1))]
// very high rates floor to 1µs
#[case(u32::MAX, Duration::from_micros(1))]
fn cycle_period_for_rate(#[case] hz: u32, #[case] expected: Duration) {
    assert_eq!(cycle_period(hz), expected);
}

#[test]
fn lateness_allows_ten_percent_slack() {
    let p = Duration::from_millis(100);
    assert_eq!(late_after(p), Duration::from_millis(110));
    assert!(!is_late(Duration::from_millis(110), p));
    assert!(is_late(Duration::from_millis(111), p));
    assert!(!is_late(Duration::from_millis(40), p));
}
