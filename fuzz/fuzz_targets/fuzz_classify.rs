#![no_main]
use charger_core::{CellBand, RawSample, VoltageThresholds, classify, rank_descending};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|codes: [u16; 6]| {
    let taps = codes.map(RawSample::masked);
    let r = classify(taps);
    assert!(r.cell_count <= 6);

    let bands = VoltageThresholds::DEFAULT.bands(taps);
    let n = usize::from(r.cell_count);
    if !r.fault {
        assert!(bands[..n].iter().all(|b| *b == CellBand::Healthy));
        assert!(bands[n..].iter().all(|b| *b == CellBand::Absent));
    }

    let mut ranked = taps.map(RawSample::code);
    rank_descending(&mut ranked);
    assert!(ranked.windows(2).all(|w| w[0] <= w[1]));
});
