use charger_core::{
    CELL_COUNT, PRESENT_HIGH, PRESENT_LOW, RANK_DIRECTION, RankDirection, RawSample, classify,
    rank_descending,
};
use proptest::prelude::*;

prop_compose! {
    fn any_taps()(codes in prop::array::uniform6(0u16..=0x0FFF)) -> [RawSample; CELL_COUNT] {
        codes.map(RawSample::masked)
    }
}

prop_compose! {
    // Bias codes toward the threshold edges so every band is hit often.
    fn edge_taps()(codes in prop::array::uniform6(prop_oneof![
        Just(0u16),
        (PRESENT_LOW - 2)..=(PRESENT_LOW + 1),
        (PRESENT_HIGH - 2)..=(PRESENT_HIGH + 1),
        Just(0x0FFFu16),
    ])) -> [RawSample; CELL_COUNT] {
        codes.map(RawSample::masked)
    }
}

fn check_classification(samples: [RawSample; CELL_COUNT]) -> Result<(), TestCaseError> {
    let r = classify(samples);
    let k = usize::from(r.cell_count);
    prop_assert!(k <= CELL_COUNT);

    if !r.fault {
        for s in &samples[..k] {
            prop_assert!(s.code() >= PRESENT_HIGH, "populated tap {} below high", s.code());
        }
        for s in &samples[k..] {
            prop_assert!(s.code() < PRESENT_LOW, "tap {} past boundary not absent", s.code());
        }
    } else {
        // A fault always has some tap at or above the low threshold.
        prop_assert!(samples.iter().any(|s| s.code() >= PRESENT_LOW));
    }

    // Classification is a pure function of its input.
    prop_assert_eq!(classify(samples), r);
    Ok(())
}

proptest! {
    #[test]
    fn classification_is_total_and_prefix_monotonic(samples in any_taps()) {
        check_classification(samples)?;
    }

    #[test]
    fn classification_holds_at_threshold_edges(samples in edge_taps()) {
        check_classification(samples)?;
    }

    #[test]
    fn all_absent_is_never_a_fault(codes in prop::array::uniform6(0u16..PRESENT_LOW)) {
        let r = classify(codes.map(RawSample::masked));
        prop_assert_eq!((r.cell_count, r.fault), (0, false));
    }

    #[test]
    fn ranking_is_sorted_permutation(mut v in prop::collection::vec(any::<i32>(), 0..16)) {
        let mut expected = v.clone();
        expected.sort_unstable();
        rank_descending(&mut v);
        prop_assert_eq!(RANK_DIRECTION, RankDirection::Ascending);
        prop_assert!(v.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(v, expected);
    }

    #[test]
    fn ranking_is_idempotent(mut v in prop::collection::vec(0u16..=0x0FFF, 0..=CELL_COUNT)) {
        rank_descending(&mut v);
        let once = v.clone();
        rank_descending(&mut v);
        prop_assert_eq!(v, once);
    }
}
